/* Case command - show identifier conversions */

use crate::naming::{CaseForm, accessor_name, convert, wire_field_name};

pub fn run(form: Option<CaseForm>, names: Vec<String>) -> anyhow::Result<()> {
  for name in &names {
    match form {
      Some(form) => println!("{}", convert(form, name)),
      None => {
        println!("{}", name);
        for form in CaseForm::ALL {
          println!("  {:<12} {}", form, convert(form, name));
        }
        println!("  {:<12} {}", "wire", wire_field_name(name));
        println!("  {:<12} Get{}()", "accessor", accessor_name(name));
      }
    }
  }
  Ok(())
}
