use super::GoFragment;
use super::to_wire::bind_to_wire;
use crate::codegen::shared::binding::BindOptions;
use crate::decl::resolved::{DeclError, ResolvedStruct};
use crate::naming::accessor_name;

pub fn adapter_name(struct_name: &str) -> String {
  format!("to{}", struct_name)
}

/// `func to<Struct>(in <Struct>) (out *pb.<Struct>, err error)` copying every
/// field into its wire message.
pub fn emit_adapter(def: &ResolvedStruct, options: &BindOptions) -> Result<GoFragment, DeclError> {
  let mut fragment = GoFragment::default();
  let mut body = String::new();

  for field in &def.fields {
    let src = format!("in.{}", field.name);
    let dst = format!("out.{}", accessor_name(&field.name));
    let binding = bind_to_wire(&field.name, &field.ty, &src, &dst, options)
      .map_err(|source| DeclError::Field { declaration: def.name.clone(), source })?;
    body.push_str(&binding.render("\t"));
    fragment.imports.extend(binding.imports);
  }

  let pb = &options.wire_package;
  let code = &mut fragment.code;
  code.push_str(&format!("func {}(in {}) (out *{}.{}, err error) {{\n", adapter_name(&def.name), def.name, pb, def.name));
  code.push_str(&format!("\tout = new({}.{})\n", pb, def.name));
  code.push_str(&body);
  code.push_str("\treturn\n");
  code.push_str("}\n");
  Ok(fragment)
}
