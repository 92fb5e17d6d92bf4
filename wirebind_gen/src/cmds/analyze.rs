/* Analyze command - show how each declared type resolves, classifies and binds */

use super::common::{load_declarations, print_rejected, resolve_declarations};
use crate::codegen::go_gen::{bind_to_native, bind_to_wire};
use crate::codegen::shared::binding::BindOptions;
use crate::decl::resolved::{ResolvedDecls, ResolvedField, ResolvedQuery, ResolvedStruct};
use crate::naming::accessor_name;
use serde_derive::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
  Text,
  Json,
}

#[derive(Serialize)]
struct RejectedEntry {
  declaration: String,
  error: String,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
  package: &'a str,
  structs: &'a [ResolvedStruct],
  queries: &'a [ResolvedQuery],
  rejected: Vec<RejectedEntry>,
}

/* Execute the analyze command */
pub fn run(
  files: Vec<PathBuf>,
  include_dirs: Vec<PathBuf>,
  format: OutputFormat,
  print_bindings: bool,
) -> anyhow::Result<()> {
  let verbose = format == OutputFormat::Text;
  let decls = load_declarations(&files, &include_dirs, verbose)?;
  let resolved = resolve_declarations(&decls);

  match format {
    OutputFormat::Json => {
      let report = AnalysisReport {
        package: &resolved.package,
        structs: &resolved.structs,
        queries: &resolved.queries,
        rejected: resolved
          .rejected
          .iter()
          .map(|err| RejectedEntry { declaration: err.declaration().to_string(), error: err.to_string() })
          .collect(),
      };
      println!("{}", serde_json::to_string_pretty(&report)?);
    }
    OutputFormat::Text => {
      print_type_analysis(&resolved);
      if print_bindings {
        print_bindings_for(&resolved);
      }
      print_rejected(&resolved.rejected);
    }
  }

  Ok(())
}

fn print_field(field: &ResolvedField) {
  let ty = &field.ty;
  println!(
    "    {:<20} {:<24} -> {:<32} [{}{}]",
    field.name,
    ty.declared,
    ty.wire,
    ty.category,
    if ty.repeated { ", repeated" } else { "" }
  );
}

fn print_type_analysis(resolved: &ResolvedDecls) {
  println!("\n[~] Resolved Declarations:");
  println!("==========================");

  for def in &resolved.structs {
    println!("\n  struct {}", def.name);
    for field in &def.fields {
      print_field(field);
    }
  }

  for query in &resolved.queries {
    println!("\n  query {} ({:?})", query.name, query.cmd);
    for param in &query.params {
      print_field(param);
    }
  }
}

fn print_bindings_for(resolved: &ResolvedDecls) {
  let options = BindOptions::default();

  println!("\n[~] Bindings:");
  println!("=============");

  for def in &resolved.structs {
    for field in &def.fields {
      println!("\n  {}.{} (to wire)", def.name, field.name);
      let dst = format!("out.{}", accessor_name(&field.name));
      match bind_to_wire(&field.name, &field.ty, &format!("in.{}", field.name), &dst, &options) {
        Ok(binding) => print!("{}", binding.render("    ")),
        Err(err) => println!("    [!] {}", err),
      }
    }
  }

  for query in &resolved.queries {
    for param in &query.params {
      println!("\n  {}.{} (to native)", query.name, param.name);
      let dst = format!("arg.{}", param.name);
      match bind_to_native(&param.name, &param.ty, "in", &dst, false, &options) {
        Ok(binding) => {
          print!("{}", binding.render("    "));
          for failure in &binding.failures {
            println!("    // may fail: {}", failure);
          }
        }
        Err(err) => println!("    [!] {}", err),
      }
    }
  }
}
