/* Common utilities shared between analyze and codegen commands */

use crate::decl::file::{DeclLoader, Declarations};
use crate::decl::resolved::{DeclError, DeclResolver, ResolvedDecls};
use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

/* Load every input file with its imports and merge the declarations */
pub fn load_declarations(files: &[PathBuf], include_dirs: &[PathBuf], verbose: bool) -> anyhow::Result<Declarations> {
  let mut loader = DeclLoader::new(include_dirs.to_vec());

  if verbose {
    println!("[~] Loading declaration files and resolving imports...");
    for dir in include_dirs {
      println!("    include: {}", dir.display());
    }
  }

  for file in files {
    loader
      .load_file_with_imports(file)
      .with_context(|| format!("loading declarations from {}", file.display()))?;
  }
  info!(files = loader.loaded_file_count(), "declaration files loaded");

  if verbose {
    println!("[~] Loaded {} file(s) total (including imports)", loader.loaded_file_count());
  }

  let decls = loader.merge()?;
  if verbose {
    println!(
      "[~] Package {}: {} alias(es), {} struct(s), {} quer(ies)",
      decls.package,
      decls.aliases.len(),
      decls.structs.len(),
      decls.queries.len()
    );
  }
  Ok(decls)
}

pub fn resolve_declarations(decls: &Declarations) -> ResolvedDecls {
  DeclResolver::for_declarations(decls).resolve_all(decls)
}

pub fn print_rejected(rejected: &[DeclError]) {
  if rejected.is_empty() {
    return;
  }
  println!("\n[!] Skipped declarations:");
  for err in rejected {
    println!("    - {}", err);
  }
}
