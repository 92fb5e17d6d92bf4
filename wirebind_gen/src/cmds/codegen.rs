/* Codegen command - generate the wire schema and Go service layer */

use super::common::{load_declarations, print_rejected, resolve_declarations};
use crate::codegen::go::GoCodeGenerator;
use crate::codegen::proto::ProtoCodeGenerator;
use crate::codegen::prune_unbindable;
use crate::config::GenConfig;
use anyhow::bail;
use std::path::PathBuf;
use tracing::error;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Target {
  Proto,
  Go,
  All,
}

impl Target {
  fn proto(self) -> bool {
    matches!(self, Target::Proto | Target::All)
  }

  fn go(self) -> bool {
    matches!(self, Target::Go | Target::All)
  }
}

pub struct CodegenArgs {
  pub files: Vec<PathBuf>,
  pub include_dirs: Vec<PathBuf>,
  pub target: Target,
  pub output_dir: PathBuf,
  pub config: Option<PathBuf>,
  /// Settings given on the command line, applied over the config file.
  pub overrides: GenConfig,
  /// Generate even when some declarations had to be skipped.
  pub allow_partial: bool,
  pub verbose: bool,
}

/* Execute the codegen command, returning the written files */
pub fn run(args: CodegenArgs) -> anyhow::Result<Vec<PathBuf>> {
  if args.verbose {
    println!("Wirebind Generator - Code Generation Tool");
    println!("=========================================\n");
    println!("[~] Configuration:");
    println!("  Target: {:?}", args.target);
    println!("  Output directory: {}", args.output_dir.display());
    println!("  Input files: {}", args.files.len());
    for file in &args.files {
      println!("    - {}", file.display());
    }
    println!();
  }

  let file_config = match &args.config {
    Some(path) => GenConfig::load(path)?,
    None => GenConfig::default(),
  };
  let config = file_config.merge(args.overrides);

  let decls = load_declarations(&args.files, &args.include_dirs, args.verbose)?;
  let settings = config.resolve(&decls.package);
  let bind = settings.bind_options();
  let resolved = prune_unbindable(resolve_declarations(&decls), &bind);

  print_rejected(&resolved.rejected);
  if !resolved.rejected.is_empty() && !args.allow_partial {
    for err in &resolved.rejected {
      error!(declaration = err.declaration(), error = %err, "declaration cannot be generated");
    }
    bail!("{} declaration(s) cannot be generated; pass --allow-partial to skip them", resolved.rejected.len());
  }

  let mut written = Vec::new();

  if args.target.proto() {
    let generator = ProtoCodeGenerator::new(settings.proto_options(&args.output_dir));
    let code = generator.emit_code(&resolved);
    let path = generator.write(&code)?;
    println!("[✓] Generated wire schema: {}", path.display());
    written.push(path);
  }

  if args.target.go() {
    let generator = GoCodeGenerator::new(settings.go_options(&args.output_dir));
    let output = generator.emit_code(&resolved);
    print_rejected(&output.skipped);
    for path in generator.write(&output)? {
      println!("[✓] Generated Go code: {}", path.display());
      written.push(path);
    }
  }

  println!("[✓] Code generation complete!");
  Ok(written)
}
