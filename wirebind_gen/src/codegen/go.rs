use crate::codegen::go_gen::service::{CONTEXT_IMPORT, ZAP_IMPORT};
use crate::codegen::go_gen::{GENERATED_HEADER, emit_adapter, emit_method, emit_service_header, render_imports};
use crate::codegen::shared::binding::BindOptions;
use crate::decl::resolved::{DeclError, ResolvedDecls, ResolvedReturn};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use tracing::warn;

pub struct GoCodeGenerator {
  options: GoCodeGeneratorOptions,
}

pub struct GoCodeGeneratorOptions {
  pub output_dir: String,
  /// Go package of the data-access code the service lives next to.
  pub package: String,
  /// Go module path; imports under it are grouped last.
  pub module: String,
  /// Import path of the protobuf generated package.
  pub pb_import: String,
  pub service_name: String,
  pub bind: BindOptions,
}

impl Default for GoCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      output_dir: ".".to_string(),
      package: "service".to_string(),
      module: String::new(),
      pb_import: "api/service/v1".to_string(),
      service_name: "Service".to_string(),
      bind: BindOptions::default(),
    }
  }
}

/// Rendered Go files and the declarations that could not be bound.
#[derive(Debug, Default)]
pub struct GoOutput {
  pub adapters: String,
  pub service: String,
  pub skipped: Vec<DeclError>,
}

impl GoCodeGenerator {
  pub fn new(options: GoCodeGeneratorOptions) -> Self {
    Self { options }
  }

  fn render_file(&self, body: &str, mut imports: BTreeSet<String>, uses_pb: bool) -> String {
    let mut aliases = BTreeMap::new();
    if uses_pb {
      imports.insert(self.options.pb_import.clone());
      aliases.insert(self.options.pb_import.clone(), self.options.bind.wire_package.clone());
    }

    let mut output = String::new();
    output.push_str(GENERATED_HEADER);
    output.push_str("\n\n");
    output.push_str(&format!("package {}\n", self.options.package));
    let import_block = render_imports(&imports, &aliases, &self.options.module);
    if !import_block.is_empty() {
      output.push('\n');
      output.push_str(&import_block);
    }
    output.push_str(body);
    output
  }

  pub fn emit_code(&self, decls: &ResolvedDecls) -> GoOutput {
    let mut result = GoOutput::default();
    let bind = &self.options.bind;

    /* Adapters first so methods returning a skipped row can be dropped */
    let mut adapter_body = String::new();
    let mut adapter_imports = BTreeSet::new();
    let mut adapted = HashSet::new();
    for def in &decls.structs {
      match emit_adapter(def, bind) {
        Ok(fragment) => {
          adapter_body.push('\n');
          adapter_body.push_str(&fragment.code);
          adapter_imports.extend(fragment.imports);
          adapted.insert(def.name.as_str());
        }
        Err(err) => {
          warn!(error = %err, "skipping struct adapter");
          result.skipped.push(err);
        }
      }
    }

    let mut service_body = String::from("\n");
    service_body.push_str(&emit_service_header(&self.options.service_name, bind));
    let mut service_imports: BTreeSet<String> = [CONTEXT_IMPORT, ZAP_IMPORT].into_iter().map(String::from).collect();
    for query in &decls.queries {
      if let Some(ResolvedReturn::Message(name)) = &query.returns {
        if !adapted.contains(name.as_str()) {
          let err = DeclError::SkippedDependency { declaration: query.name.clone(), dependency: name.clone() };
          warn!(error = %err, "skipping service method");
          result.skipped.push(err);
          continue;
        }
      }

      match emit_method(query, bind) {
        Ok(fragment) => {
          service_body.push('\n');
          service_body.push_str(&fragment.code);
          service_imports.extend(fragment.imports);
        }
        Err(err) => {
          warn!(error = %err, "skipping service method");
          result.skipped.push(err);
        }
      }
    }

    result.adapters = self.render_file(&adapter_body, adapter_imports, !adapted.is_empty());
    result.service = self.render_file(&service_body, service_imports, true);
    result
  }

  pub fn write(&self, output: &GoOutput) -> std::io::Result<Vec<PathBuf>> {
    let dir = PathBuf::from(&self.options.output_dir);
    std::fs::create_dir_all(&dir)?;

    let adapters = dir.join("adapters.go");
    std::fs::write(&adapters, &output.adapters)?;
    let service = dir.join("service.go");
    std::fs::write(&service, &output.service)?;
    Ok(vec![adapters, service])
  }
}
