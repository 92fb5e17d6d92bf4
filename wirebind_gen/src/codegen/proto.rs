use crate::codegen::proto_gen::{
  collect_imports, emit_exec_result_message, emit_query_messages, emit_service, emit_struct_message,
};
use crate::decl::resolved::{ResolvedDecls, ResolvedReturn};
use std::path::PathBuf;
use wirebind_types::QueryCmd;

pub struct ProtoCodeGenerator {
  options: ProtoCodeGeneratorOptions,
}

pub struct ProtoCodeGeneratorOptions {
  pub output_dir: String,
  pub file_name: String,
  pub proto_package: String,
  pub go_package: String,
  pub service_name: String,
}

impl Default for ProtoCodeGeneratorOptions {
  fn default() -> Self {
    Self {
      output_dir: ".".to_string(),
      file_name: "service.proto".to_string(),
      proto_package: "service.v1".to_string(),
      go_package: "service/v1".to_string(),
      service_name: "Service".to_string(),
    }
  }
}

impl ProtoCodeGenerator {
  pub fn new(options: ProtoCodeGeneratorOptions) -> Self {
    Self { options }
  }

  pub fn output_path(&self) -> PathBuf {
    PathBuf::from(&self.options.output_dir).join(&self.options.file_name)
  }

  pub fn emit_code(&self, decls: &ResolvedDecls) -> String {
    let mut output = String::new();
    output.push_str("// Code generated by wirebind-gen. DO NOT EDIT.\n\n");
    output.push_str("syntax = \"proto3\";\n\n");
    output.push_str(&format!("package {};\n\n", self.options.proto_package));
    output.push_str(&format!("option go_package = \"{}\";\n", self.options.go_package));

    /* Well-known imports only when a field needs them */
    let struct_types = decls.structs.iter().flat_map(|s| s.fields.iter().map(|f| &f.ty));
    let param_types = decls.queries.iter().flat_map(|q| q.params.iter().map(|f| &f.ty));
    let return_types = decls.queries.iter().filter_map(|q| match &q.returns {
      Some(ResolvedReturn::Value(ty)) => Some(ty),
      _ => None,
    });
    let imports = collect_imports(struct_types.chain(param_types).chain(return_types));
    if !imports.is_empty() {
      output.push('\n');
      for import in &imports {
        output.push_str(&format!("import \"{}\";\n", import));
      }
    }

    output.push('\n');
    output.push_str(&emit_service(&self.options.service_name, &decls.queries));

    for def in &decls.structs {
      output.push('\n');
      output.push_str(&emit_struct_message(def));
    }

    for query in &decls.queries {
      output.push('\n');
      output.push_str(&emit_query_messages(query));
    }

    if decls.queries.iter().any(|q| q.cmd == QueryCmd::ExecResult) {
      output.push('\n');
      output.push_str(&emit_exec_result_message());
    }

    output
  }

  pub fn write(&self, code: &str) -> std::io::Result<PathBuf> {
    let path = self.output_path();
    std::fs::create_dir_all(&self.options.output_dir)?;
    std::fs::write(&path, code)?;
    Ok(path)
  }
}
