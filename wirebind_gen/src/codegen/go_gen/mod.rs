pub mod adapters;
pub mod service;
pub mod to_native;
pub mod to_wire;

/* Re-export main public functions */
pub use adapters::emit_adapter;
pub use service::{emit_method, emit_service_header};
pub use to_native::bind_to_native;
pub use to_wire::bind_to_wire;

use std::collections::{BTreeMap, BTreeSet};

pub const GENERATED_HEADER: &str = "// Code generated by wirebind-gen. DO NOT EDIT.";

/// Go source for one declaration plus the imports it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoFragment {
  pub code: String,
  pub imports: BTreeSet<String>,
}

/* Standard library paths have no dot in their first element */
fn is_std_import(path: &str) -> bool {
  !path.split('/').next().unwrap_or(path).contains('.')
}

/// Render an import block grouped as standard library, third party, then
/// packages of the generated module.
pub fn render_imports(imports: &BTreeSet<String>, aliases: &BTreeMap<String, String>, module: &str) -> String {
  if imports.is_empty() {
    return String::new();
  }

  let is_local = |path: &str| !module.is_empty() && (path == module || path.starts_with(&format!("{}/", module)));
  let mut groups: [Vec<&str>; 3] = [Vec::new(), Vec::new(), Vec::new()];
  for path in imports {
    let group = if is_local(path) {
      2
    } else if is_std_import(path) {
      0
    } else {
      1
    };
    groups[group].push(path);
  }

  let mut out = String::from("import (\n");
  let mut first = true;
  for group in groups.iter().filter(|g| !g.is_empty()) {
    if !first {
      out.push('\n');
    }
    first = false;
    for path in group {
      match aliases.get(*path) {
        Some(alias) => out.push_str(&format!("\t{} \"{}\"\n", alias, path)),
        None => out.push_str(&format!("\t\"{}\"\n", path)),
      }
    }
  }
  out.push_str(")\n");
  out
}

/// Lowercase-first variable name that is not a Go keyword.
pub fn go_variable(name: &str) -> String {
  const KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
  ];
  let ident = crate::naming::to_lower_camel(name);
  if KEYWORDS.contains(&ident.as_str()) { format!("{}_", ident) } else { ident }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn imports_are_grouped() {
    let imports: BTreeSet<String> = [
      "context",
      "fmt",
      "go.uber.org/zap",
      "booktest/api/books/v1",
      "booktest/internal/validation",
      "github.com/google/uuid",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let mut aliases = BTreeMap::new();
    aliases.insert("booktest/api/books/v1".to_string(), "pb".to_string());

    let block = render_imports(&imports, &aliases, "booktest");
    assert_eq!(
      block,
      "import (\n\t\"context\"\n\t\"fmt\"\n\n\t\"github.com/google/uuid\"\n\t\"go.uber.org/zap\"\n\n\tpb \"booktest/api/books/v1\"\n\t\"booktest/internal/validation\"\n)\n"
    );
  }

  #[test]
  fn variables_avoid_keywords() {
    assert_eq!(go_variable("BookID"), "bookID");
    assert_eq!(go_variable("Type"), "type_");
    assert_eq!(go_variable("Dollar1"), "dollar1");
  }
}
