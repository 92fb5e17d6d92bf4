use crate::expr::TypeExpr;
use serde_derive::{Deserialize, Serialize};

/// One declaration file as produced by the data-access generator.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct DeclFile {
    /// Go package the declarations live in (e.g. `books`).
    pub package: String,
    /// Other declaration files this one depends on, relative paths.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<AliasDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub queries: Vec<QueryDef>,
}

impl DeclFile {
    pub fn from_yaml(content: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }
}

/// A named type defined over another type, such as a database enum
/// declared as `type BookType string`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct AliasDef {
    pub name: String,
    pub underlying: TypeExpr,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: TypeExpr,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: TypeExpr) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A row or model struct.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Query annotation, mirroring `:one`, `:many`, `:exec`, `:execresult` and
/// `:execrows`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum QueryCmd {
    One,
    Many,
    Exec,
    #[serde(rename = "execresult")]
    ExecResult,
    #[serde(rename = "execrows")]
    ExecRows,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct QueryDef {
    pub name: String,
    pub cmd: QueryCmd,
    #[serde(default)]
    pub params: Vec<FieldDef>,
    /// Name of the generated parameter struct when there is more than one
    /// parameter. Defaults to `<Query>Params`.
    #[serde(default)]
    pub params_struct: Option<String>,
    /// Row type for `one`/`many` queries.
    #[serde(default)]
    pub returns: Option<TypeExpr>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl QueryDef {
    pub fn params_struct_name(&self) -> String {
        self.params_struct
            .clone()
            .unwrap_or_else(|| format!("{}Params", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declaration_file() {
        let yaml = r#"
package: books
aliases:
  - name: BookType
    underlying: string
structs:
  - name: Book
    fields:
      - { name: BookID, type: int32 }
      - { name: Tags, type: "[]string" }
queries:
  - name: BooksByTags
    cmd: many
    params:
      - { name: Dollar1, type: "[]string" }
    returns: BooksByTagsRow
  - name: DeleteBook
    cmd: exec
  - name: CreateAuthorResult
    cmd: execresult
"#;
        let file = DeclFile::from_yaml(yaml).unwrap();
        assert_eq!(file.package, "books");
        assert!(file.imports.is_empty());
        assert_eq!(file.aliases[0].underlying, TypeExpr::ident("string"));
        assert_eq!(
            file.structs[0].fields[1].field_type,
            TypeExpr::ident("string").slice()
        );
        assert_eq!(file.queries[0].cmd, QueryCmd::Many);
        assert_eq!(file.queries[1].params_struct_name(), "DeleteBookParams");
        assert_eq!(file.queries[2].cmd, QueryCmd::ExecResult);
    }

    #[test]
    fn rejects_unparseable_type() {
        let yaml = "package: p\nstructs:\n  - name: A\n    fields:\n      - { name: B, type: \"map[\" }\n";
        assert!(DeclFile::from_yaml(yaml).is_err());
    }
}
