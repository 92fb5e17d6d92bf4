use crate::codegen::shared::binding::BindError;
use crate::decl::alias::{AliasResolver, AliasTable};
use crate::decl::file::Declarations;
use crate::mapping::{Classification, TypeCategory, classify, to_wire_type};
use serde_derive::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};
use wirebind_types::{FieldDef, QueryCmd, QueryDef, StructDef, TypeExpr};

/* Declared types nested deeper than this are rejected */
pub const MAX_TYPE_DEPTH: usize = 32;

/// Flattened string form of a type expression, e.g. `[]*sql.NullString`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalTypeName(String);

/// Outermost layer of a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameShape<'a> {
  Pointer(&'a str),
  Slice(&'a str),
  Named(&'a str),
}

pub fn name_shape(name: &str) -> NameShape<'_> {
  if let Some(rest) = name.strip_prefix('*') {
    NameShape::Pointer(rest)
  } else if let Some(rest) = name.strip_prefix("[]") {
    NameShape::Slice(rest)
  } else {
    NameShape::Named(name)
  }
}

impl CanonicalTypeName {
  /* Trusted constructor for names produced outside the resolver (symbol tables, tests) */
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn shape(&self) -> NameShape<'_> {
    name_shape(&self.0)
  }
}

impl fmt::Display for CanonicalTypeName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for CanonicalTypeName {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
  #[error("unsupported type shape ({shape}) in '{declared}'")]
  UnsupportedTypeShape { shape: String, declared: String },
}

/// Resolve a type expression into its canonical name.
pub fn resolve(expr: &TypeExpr) -> Result<CanonicalTypeName, ResolveError> {
  let mut name = String::new();
  resolve_into(expr, 0, &mut name)
    .map_err(|shape| ResolveError::UnsupportedTypeShape { shape, declared: expr.to_string() })?;
  Ok(CanonicalTypeName(name))
}

fn resolve_into(expr: &TypeExpr, depth: usize, out: &mut String) -> Result<(), String> {
  if depth >= MAX_TYPE_DEPTH {
    return Err(format!("nesting deeper than {} levels", MAX_TYPE_DEPTH));
  }

  match expr {
    TypeExpr::Ident(name) => out.push_str(name),
    TypeExpr::Selector { owner, name } => {
      resolve_into(owner, depth + 1, out)?;
      out.push('.');
      out.push_str(name);
    }
    TypeExpr::Pointer(inner) => {
      out.push('*');
      resolve_into(inner, depth + 1, out)?;
    }
    TypeExpr::Slice(element) | TypeExpr::Array { element, .. } => {
      out.push_str("[]");
      resolve_into(element, depth + 1, out)?;
    }
    other => return Err(other.shape_name().to_string()),
  }
  Ok(())
}

/// Everything the emitters need to know about one declared field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
  /// Type as written in the declaration.
  pub declared: String,
  pub canonical: CanonicalTypeName,
  /// Canonical name without pointer and slice prefixes.
  pub element: String,
  pub category: TypeCategory,
  pub repeated: bool,
  /// The value (each element, when repeated) is reached through a `*`.
  pub pointer: bool,
  /// Wire schema token, `repeated` prefix included.
  pub wire: String,
}

impl FieldType {
  pub fn resolve(expr: &TypeExpr, aliases: &dyn AliasResolver) -> Result<Self, ResolveError> {
    let canonical = resolve(expr)?;
    Ok(Self::from_canonical(expr.to_string(), canonical, aliases))
  }

  pub fn from_canonical(declared: String, canonical: CanonicalTypeName, aliases: &dyn AliasResolver) -> Self {
    let Classification { category, repeated, element } = classify(&canonical, aliases);
    let wire = to_wire_type(canonical.as_str(), aliases);
    let pointer = match canonical.shape() {
      NameShape::Pointer(_) => true,
      NameShape::Slice(rest) if repeated => rest.starts_with('*'),
      _ => false,
    };
    Self { declared, canonical, element, category, repeated, pointer, wire }
  }

  /* Same type read through the pointer */
  pub fn pointee(&self) -> FieldType {
    FieldType { pointer: false, ..self.clone() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
  pub name: String,
  #[serde(rename = "type")]
  pub ty: FieldType,
}

/* Resolve one declared field, attributing shape failures to the field */
pub fn resolve_field(def: &FieldDef, aliases: &dyn AliasResolver) -> Result<ResolvedField, BindError> {
  let ty = FieldType::resolve(&def.field_type, aliases).map_err(|err| match err {
    ResolveError::UnsupportedTypeShape { shape, declared } => {
      BindError::UnsupportedTypeShape { field: def.name.clone(), declared, reason: format!("{} types are not supported", shape) }
    }
  })?;
  Ok(ResolvedField { name: def.name.clone(), ty })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStruct {
  pub name: String,
  pub fields: Vec<ResolvedField>,
  pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedReturn {
  /// Row struct declared in the same declaration set.
  Message(String),
  Value(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
  pub name: String,
  pub cmd: QueryCmd,
  pub params: Vec<ResolvedField>,
  pub params_struct: String,
  pub returns: Option<ResolvedReturn>,
  pub comment: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeclError {
  #[error("{declaration}: {source}")]
  Field {
    declaration: String,
    #[source]
    source: BindError,
  },

  #[error("alias '{alias}': {source}")]
  Alias {
    alias: String,
    #[source]
    source: ResolveError,
  },

  #[error("query '{query}' returns rows but declares no result type")]
  MissingResult { query: String },

  #[error("'{declaration}' depends on '{dependency}', which was skipped")]
  SkippedDependency { declaration: String, dependency: String },
}

impl DeclError {
  pub fn declaration(&self) -> &str {
    match self {
      DeclError::Field { declaration, .. } => declaration,
      DeclError::Alias { alias, .. } => alias,
      DeclError::MissingResult { query } => query,
      DeclError::SkippedDependency { declaration, .. } => declaration,
    }
  }
}

/// Declarations with every field type resolved. Declarations that failed to
/// resolve are absent and listed in `rejected`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedDecls {
  pub package: String,
  pub structs: Vec<ResolvedStruct>,
  pub queries: Vec<ResolvedQuery>,
  pub rejected: Vec<DeclError>,
}

impl ResolvedDecls {
  pub fn find_struct(&self, name: &str) -> Option<&ResolvedStruct> {
    self.structs.iter().find(|s| s.name == name)
  }
}

pub struct DeclResolver {
  aliases: AliasTable,
  rejected_aliases: Vec<DeclError>,
}

impl DeclResolver {
  pub fn for_declarations(decls: &Declarations) -> Self {
    let (aliases, rejected) = AliasTable::from_defs(&decls.aliases);
    let rejected_aliases =
      rejected.into_iter().map(|(alias, source)| DeclError::Alias { alias, source }).collect();
    Self { aliases, rejected_aliases }
  }

  pub fn resolve_all(&self, decls: &Declarations) -> ResolvedDecls {
    let mut resolved = ResolvedDecls { package: decls.package.clone(), ..Default::default() };
    resolved.rejected.extend(self.rejected_aliases.iter().cloned());

    for def in &decls.structs {
      match self.resolve_struct(def) {
        Ok(s) => {
          debug!(struct_name = %s.name, fields = s.fields.len(), "resolved struct");
          resolved.structs.push(s);
        }
        Err(err) => {
          warn!(error = %err, "skipping struct declaration");
          resolved.rejected.push(err);
        }
      }
    }

    let declared: HashSet<&str> = decls.structs.iter().map(|s| s.name.as_str()).collect();
    let available: HashSet<&str> = resolved.structs.iter().map(|s| s.name.as_str()).collect();

    for def in &decls.queries {
      match self.resolve_query(def, &declared, &available) {
        Ok(q) => {
          debug!(query = %q.name, params = q.params.len(), "resolved query");
          resolved.queries.push(q);
        }
        Err(err) => {
          warn!(error = %err, "skipping query declaration");
          resolved.rejected.push(err);
        }
      }
    }

    resolved
  }

  fn resolve_struct(&self, def: &StructDef) -> Result<ResolvedStruct, DeclError> {
    let fields = def
      .fields
      .iter()
      .map(|field| resolve_field(field, &self.aliases))
      .collect::<Result<Vec<_>, _>>()
      .map_err(|source| DeclError::Field { declaration: def.name.clone(), source })?;

    Ok(ResolvedStruct { name: def.name.clone(), fields, comment: def.comment.clone() })
  }

  fn resolve_query(
    &self,
    def: &QueryDef,
    declared: &HashSet<&str>,
    available: &HashSet<&str>,
  ) -> Result<ResolvedQuery, DeclError> {
    let params = def
      .params
      .iter()
      .map(|field| resolve_field(field, &self.aliases))
      .collect::<Result<Vec<_>, _>>()
      .map_err(|source| DeclError::Field { declaration: def.name.clone(), source })?;

    let returns = match def.cmd {
      QueryCmd::One | QueryCmd::Many => {
        let expr = def.returns.as_ref().ok_or_else(|| DeclError::MissingResult { query: def.name.clone() })?;
        Some(self.resolve_return(def, expr, declared, available)?)
      }
      QueryCmd::ExecResult => Some(ResolvedReturn::Value(FieldType::from_canonical(
        "sql.Result".to_string(),
        CanonicalTypeName::new("sql.Result"),
        &self.aliases,
      ))),
      QueryCmd::ExecRows => Some(ResolvedReturn::Value(FieldType::from_canonical(
        "int64".to_string(),
        CanonicalTypeName::new("int64"),
        &self.aliases,
      ))),
      QueryCmd::Exec => None,
    };

    Ok(ResolvedQuery {
      name: def.name.clone(),
      cmd: def.cmd,
      params,
      params_struct: def.params_struct_name(),
      returns,
      comment: def.comment.clone(),
    })
  }

  /* Rows of a declared struct become its message; anything else is a value, repeated for `many` */
  fn resolve_return(
    &self,
    def: &QueryDef,
    expr: &TypeExpr,
    declared: &HashSet<&str>,
    available: &HashSet<&str>,
  ) -> Result<ResolvedReturn, DeclError> {
    if let TypeExpr::Ident(name) = expr {
      if available.contains(name.as_str()) {
        return Ok(ResolvedReturn::Message(name.clone()));
      }
      if declared.contains(name.as_str()) {
        return Err(DeclError::SkippedDependency { declaration: def.name.clone(), dependency: name.clone() });
      }
    }

    let value_type = match def.cmd {
      QueryCmd::Many => expr.clone().slice(),
      _ => expr.clone(),
    };
    let field = FieldDef::new("value", value_type);
    let resolved =
      resolve_field(&field, &self.aliases).map_err(|source| DeclError::Field { declaration: def.name.clone(), source })?;
    Ok(ResolvedReturn::Value(resolved.ty))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::decl::alias::NoAliases;

  fn nest(depth: usize) -> TypeExpr {
    let mut expr = TypeExpr::ident("T");
    for level in 0..depth {
      expr = if level % 2 == 0 { expr.pointer() } else { expr.slice() };
    }
    expr
  }

  #[test]
  fn test_prefix_composition() {
    let expr = TypeExpr::ident("T").pointer().slice();
    let name = resolve(&expr).unwrap();
    assert_eq!(name.as_str(), "[]*T");
    assert_eq!(name.shape(), NameShape::Slice("*T"));
    assert_eq!(name_shape("*T"), NameShape::Pointer("T"));
    assert_eq!(name_shape("T"), NameShape::Named("T"));

    let expr = TypeExpr::qualified("sql", "NullString").slice().pointer();
    assert_eq!(resolve(&expr).unwrap().as_str(), "*[]sql.NullString");
  }

  #[test]
  fn test_prefixes_follow_nesting_up_to_depth_five() {
    for depth in 0..=5 {
      let mut expected = String::new();
      for level in (0..depth).rev() {
        expected.push_str(if level % 2 == 0 { "*" } else { "[]" });
      }
      expected.push('T');
      assert_eq!(resolve(&nest(depth)).unwrap().as_str(), expected, "depth {}", depth);
    }
  }

  #[test]
  fn test_arrays_render_as_slices() {
    let expr: TypeExpr = "[16]byte".parse().unwrap();
    assert_eq!(resolve(&expr).unwrap().as_str(), "[]byte");
  }

  #[test]
  fn test_nested_selectors() {
    let expr: TypeExpr = "pgtype.types.Numeric".parse().unwrap();
    assert_eq!(resolve(&expr).unwrap().as_str(), "pgtype.types.Numeric");
  }

  #[test]
  fn test_unsupported_shapes_name_the_declared_type() {
    let expr: TypeExpr = "[]map[string]int".parse().unwrap();
    let err = resolve(&expr).unwrap_err();
    assert_eq!(
      err,
      ResolveError::UnsupportedTypeShape { shape: "map".to_string(), declared: "[]map[string]int".to_string() }
    );
    assert!(err.to_string().contains("[]map[string]int"));

    for text in ["func()", "chan int", "interface{}", "struct{}", "...int"] {
      assert!(resolve(&text.parse().unwrap()).is_err(), "{}", text);
    }
  }

  #[test]
  fn test_depth_limit() {
    assert!(resolve(&nest(MAX_TYPE_DEPTH - 1)).is_ok());
    let err = resolve(&nest(MAX_TYPE_DEPTH + 1)).unwrap_err();
    assert!(err.to_string().contains("nesting deeper than"));
  }

  #[test]
  fn test_resolve_all_skips_whole_declarations() {
    let yaml = r#"
package: books
aliases:
  - name: BookType
    underlying: string
structs:
  - name: Book
    fields:
      - { name: BookID, type: int32 }
      - { name: BookType, type: BookType }
  - name: Broken
    fields:
      - { name: Lookup, type: "map[string]int" }
queries:
  - name: GetBook
    cmd: one
    params: [ { name: BookID, type: int32 } ]
    returns: Book
  - name: GetBroken
    cmd: one
    returns: Broken
  - name: ListTitles
    cmd: many
    returns: string
  - name: NoResult
    cmd: many
  - name: CountBooks
    cmd: execrows
"#;
    let decls = Declarations::from_yaml(yaml).unwrap();
    let resolved = DeclResolver::for_declarations(&decls).resolve_all(&decls);

    assert_eq!(resolved.structs.len(), 1);
    let book = resolved.find_struct("Book").unwrap();
    assert_eq!(
      book.fields[1].ty.category,
      TypeCategory::Aliased { original: "BookType".to_string(), element: "string".to_string() }
    );

    let names: Vec<&str> = resolved.queries.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["GetBook", "ListTitles", "CountBooks"]);
    assert_eq!(resolved.queries[0].returns, Some(ResolvedReturn::Message("Book".to_string())));
    match &resolved.queries[1].returns {
      Some(ResolvedReturn::Value(ty)) => {
        assert!(ty.repeated);
        assert_eq!(ty.wire, "repeated string");
      }
      other => panic!("unexpected return {:?}", other),
    }

    let rejected: Vec<&str> = resolved.rejected.iter().map(|e| e.declaration()).collect();
    assert_eq!(rejected, vec!["Broken", "GetBroken", "NoResult"]);
    assert!(matches!(resolved.rejected[1], DeclError::SkippedDependency { .. }));
    assert!(matches!(resolved.rejected[2], DeclError::MissingResult { .. }));
  }

  #[test]
  fn test_field_errors_name_field_and_type() {
    let def = FieldDef::new("Settings", "map[string]string".parse().unwrap());
    let err = resolve_field(&def, &NoAliases).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Settings"));
    assert!(message.contains("map[string]string"));
  }
}
