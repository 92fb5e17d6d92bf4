use crate::decl::alias::{AliasResolver, MAX_ALIAS_DEPTH};
use crate::decl::resolved::{CanonicalTypeName, NameShape, name_shape};
use crate::mapping::category::{TypeCategory, lookup, plain_scalar_wire};
use tracing::debug;

pub const TIMESTAMP_PROTO: &str = "google/protobuf/timestamp.proto";
pub const WRAPPERS_PROTO: &str = "google/protobuf/wrappers.proto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  pub category: TypeCategory,
  /// A slice prefix was stripped.
  pub repeated: bool,
  /// Canonical name the category was derived from.
  pub element: String,
}

/// Classify a canonical name. Pointers are transparent; a slice prefix other
/// than `[]byte` is stripped and reported as `repeated`.
pub fn classify(name: &CanonicalTypeName, aliases: &dyn AliasResolver) -> Classification {
  let name = strip_pointers(name.as_str());
  if name == "[]byte" {
    return Classification { category: TypeCategory::RawBytes, repeated: false, element: name.to_string() };
  }

  match name_shape(name) {
    NameShape::Slice(rest) => {
      let element = strip_pointers(rest);
      let category = match name_shape(element) {
        NameShape::Slice(_) if element != "[]byte" => TypeCategory::Opaque,
        _ => classify_named(element, aliases),
      };
      Classification { category, repeated: true, element: element.to_string() }
    }
    _ => Classification { category: classify_named(name, aliases), repeated: false, element: name.to_string() },
  }
}

/// Wire schema token for a canonical name, `repeated` prefixes included.
pub fn to_wire_type(name: &str, aliases: &dyn AliasResolver) -> String {
  match name_shape(name) {
    NameShape::Pointer(rest) => to_wire_type(rest, aliases),
    NameShape::Slice(rest) if name != "[]byte" => format!("repeated {}", to_wire_type(rest, aliases)),
    _ => wire_token(&classify_named(name, aliases), name),
  }
}

/// Wire token of a single (non-repeated) value of `category`.
pub fn wire_token(category: &TypeCategory, name: &str) -> String {
  match category {
    TypeCategory::PlainScalar => plain_scalar_wire(name).unwrap_or(name).to_string(),
    TypeCategory::NullableWrapper(kind) => kind.wire_type().to_string(),
    TypeCategory::Temporal { .. } => "google.protobuf.Timestamp".to_string(),
    TypeCategory::Uuid | TypeCategory::NetworkAddress(_) => "string".to_string(),
    TypeCategory::NarrowInteger { wire, .. } => wire.to_string(),
    TypeCategory::RawBytes => "bytes".to_string(),
    TypeCategory::Aliased { element, .. } => plain_scalar_wire(element).unwrap_or(element.as_str()).to_string(),
    TypeCategory::ExecResult => "ExecResult".to_string(),
    TypeCategory::Opaque => name.to_string(),
  }
}

/// Well-known proto file a category's wire type lives in.
pub fn proto_import(category: &TypeCategory) -> Option<&'static str> {
  match category {
    TypeCategory::Temporal { .. } => Some(TIMESTAMP_PROTO),
    TypeCategory::NullableWrapper(_) => Some(WRAPPERS_PROTO),
    _ => None,
  }
}

fn strip_pointers(mut name: &str) -> &str {
  while let NameShape::Pointer(rest) = name_shape(name) {
    name = rest;
  }
  name
}

/* Catalog first, then the alias chain, then opaque pass-through */
fn classify_named(name: &str, aliases: &dyn AliasResolver) -> TypeCategory {
  if let Some(category) = lookup(name) {
    return category;
  }

  let mut current = name.to_string();
  for _ in 0..MAX_ALIAS_DEPTH {
    let Some(underlying) = aliases.underlying(&current) else {
      break;
    };
    let element = match lookup(underlying.as_str()) {
      Some(TypeCategory::PlainScalar) => underlying.as_str().to_string(),
      Some(TypeCategory::NarrowInteger { wire, .. }) => wire.to_string(),
      Some(_) => break,
      None => {
        current = underlying.as_str().to_string();
        continue;
      }
    };
    return TypeCategory::Aliased { original: name.to_string(), element };
  }

  debug!(type_name = name, "no wire mapping, passing type name through");
  TypeCategory::Opaque
}
