use serde_derive::Serialize;
use std::fmt;

/// `database/sql` nullable wrappers and their well-known wire wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WrapperKind {
  Bool,
  Int32,
  Int64,
  Float64,
  String,
}

impl WrapperKind {
  pub const ALL: [WrapperKind; 5] =
    [WrapperKind::Bool, WrapperKind::Int32, WrapperKind::Int64, WrapperKind::Float64, WrapperKind::String];

  pub fn native_type(self) -> &'static str {
    match self {
      WrapperKind::Bool => "sql.NullBool",
      WrapperKind::Int32 => "sql.NullInt32",
      WrapperKind::Int64 => "sql.NullInt64",
      WrapperKind::Float64 => "sql.NullFloat64",
      WrapperKind::String => "sql.NullString",
    }
  }

  /* Name of the payload field next to `Valid` */
  pub fn payload_field(self) -> &'static str {
    match self {
      WrapperKind::Bool => "Bool",
      WrapperKind::Int32 => "Int32",
      WrapperKind::Int64 => "Int64",
      WrapperKind::Float64 => "Float64",
      WrapperKind::String => "String",
    }
  }

  pub fn wire_type(self) -> &'static str {
    match self {
      WrapperKind::Bool => "google.protobuf.BoolValue",
      WrapperKind::Int32 => "google.protobuf.Int32Value",
      WrapperKind::Int64 => "google.protobuf.Int64Value",
      WrapperKind::Float64 => "google.protobuf.DoubleValue",
      WrapperKind::String => "google.protobuf.StringValue",
    }
  }

  pub fn wire_constructor(self) -> &'static str {
    match self {
      WrapperKind::Bool => "wrapperspb.Bool",
      WrapperKind::Int32 => "wrapperspb.Int32",
      WrapperKind::Int64 => "wrapperspb.Int64",
      WrapperKind::Float64 => "wrapperspb.Double",
      WrapperKind::String => "wrapperspb.String",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressKind {
  Mac,
  Ip,
}

/// Closed set of semantic categories a native type can fall into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeCategory {
  /// Same name on both sides (`bool`, `string`, `int64`, ...).
  PlainScalar,
  NullableWrapper(WrapperKind),
  Temporal { nullable: bool },
  Uuid,
  NetworkAddress(AddressKind),
  /// Integer with no wire type of its own; `wire` is the wider wire integer.
  NarrowInteger { native: &'static str, wire: &'static str },
  RawBytes,
  /// Named type defined over a plain scalar or narrow integer; `element` is
  /// the Go scalar the value travels as.
  Aliased { original: String, element: String },
  /// `sql.Result` of an `execresult` query.
  ExecResult,
  /// Anything unrecognized; the name passes through untouched.
  Opaque,
}

impl TypeCategory {
  /* Values of these categories are copied without conversion */
  pub fn is_pass_through(&self) -> bool {
    matches!(self, TypeCategory::PlainScalar | TypeCategory::RawBytes | TypeCategory::Opaque)
  }
}

impl fmt::Display for TypeCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeCategory::PlainScalar => write!(f, "plain scalar"),
      TypeCategory::NullableWrapper(kind) => write!(f, "nullable wrapper ({})", kind.native_type()),
      TypeCategory::Temporal { nullable: true } => write!(f, "nullable timestamp"),
      TypeCategory::Temporal { nullable: false } => write!(f, "timestamp"),
      TypeCategory::Uuid => write!(f, "uuid"),
      TypeCategory::NetworkAddress(AddressKind::Mac) => write!(f, "hardware address"),
      TypeCategory::NetworkAddress(AddressKind::Ip) => write!(f, "ip address"),
      TypeCategory::NarrowInteger { native, wire } => write!(f, "narrow integer ({} as {})", native, wire),
      TypeCategory::RawBytes => write!(f, "raw bytes"),
      TypeCategory::Aliased { original, element } => write!(f, "alias ({} over {})", original, element),
      TypeCategory::ExecResult => write!(f, "execution result"),
      TypeCategory::Opaque => write!(f, "opaque"),
    }
  }
}

/// Wire token of a plain scalar, `None` for anything else.
pub fn plain_scalar_wire(name: &str) -> Option<&'static str> {
  match name {
    "bool" => Some("bool"),
    "string" => Some("string"),
    "int32" => Some("int32"),
    "int64" => Some("int64"),
    "uint32" => Some("uint32"),
    "uint64" => Some("uint64"),
    "float32" => Some("float"),
    "float64" => Some("double"),
    _ => None,
  }
}

fn narrow(native: &'static str, wire: &'static str) -> TypeCategory {
  TypeCategory::NarrowInteger { native, wire }
}

/// Exact-match catalog lookup on a canonical name with pointer and slice
/// prefixes already stripped (`[]byte` being the one slice in the catalog).
pub fn lookup(name: &str) -> Option<TypeCategory> {
  if plain_scalar_wire(name).is_some() {
    return Some(TypeCategory::PlainScalar);
  }

  let category = match name {
    "[]byte" | "json.RawMessage" => TypeCategory::RawBytes,
    "sql.NullBool" => TypeCategory::NullableWrapper(WrapperKind::Bool),
    "sql.NullInt32" => TypeCategory::NullableWrapper(WrapperKind::Int32),
    "sql.NullInt64" => TypeCategory::NullableWrapper(WrapperKind::Int64),
    "sql.NullFloat64" => TypeCategory::NullableWrapper(WrapperKind::Float64),
    "sql.NullString" => TypeCategory::NullableWrapper(WrapperKind::String),
    "sql.NullTime" => TypeCategory::Temporal { nullable: true },
    "time.Time" => TypeCategory::Temporal { nullable: false },
    "uuid.UUID" => TypeCategory::Uuid,
    "net.HardwareAddr" => TypeCategory::NetworkAddress(AddressKind::Mac),
    "net.IP" => TypeCategory::NetworkAddress(AddressKind::Ip),
    "int" => narrow("int", "int64"),
    "uint" => narrow("uint", "uint64"),
    "int8" => narrow("int8", "int32"),
    "int16" => narrow("int16", "int32"),
    "uint8" => narrow("uint8", "uint32"),
    "byte" => narrow("byte", "uint32"),
    "uint16" => narrow("uint16", "uint32"),
    "sql.Result" => TypeCategory::ExecResult,
    _ => return None,
  };
  Some(category)
}
