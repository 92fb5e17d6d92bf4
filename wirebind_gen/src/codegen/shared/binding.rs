use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/* Go import paths referenced by emitted fragments */
pub mod go_imports {
  pub const SQL: &str = "database/sql";
  pub const FMT: &str = "fmt";
  pub const NET: &str = "net";
  pub const TIME: &str = "time";
  pub const UUID: &str = "github.com/google/uuid";
  pub const TIMESTAMPPB: &str = "google.golang.org/protobuf/types/known/timestamppb";
  pub const WRAPPERSPB: &str = "google.golang.org/protobuf/types/known/wrapperspb";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
  ToWire,
  ToNative,
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Direction::ToWire => write!(f, "to wire"),
      Direction::ToNative => write!(f, "to native"),
    }
  }
}

/// Who is to blame for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
  /// Bad request input; reported to the caller, never retried or logged.
  Client,
  /// Generation or server-side failure.
  Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
  InvalidField,
  MissingRequiredField,
}

/// A run-time failure an emitted fragment can return.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldFailure {
  pub field: String,
  pub kind: FailureKind,
}

impl FieldFailure {
  pub fn fault(&self) -> Fault {
    Fault::Client
  }
}

impl fmt::Display for FieldFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      FailureKind::InvalidField => write!(f, "InvalidFieldError({})", self.field),
      FailureKind::MissingRequiredField => write!(f, "MissingRequiredFieldError({})", self.field),
    }
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
  /// The declared type has a shape outside the supported vocabulary.
  #[error("field '{field}': unsupported type '{declared}': {reason}")]
  UnsupportedTypeShape { field: String, declared: String, reason: String },

  /// The category has no representation in the requested direction.
  #[error("field '{field}': type '{declared}' cannot be bound {direction}")]
  UnsupportedBinding { field: String, declared: String, direction: Direction },
}

impl BindError {
  pub fn fault(&self) -> Fault {
    Fault::Internal
  }

  pub fn field(&self) -> &str {
    match self {
      BindError::UnsupportedTypeShape { field, .. } | BindError::UnsupportedBinding { field, .. } => field,
    }
  }
}

/// Settings shared by both binders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
  /// Client-fault marker wrapped into every emitted failure.
  pub user_error_sentinel: String,
  /// Import path of the package defining the sentinel.
  pub validation_import: Option<String>,
  /// Statement returning the current `err` from the enclosing function.
  pub error_return: String,
  /// Package alias of the protobuf generated code.
  pub wire_package: String,
}

impl Default for BindOptions {
  fn default() -> Self {
    Self {
      user_error_sentinel: "validation.ErrUserInput".to_string(),
      validation_import: None,
      error_return: "return nil, err".to_string(),
      wire_package: "pb".to_string(),
    }
  }
}

/// Ordered Go statements for one field in one direction, with what they need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
  pub field: String,
  pub direction: Direction,
  pub wire_type: String,
  pub statements: Vec<String>,
  pub imports: BTreeSet<String>,
  pub failures: Vec<FieldFailure>,
}

impl Binding {
  pub fn new(field: impl Into<String>, direction: Direction, wire_type: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      direction,
      wire_type: wire_type.into(),
      statements: Vec::new(),
      imports: BTreeSet::new(),
      failures: Vec::new(),
    }
  }

  pub fn push(&mut self, statement: impl Into<String>) {
    self.statements.push(statement.into());
  }

  pub fn import(&mut self, path: &str) {
    self.imports.insert(path.to_string());
  }

  pub fn fail(&mut self, kind: FailureKind) {
    let failure = FieldFailure { field: self.field.clone(), kind };
    if !self.failures.contains(&failure) {
      self.failures.push(failure);
    }
  }

  pub fn can_fail(&self) -> bool {
    !self.failures.is_empty()
  }

  /* Statements one per line, each prefixed with `indent` */
  pub fn render(&self, indent: &str) -> String {
    let mut out = String::new();
    for statement in &self.statements {
      out.push_str(indent);
      out.push_str(statement);
      out.push('\n');
    }
    out
  }
}
