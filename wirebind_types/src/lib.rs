//! Declaration Type Definitions
//!
//! This crate contains the core data structures describing the native
//! declarations a wire service layer is derived from: Go-style type
//! expressions and the declaration files that group them into row structs,
//! enum aliases and queries. It provides pure data structures without any
//! file I/O or code generation logic.

pub mod expr;
pub mod types;

// Re-export commonly used types at the crate root
pub use expr::*;
pub use types::*;
