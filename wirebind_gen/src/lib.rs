//! Wire service layer generation for typed data-access declarations.
//!
//! Declared Go types are resolved to canonical names, classified into a
//! closed set of categories, mapped onto protobuf wire types and bound in both
//! directions by emitted Go statements.

pub mod cmds;
pub mod codegen;
pub mod config;
pub mod decl;
pub mod mapping;
pub mod naming;
