pub mod analyze;
pub mod case;
pub mod codegen;
pub mod common;
