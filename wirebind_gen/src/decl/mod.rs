pub mod alias;
pub mod file;
pub mod resolved;

pub use alias::{AliasResolver, AliasTable, NoAliases};
pub use resolved::{CanonicalTypeName, FieldType, ResolveError, resolve};
