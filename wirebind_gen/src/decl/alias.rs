/* Alias lookup used by the classifier's fallback rule */

use crate::decl::resolved::{CanonicalTypeName, ResolveError, resolve};
use indexmap::IndexMap;
use wirebind_types::AliasDef;

/* Alias chains longer than this are treated as unresolvable */
pub const MAX_ALIAS_DEPTH: usize = 8;

/// Symbol-table callback answering "what is `name` declared as?".
pub trait AliasResolver {
  fn underlying(&self, name: &str) -> Option<CanonicalTypeName>;
}

/// Resolver for callers without a symbol table.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasResolver for NoAliases {
  fn underlying(&self, _name: &str) -> Option<CanonicalTypeName> {
    None
  }
}

impl<F> AliasResolver for F
where
  F: Fn(&str) -> Option<CanonicalTypeName>,
{
  fn underlying(&self, name: &str) -> Option<CanonicalTypeName> {
    self(name)
  }
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
  entries: IndexMap<String, CanonicalTypeName>,
}

impl AliasTable {
  pub fn new() -> Self {
    Self { entries: IndexMap::new() }
  }

  /* Build a table from alias declarations, returning the ones whose underlying type cannot be resolved */
  pub fn from_defs(defs: &[AliasDef]) -> (Self, Vec<(String, ResolveError)>) {
    let mut table = Self::new();
    let mut rejected = Vec::new();
    for def in defs {
      match resolve(&def.underlying) {
        Ok(underlying) => {
          table.insert(def.name.clone(), underlying);
        }
        Err(err) => rejected.push((def.name.clone(), err)),
      }
    }
    (table, rejected)
  }

  pub fn insert(&mut self, name: impl Into<String>, underlying: CanonicalTypeName) -> Option<CanonicalTypeName> {
    self.entries.insert(name.into(), underlying)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl AliasResolver for AliasTable {
  fn underlying(&self, name: &str) -> Option<CanonicalTypeName> {
    self.entries.get(name).cloned()
  }
}
