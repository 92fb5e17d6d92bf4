pub mod go;
pub mod go_gen;
pub mod proto;
pub mod proto_gen;
pub mod shared;

use crate::codegen::go_gen::{emit_adapter, emit_method};
use crate::codegen::shared::binding::BindOptions;
use crate::decl::resolved::{DeclError, ResolvedDecls, ResolvedReturn};
use std::collections::HashSet;
use tracing::warn;

/// Drop every declaration one of the binders cannot handle, along with the
/// queries returning a dropped struct, so the schema and the service stay in
/// step.
pub fn prune_unbindable(mut decls: ResolvedDecls, options: &BindOptions) -> ResolvedDecls {
  let mut rejected = Vec::new();

  decls.structs.retain(|def| match emit_adapter(def, options) {
    Ok(_) => true,
    Err(err) => {
      warn!(error = %err, "dropping struct with unbindable fields");
      rejected.push(err);
      false
    }
  });

  let available: HashSet<String> = decls.structs.iter().map(|s| s.name.clone()).collect();
  decls.queries.retain(|query| {
    if let Some(ResolvedReturn::Message(name)) = &query.returns {
      if !available.contains(name) {
        rejected.push(DeclError::SkippedDependency { declaration: query.name.clone(), dependency: name.clone() });
        return false;
      }
    }
    match emit_method(query, options) {
      Ok(_) => true,
      Err(err) => {
        warn!(error = %err, "dropping query with unbindable fields");
        rejected.push(err);
        false
      }
    }
  });

  decls.rejected.extend(rejected);
  decls
}
