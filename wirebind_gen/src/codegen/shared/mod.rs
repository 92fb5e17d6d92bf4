pub mod binding;

use crate::decl::resolved::{ResolvedQuery, ResolvedReturn};
use wirebind_types::QueryCmd;

/* Shared by the schema and service emitters so both agree on message names */
pub const EXEC_RESULT_MESSAGE: &str = "ExecResult";

pub fn request_message(query: &ResolvedQuery) -> String {
  format!("{}Request", query.name)
}

/// Wire message an rpc answers with: the row message for `one` queries
/// returning a declared struct, the shared execution result for
/// `execresult`, otherwise a per-query response.
pub fn response_message(query: &ResolvedQuery) -> String {
  match (query.cmd, &query.returns) {
    (QueryCmd::One, Some(ResolvedReturn::Message(name))) => name.clone(),
    (QueryCmd::ExecResult, _) => EXEC_RESULT_MESSAGE.to_string(),
    _ => format!("{}Response", query.name),
  }
}
