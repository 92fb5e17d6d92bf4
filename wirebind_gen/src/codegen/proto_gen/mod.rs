pub mod schema;

/* Re-export main public functions */
pub use schema::{
  collect_imports, emit_exec_result_message, emit_message, emit_query_messages, emit_service, emit_struct_message,
};
