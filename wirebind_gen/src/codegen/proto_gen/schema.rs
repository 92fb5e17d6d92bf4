use crate::codegen::shared::{EXEC_RESULT_MESSAGE, request_message, response_message};
use crate::decl::resolved::{FieldType, ResolvedField, ResolvedQuery, ResolvedReturn, ResolvedStruct};
use crate::mapping::proto_import;
use crate::naming::wire_field_name;
use std::collections::BTreeSet;
use wirebind_types::QueryCmd;

fn emit_comment(comment: Option<&str>, indent: &str, output: &mut String) {
  if let Some(comment) = comment {
    for line in comment.lines() {
      output.push_str(&format!("{}// {}\n", indent, line));
    }
  }
}

/* Fields are numbered from 1 in declaration order */
pub fn emit_message(name: &str, fields: &[(String, String)], comment: Option<&str>) -> String {
  let mut output = String::new();
  emit_comment(comment, "", &mut output);
  if fields.is_empty() {
    output.push_str(&format!("message {} {{}}\n", name));
    return output;
  }

  output.push_str(&format!("message {} {{\n", name));
  for (index, (field_name, wire)) in fields.iter().enumerate() {
    output.push_str(&format!("  {} {} = {};\n", wire, field_name, index + 1));
  }
  output.push_str("}\n");
  output
}

fn wire_fields(fields: &[ResolvedField]) -> Vec<(String, String)> {
  fields.iter().map(|f| (wire_field_name(&f.name), f.ty.wire.clone())).collect()
}

pub fn emit_struct_message(def: &ResolvedStruct) -> String {
  emit_message(&def.name, &wire_fields(&def.fields), def.comment.as_deref())
}

pub fn emit_exec_result_message() -> String {
  let fields = vec![
    ("last_insert_id".to_string(), "int64".to_string()),
    ("rows_affected".to_string(), "int64".to_string()),
  ];
  emit_message(EXEC_RESULT_MESSAGE, &fields, None)
}

/// Request message and, unless the rpc answers with a shared message, its
/// response message.
pub fn emit_query_messages(query: &ResolvedQuery) -> String {
  let mut output = emit_message(&request_message(query), &wire_fields(&query.params), None);

  let value = match (query.cmd, &query.returns) {
    (QueryCmd::One, Some(ResolvedReturn::Message(_))) | (QueryCmd::ExecResult, _) => return output,
    (QueryCmd::Many, Some(ResolvedReturn::Message(name))) => Some(format!("repeated {}", name)),
    (QueryCmd::Exec, _) | (_, None) => None,
    (_, Some(ResolvedReturn::Value(ty))) => Some(ty.wire.clone()),
    (_, Some(ResolvedReturn::Message(name))) => Some(name.clone()),
  };

  let fields: Vec<(String, String)> = value.into_iter().map(|wire| ("value".to_string(), wire)).collect();
  output.push('\n');
  output.push_str(&emit_message(&response_message(query), &fields, None));
  output
}

pub fn emit_service(service_name: &str, queries: &[ResolvedQuery]) -> String {
  let mut output = format!("service {} {{\n", service_name);
  for query in queries {
    emit_comment(query.comment.as_deref(), "  ", &mut output);
    output.push_str(&format!(
      "  rpc {}({}) returns ({}) {{}}\n",
      query.name,
      request_message(query),
      response_message(query)
    ));
  }
  output.push_str("}\n");
  output
}

/// Well-known proto files referenced by the given field types.
pub fn collect_imports<'a>(types: impl IntoIterator<Item = &'a FieldType>) -> BTreeSet<&'static str> {
  types.into_iter().filter_map(|ty| proto_import(&ty.category)).collect()
}
