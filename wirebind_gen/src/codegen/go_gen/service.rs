use super::adapters::adapter_name;
use super::to_native::bind_to_native;
use super::to_wire::bind_to_wire;
use super::{GoFragment, go_variable};
use crate::codegen::shared::binding::{BindOptions, Binding, Direction};
use crate::codegen::shared::{request_message, response_message};
use crate::decl::resolved::{DeclError, ResolvedQuery, ResolvedReturn};
use crate::mapping::TypeCategory;
use wirebind_types::QueryCmd;

pub const CONTEXT_IMPORT: &str = "context";
pub const ZAP_IMPORT: &str = "go.uber.org/zap";

/// Service struct embedding the generated server stub, and its constructor.
pub fn emit_service_header(service_name: &str, options: &BindOptions) -> String {
  let pb = &options.wire_package;
  let mut out = String::new();
  out.push_str("type Service struct {\n");
  out.push_str(&format!("\t{}.Unimplemented{}Server\n", pb, service_name));
  out.push_str("\tlogger  *zap.Logger\n");
  out.push_str("\tquerier *Queries\n");
  out.push_str("}\n\n");
  out.push_str("func NewService(querier *Queries, logger *zap.Logger) *Service {\n");
  out.push_str("\treturn &Service{querier: querier, logger: logger}\n");
  out.push_str("}\n");
  out
}

/* Request unpacking: one parameter binds a fresh variable, several fill the params struct */
fn emit_unpack(query: &ResolvedQuery, options: &BindOptions) -> Result<(Vec<Binding>, String), DeclError> {
  let fail = |source| DeclError::Field { declaration: query.name.clone(), source };

  match query.params.as_slice() {
    [] => Ok((Vec::new(), "ctx".to_string())),
    [param] => {
      let var = go_variable(&param.name);
      let binding = bind_to_native(&param.name, &param.ty, "in", &var, true, options).map_err(fail)?;
      Ok((vec![binding], format!("ctx, {}", var)))
    }
    params => {
      let mut decl = Binding::new("arg", Direction::ToNative, "");
      decl.push(format!("var arg {}", query.params_struct));
      let mut bindings = vec![decl];
      for param in params {
        let dst = format!("arg.{}", param.name);
        bindings.push(bind_to_native(&param.name, &param.ty, "in", &dst, false, options).map_err(fail)?);
      }
      Ok((bindings, "ctx, arg".to_string()))
    }
  }
}

fn emit_response(query: &ResolvedQuery, options: &BindOptions) -> Result<Binding, DeclError> {
  let pb = &options.wire_package;
  let response = response_message(query);
  let fail = |source| DeclError::Field { declaration: query.name.clone(), source };
  let mut out = Binding::new("value", Direction::ToWire, response.clone());

  match (query.cmd, &query.returns) {
    (QueryCmd::Exec, _) => {
      out.push(format!("out = new({}.{})", pb, response));
    }
    (QueryCmd::One, Some(ResolvedReturn::Message(name))) => {
      out.push(format!("return {}(result)", adapter_name(name)));
      return Ok(out);
    }
    (_, Some(ResolvedReturn::Message(name))) => {
      out.push(format!("out = new({}.{})", pb, response));
      out.push("for _, r := range result {");
      out.push(format!("\tvar item *{}.{}", pb, name));
      out.push(format!("\titem, err = {}(r)", adapter_name(name)));
      out.push("\tif err != nil {");
      out.push("\t\treturn");
      out.push("\t}");
      out.push("\tout.Value = append(out.Value, item)");
      out.push("}");
    }
    (_, Some(ResolvedReturn::Value(ty))) if ty.category == TypeCategory::ExecResult => {
      let binding = bind_to_wire("Value", ty, "result", "out", options).map_err(fail)?;
      out.statements.extend(binding.statements);
      out.imports.extend(binding.imports);
    }
    (_, Some(ResolvedReturn::Value(ty))) => {
      out.push(format!("out = new({}.{})", pb, response));
      let binding = bind_to_wire("Value", ty, "result", "out.Value", options).map_err(fail)?;
      out.statements.extend(binding.statements);
      out.imports.extend(binding.imports);
    }
    (_, None) => return Err(DeclError::MissingResult { query: query.name.clone() }),
  }

  out.push("return");
  Ok(out)
}

/// One service method: unpack the request, call the querier, build the response.
pub fn emit_method(query: &ResolvedQuery, options: &BindOptions) -> Result<GoFragment, DeclError> {
  let pb = &options.wire_package;
  let (unpack, args) = emit_unpack(query, options)?;
  let response = emit_response(query, options)?;

  let mut fragment = GoFragment::default();
  for binding in unpack.iter().chain(std::iter::once(&response)) {
    fragment.imports.extend(binding.imports.iter().cloned());
  }

  let code = &mut fragment.code;
  if let Some(comment) = &query.comment {
    for line in comment.lines() {
      code.push_str(&format!("// {}\n", line));
    }
  }
  code.push_str(&format!(
    "func (s *Service) {}(ctx context.Context, in *{}.{}) (out *{}.{}, err error) {{\n",
    query.name,
    pb,
    request_message(query),
    pb,
    response_message(query)
  ));

  for binding in &unpack {
    code.push_str(&binding.render("\t"));
  }
  if !unpack.is_empty() {
    code.push('\n');
  }

  match query.cmd {
    QueryCmd::Exec => code.push_str(&format!("\terr = s.querier.{}({})\n", query.name, args)),
    _ => code.push_str(&format!("\tresult, err := s.querier.{}({})\n", query.name, args)),
  }
  code.push_str("\tif err != nil {\n");
  code.push_str(&format!("\t\ts.logger.Error(\"{} sql call failed\", zap.Error(err))\n", query.name));
  code.push_str("\t\treturn\n");
  code.push_str("\t}\n");
  code.push_str(&response.render("\t"));
  code.push_str("}\n");

  Ok(fragment)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::decl::file::Declarations;
  use crate::decl::resolved::DeclResolver;

  fn query(yaml: &str, name: &str) -> ResolvedQuery {
    let decls = Declarations::from_yaml(yaml).unwrap();
    let resolved = DeclResolver::for_declarations(&decls).resolve_all(&decls);
    resolved.queries.into_iter().find(|q| q.name == name).unwrap()
  }

  const BOOKS: &str = r#"
package: books
structs:
  - name: Book
    fields:
      - { name: BookID, type: int32 }
queries:
  - name: GetBook
    cmd: one
    params: [ { name: BookID, type: int32 } ]
    returns: Book
  - name: DeleteBook
    cmd: exec
    params: [ { name: BookID, type: int32 } ]
  - name: ListBooks
    cmd: many
    returns: Book
  - name: CreateBook
    cmd: one
    params:
      - { name: AuthorID, type: int32 }
      - { name: Available, type: time.Time }
    returns: Book
  - name: CreateAuthor
    cmd: execresult
    params: [ { name: Name, type: string } ]
  - name: BooksAvailableOn
    cmd: many
    params: [ { name: Dates, type: "[]time.Time" } ]
    returns: Book
"#;

  #[test]
  fn single_param_one_query() {
    let fragment = emit_method(&query(BOOKS, "GetBook"), &BindOptions::default()).unwrap();
    let expected = "\
func (s *Service) GetBook(ctx context.Context, in *pb.GetBookRequest) (out *pb.Book, err error) {
\tbookID := in.GetBookId()

\tresult, err := s.querier.GetBook(ctx, bookID)
\tif err != nil {
\t\ts.logger.Error(\"GetBook sql call failed\", zap.Error(err))
\t\treturn
\t}
\treturn toBook(result)
}
";
    assert_eq!(fragment.code, expected);
  }

  #[test]
  fn exec_query() {
    let fragment = emit_method(&query(BOOKS, "DeleteBook"), &BindOptions::default()).unwrap();
    assert!(fragment.code.contains("\terr = s.querier.DeleteBook(ctx, bookID)\n"));
    assert!(fragment.code.contains("\tout = new(pb.DeleteBookResponse)\n\treturn\n}"));
  }

  #[test]
  fn many_query_without_params() {
    let fragment = emit_method(&query(BOOKS, "ListBooks"), &BindOptions::default()).unwrap();
    assert!(fragment.code.contains("in *pb.ListBooksRequest) (out *pb.ListBooksResponse, err error) {\n\tresult, err :="));
    assert!(fragment.code.contains("\t\titem, err = toBook(r)\n"));
    assert!(fragment.code.contains("\t\tout.Value = append(out.Value, item)\n"));
  }

  #[test]
  fn multiple_params_fill_params_struct() {
    let fragment = emit_method(&query(BOOKS, "CreateBook"), &BindOptions::default()).unwrap();
    assert!(fragment.code.contains("\tvar arg CreateBookParams\n\targ.AuthorID = in.GetAuthorId()\n"));
    assert!(fragment.code.contains("\t\targ.Available = v.AsTime()\n"));
    assert!(fragment.code.contains("s.querier.CreateBook(ctx, arg)"));
    assert!(fragment.imports.contains("fmt"));
  }

  #[test]
  fn exec_result_query() {
    let fragment = emit_method(&query(BOOKS, "CreateAuthor"), &BindOptions::default()).unwrap();
    assert!(fragment.code.contains("(out *pb.ExecResult, err error)"));
    assert!(fragment.code.contains(
      "\tout = new(pb.ExecResult)\n\tif out.LastInsertId, err = result.LastInsertId(); err != nil {\n\t\treturn nil, err\n\t}\n"
    ));
    assert!(fragment.code.contains("\tif out.RowsAffected, err = result.RowsAffected(); err != nil {\n"));
    assert!(!fragment.code.contains(", _ ="));
  }

  #[test]
  fn repeated_timestamp_param_imports_time() {
    let fragment = emit_method(&query(BOOKS, "BooksAvailableOn"), &BindOptions::default()).unwrap();
    assert!(fragment.code.contains("\tdates := make([]time.Time, 0, len(in.GetDates()))\n"));
    assert!(fragment.imports.contains("time"));
  }

  #[test]
  fn header_embeds_server_stub() {
    let header = emit_service_header("BooksService", &BindOptions::default());
    assert!(header.contains("\tpb.UnimplementedBooksServiceServer\n"));
    assert!(header.contains("func NewService(querier *Queries, logger *zap.Logger) *Service {"));
  }
}
