/* Code Generation Tests
 *
 * These tests run the booktest fixture through loading, resolution, pruning
 * and both emitters, and drive the codegen command against temporary output
 * directories.
 */

use std::fs;
use std::path::PathBuf;
use wirebind_gen::cmds::codegen::{CodegenArgs, Target, run};
use wirebind_gen::codegen::go::GoCodeGenerator;
use wirebind_gen::codegen::proto::ProtoCodeGenerator;
use wirebind_gen::codegen::prune_unbindable;
use wirebind_gen::config::GenConfig;
use wirebind_gen::decl::file::{DeclLoader, Declarations};
use wirebind_gen::decl::resolved::{DeclResolver, ResolvedDecls};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn load_books() -> Declarations {
    let mut loader = DeclLoader::new(Vec::new());
    loader.load_file_with_imports(&fixture("books.yaml")).unwrap();
    loader.merge().unwrap()
}

fn resolve_books() -> ResolvedDecls {
    let decls = load_books();
    let resolved = DeclResolver::for_declarations(&decls).resolve_all(&decls);
    let bind = GenConfig::default().resolve(&decls.package).bind_options();
    prune_unbindable(resolved, &bind)
}

fn args(files: Vec<PathBuf>, output_dir: PathBuf) -> CodegenArgs {
    CodegenArgs {
        files,
        include_dirs: Vec::new(),
        target: Target::All,
        output_dir,
        config: None,
        overrides: GenConfig::default(),
        allow_partial: false,
        verbose: false,
    }
}

#[test]
fn test_fixture_loads_imports_first() {
    let mut loader = DeclLoader::new(Vec::new());
    loader.load_file_with_imports(&fixture("books.yaml")).unwrap();
    assert_eq!(loader.loaded_file_count(), 2);

    let decls = loader.merge().unwrap();
    assert_eq!(decls.package, "books");
    assert_eq!(decls.aliases.len(), 1);
    let structs: Vec<&str> = decls.structs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(structs, vec!["Author", "Book"]);
    assert_eq!(decls.queries.len(), 7);
}

#[test]
fn test_fixture_resolves_cleanly() {
    let resolved = resolve_books();
    assert!(resolved.rejected.is_empty(), "unexpected rejections: {:?}", resolved.rejected);
    assert_eq!(resolved.structs.len(), 2);
    assert_eq!(resolved.queries.len(), 7);
}

#[test]
fn test_proto_schema() {
    let resolved = resolve_books();
    let config = GenConfig::default().resolve(&resolved.package);
    let generator = ProtoCodeGenerator::new(config.proto_options(&PathBuf::from("out")));
    let schema = generator.emit_code(&resolved);

    assert!(schema.starts_with("// Code generated by wirebind-gen. DO NOT EDIT.\n\nsyntax = \"proto3\";\n"));
    assert!(schema.contains("package books.v1;\n"));
    assert!(schema.contains("option go_package = \"books/api/books/v1\";\n"));
    assert!(schema.contains(
        "import \"google/protobuf/timestamp.proto\";\nimport \"google/protobuf/wrappers.proto\";\n"
    ));

    let book = "\
// A published book.
message Book {
  int32 book_id = 1;
  int32 author_id = 2;
  string isbn = 3;
  string book_type = 4;
  string title = 5;
  int32 year = 6;
  google.protobuf.Timestamp available = 7;
  repeated string tags = 8;
}
";
    assert!(schema.contains(book));
    assert!(schema.contains("  google.protobuf.StringValue bio = 3;\n"));

    assert!(schema.contains("service BooksService {\n  rpc GetAuthor(GetAuthorRequest) returns (Author) {}\n"));
    assert!(schema.contains(
        "  // Books carrying any of the given tags.\n  rpc BooksByTags(BooksByTagsRequest) returns (BooksByTagsResponse) {}\n"
    ));
    assert!(schema.contains("  rpc CreateAuthor(CreateAuthorRequest) returns (ExecResult) {}\n"));

    assert!(schema.contains("message BooksByTagsRequest {\n  repeated string dollar1 = 1;\n}\n"));
    assert!(schema.contains("message BooksByTagsResponse {\n  repeated Book value = 1;\n}\n"));
    assert!(schema.contains("message DeleteBookResponse {}\n"));
    assert!(schema.contains("message CountBooksRequest {}\n"));
    assert!(schema.contains("message CountBooksResponse {\n  int64 value = 1;\n}\n"));
    assert!(schema.contains("message ListTitlesResponse {\n  repeated string value = 1;\n}\n"));
    assert!(schema.contains("message ExecResult {\n  int64 last_insert_id = 1;\n  int64 rows_affected = 2;\n}\n"));
    assert!(!schema.contains("message GetAuthorResponse"));
    assert!(!schema.contains("message CreateAuthorResponse"));
}

#[test]
fn test_go_adapters_and_service() {
    let resolved = resolve_books();
    let config = GenConfig::default().resolve(&resolved.package);
    let generator = GoCodeGenerator::new(config.go_options(&PathBuf::from("out")));
    let output = generator.emit_code(&resolved);
    assert!(output.skipped.is_empty());

    let adapters = &output.adapters;
    assert!(adapters.starts_with("// Code generated by wirebind-gen. DO NOT EDIT.\n\npackage books\n"));
    assert!(adapters.contains("\tpb \"books/api/books/v1\"\n"));
    assert!(adapters.contains("func toAuthor(in Author) (out *pb.Author, err error) {\n"));
    assert!(adapters.contains("func toBook(in Book) (out *pb.Book, err error) {\n\tout = new(pb.Book)\n"));
    assert!(adapters.contains("\tout.BookType = string(in.BookType)\n"));
    assert!(adapters.contains("\tout.Available = timestamppb.New(in.Available)\n"));
    assert!(adapters.contains("\tout.Tags = in.Tags\n"));

    let service = &output.service;
    assert!(service.contains("\t\"context\"\n"));
    assert!(service.contains("\t\"go.uber.org/zap\"\n"));
    assert!(service.contains("\t\"database/sql\"\n"));
    assert!(service.contains("\t\"books/internal/validation\"\n"));
    assert!(service.contains("\tpb.UnimplementedBooksServiceServer\n"));

    assert!(service.contains("// Books carrying any of the given tags.\nfunc (s *Service) BooksByTags("));
    assert!(service.contains("\tdollar1 := in.GetDollar1()\n\n\tresult, err := s.querier.BooksByTags(ctx, dollar1)\n"));
    assert!(service.contains("\tvar arg CreateBookParams\n"));
    assert!(service.contains("\targ.BookType = BookType(in.GetBookType())\n"));
    assert!(service.contains("\targ.Tags = in.GetTags()\n"));
    assert!(service.contains("\t\terr := fmt.Errorf(\"field Available is required%w\", validation.ErrUserInput)\n"));
    assert!(service.contains("\tresult, err := s.querier.CountBooks(ctx)\n"));
    assert!(service.contains("\tout = new(pb.CountBooksResponse)\n\tout.Value = result\n\treturn\n}\n"));
    assert!(service.contains("\tout = new(pb.ListTitlesResponse)\n\tout.Value = result\n\treturn\n}\n"));
    assert!(service.contains(
        "\tout = new(pb.ExecResult)\n\tif out.LastInsertId, err = result.LastInsertId(); err != nil {\n\t\treturn nil, err\n\t}\n"
    ));
}

#[test]
fn test_codegen_command_writes_all_targets() {
    let dir = tempfile::tempdir().unwrap();
    let mut codegen = args(vec![fixture("books.yaml")], dir.path().to_path_buf());
    codegen.overrides = GenConfig { module: Some("example.com/booktest".to_string()), ..Default::default() };

    let written = run(codegen).unwrap();
    let names: Vec<String> =
        written.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(names, vec!["books.proto", "adapters.go", "service.go"]);

    let schema = fs::read_to_string(dir.path().join("books.proto")).unwrap();
    assert!(schema.contains("option go_package = \"example.com/booktest/api/books/v1\";\n"));

    let service = fs::read_to_string(dir.path().join("service.go")).unwrap();
    assert!(service.contains("\t\"example.com/booktest/internal/validation\"\n"));
    assert!(service.contains("\tpb \"example.com/booktest/api/books/v1\"\n"));
}

#[test]
fn test_codegen_command_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("wirebind.yaml");
    fs::write(&config_path, "service-name: Library\nproto-package: library.v1\n").unwrap();

    let output_dir = dir.path().join("gen");
    let mut codegen = args(vec![fixture("books.yaml")], output_dir.clone());
    codegen.target = Target::Proto;
    codegen.config = Some(config_path);

    let written = run(codegen).unwrap();
    assert_eq!(written, vec![output_dir.join("books.proto")]);
    assert!(!output_dir.join("service.go").exists());

    let schema = fs::read_to_string(output_dir.join("books.proto")).unwrap();
    assert!(schema.contains("package library.v1;\n"));
    assert!(schema.contains("service Library {\n"));
}

#[test]
fn test_unbindable_declarations_need_allow_partial() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.yaml");
    fs::write(
        &input,
        r#"
package: notes
structs:
  - name: Note
    fields:
      - { name: NoteID, type: int64 }
      - { name: Drafts, type: "[]sql.NullString" }
  - name: Tag
    fields:
      - { name: Name, type: string }
      - { name: Meta, type: "map[string]string" }
  - name: Label
    fields:
      - { name: Text, type: string }
queries:
  - name: GetNote
    cmd: one
    params: [ { name: NoteID, type: int64 } ]
    returns: Note
  - name: GetTag
    cmd: one
    returns: Tag
  - name: ListLabels
    cmd: many
    returns: Label
"#,
    )
    .unwrap();

    let output_dir = dir.path().join("gen");
    let err = run(args(vec![input.clone()], output_dir.clone())).unwrap_err();
    assert!(err.to_string().contains("--allow-partial"));
    assert!(!output_dir.exists());

    let mut partial = args(vec![input], output_dir.clone());
    partial.allow_partial = true;
    run(partial).unwrap();

    let schema = fs::read_to_string(output_dir.join("notes.proto")).unwrap();
    assert!(schema.contains("message Label {\n"));
    assert!(schema.contains("rpc ListLabels(ListLabelsRequest) returns (ListLabelsResponse) {}"));
    assert!(!schema.contains("message Note "));
    assert!(!schema.contains("message Tag "));
    assert!(!schema.contains("GetNote"));
    assert!(!schema.contains("GetTag"));

    let service = fs::read_to_string(output_dir.join("service.go")).unwrap();
    assert!(service.contains("func (s *Service) ListLabels("));
    assert!(!service.contains("GetNote"));
}

#[test]
fn test_missing_import_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.yaml");
    fs::write(&input, "package: broken\nimports:\n  - nowhere.yaml\n").unwrap();

    let err = run(args(vec![input], dir.path().join("gen"))).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("loading declarations from"));
    assert!(chain.contains("nowhere.yaml"));
}
