use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use wirebind_types::{AliasDef, DeclFile, QueryDef, StructDef};

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yml::Error,
  },

  #[error("import '{import}' not found relative to '{from}' or in include directories")]
  MissingImport { import: String, from: PathBuf },

  #[error("duplicate {kind} '{name}'")]
  Duplicate { kind: &'static str, name: String },
}

/// All declarations reachable from the loaded files, imports first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
  pub package: String,
  pub aliases: Vec<AliasDef>,
  pub structs: Vec<StructDef>,
  pub queries: Vec<QueryDef>,
}

impl Declarations {
  /* Declarations of a single file, imports ignored */
  pub fn from_file(file: DeclFile) -> Result<Self, LoadError> {
    let package = file.package.clone();
    merge(package, std::iter::once(file))
  }

  pub fn from_yaml(content: &str) -> Result<Self, LoadError> {
    let file = DeclFile::from_yaml(content)
      .map_err(|source| LoadError::Parse { path: PathBuf::from("<inline>"), source })?;
    Self::from_file(file)
  }
}

/* Loads declaration files and their imports, each file once */
pub struct DeclLoader {
  loaded_files: HashSet<PathBuf>,
  include_dirs: Vec<PathBuf>,
  files: Vec<DeclFile>,
  package: Option<String>,
}

impl DeclLoader {
  pub fn new(include_dirs: Vec<PathBuf>) -> Self {
    Self { loaded_files: HashSet::new(), include_dirs, files: Vec::new(), package: None }
  }

  /* Try the importing file's directory first, then each include directory */
  fn resolve_import_path(&self, import: &str, base_file: &Path) -> Result<PathBuf, LoadError> {
    let candidates = base_file.parent().map(|parent| parent.join(import)).into_iter();
    let candidates = candidates.chain(self.include_dirs.iter().map(|dir| dir.join(import)));

    for candidate in candidates {
      if candidate.exists() {
        return candidate.canonicalize().map_err(|source| LoadError::Io { path: candidate, source });
      }
    }

    Err(LoadError::MissingImport { import: import.to_string(), from: base_file.to_path_buf() })
  }

  pub fn load_file_with_imports(&mut self, file_path: &Path) -> Result<(), LoadError> {
    let file = self.load_recursive(file_path)?;
    /* The first top-level file names the generated package */
    if self.package.is_none() {
      self.package = file;
    }
    Ok(())
  }

  fn load_recursive(&mut self, file_path: &Path) -> Result<Option<String>, LoadError> {
    let canonical_path =
      file_path.canonicalize().map_err(|source| LoadError::Io { path: file_path.to_path_buf(), source })?;

    if self.loaded_files.contains(&canonical_path) {
      debug!(path = %file_path.display(), "skipping already loaded declaration file");
      return Ok(None);
    }
    /* Mark before recursing so import cycles terminate */
    self.loaded_files.insert(canonical_path);

    let contents = std::fs::read_to_string(file_path)
      .map_err(|source| LoadError::Io { path: file_path.to_path_buf(), source })?;
    let decl_file = DeclFile::from_yaml(&contents)
      .map_err(|source| LoadError::Parse { path: file_path.to_path_buf(), source })?;

    debug!(
      path = %file_path.display(),
      package = %decl_file.package,
      imports = decl_file.imports.len(),
      "loaded declaration file"
    );

    for import in &decl_file.imports {
      let import_path = self.resolve_import_path(import, file_path)?;
      self.load_recursive(&import_path)?;
    }

    let package = decl_file.package.clone();
    self.files.push(decl_file);
    Ok(Some(package))
  }

  pub fn loaded_file_count(&self) -> usize {
    self.loaded_files.len()
  }

  pub fn files(&self) -> &[DeclFile] {
    &self.files
  }

  /* Merge every loaded file, rejecting names declared twice */
  pub fn merge(self) -> Result<Declarations, LoadError> {
    let package = self.package.unwrap_or_default();
    merge(package, self.files)
  }
}

fn merge(package: String, files: impl IntoIterator<Item = DeclFile>) -> Result<Declarations, LoadError> {
  let mut decls = Declarations { package, ..Default::default() };
  let mut aliases = HashSet::new();
  let mut structs = HashSet::new();
  let mut queries = HashSet::new();

  for file in files {
    for alias in file.aliases {
      check_unique(&mut aliases, "alias", &alias.name)?;
      decls.aliases.push(alias);
    }
    for def in file.structs {
      check_unique(&mut structs, "struct", &def.name)?;
      decls.structs.push(def);
    }
    for query in file.queries {
      check_unique(&mut queries, "query", &query.name)?;
      decls.queries.push(query);
    }
  }

  Ok(decls)
}

fn check_unique(seen: &mut HashSet<String>, kind: &'static str, name: &str) -> Result<(), LoadError> {
  if !seen.insert(name.to_string()) {
    return Err(LoadError::Duplicate { kind, name: name.to_string() });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  #[test]
  fn loads_imports_before_importing_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("common.yaml"),
      "package: common\naliases:\n  - name: BookType\n    underlying: string\n",
    )
    .unwrap();
    fs::write(
      dir.path().join("books.yaml"),
      "package: books\nimports: [common.yaml]\nstructs:\n  - name: Book\n    fields:\n      - { name: Title, type: string }\n",
    )
    .unwrap();

    let mut loader = DeclLoader::new(Vec::new());
    loader.load_file_with_imports(&dir.path().join("books.yaml")).unwrap();
    assert_eq!(loader.loaded_file_count(), 2);
    assert_eq!(loader.files()[0].package, "common");

    let decls = loader.merge().unwrap();
    assert_eq!(decls.package, "books");
    assert_eq!(decls.aliases[0].name, "BookType");
    assert_eq!(decls.structs[0].name, "Book");
  }

  #[test]
  fn import_cycles_terminate() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.yaml"), "package: a\nimports: [b.yaml]\n").unwrap();
    fs::write(dir.path().join("b.yaml"), "package: b\nimports: [a.yaml]\n").unwrap();

    let mut loader = DeclLoader::new(Vec::new());
    loader.load_file_with_imports(&dir.path().join("a.yaml")).unwrap();
    assert_eq!(loader.loaded_file_count(), 2);
  }

  #[test]
  fn resolves_imports_from_include_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let shared = tempfile::tempdir().unwrap();
    fs::write(shared.path().join("shared.yaml"), "package: shared\n").unwrap();
    fs::write(dir.path().join("main.yaml"), "package: main\nimports: [shared.yaml]\n").unwrap();

    let mut loader = DeclLoader::new(vec![shared.path().to_path_buf()]);
    loader.load_file_with_imports(&dir.path().join("main.yaml")).unwrap();
    assert_eq!(loader.loaded_file_count(), 2);
  }

  #[test]
  fn missing_import_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.yaml"), "package: main\nimports: [nowhere.yaml]\n").unwrap();

    let mut loader = DeclLoader::new(Vec::new());
    let err = loader.load_file_with_imports(&dir.path().join("main.yaml")).unwrap_err();
    assert!(matches!(err, LoadError::MissingImport { ref import, .. } if import == "nowhere.yaml"));
  }

  #[test]
  fn duplicate_names_are_rejected() {
    let yaml = "package: p\nstructs:\n  - name: Book\n  - name: Book\n";
    let err = Declarations::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, LoadError::Duplicate { kind: "struct", ref name } if name == "Book"));
  }
}
