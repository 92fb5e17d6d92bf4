//! Generation settings, read from an optional YAML file and completed with
//! defaults derived from the declaration package.

use crate::codegen::go::GoCodeGeneratorOptions;
use crate::codegen::proto::ProtoCodeGeneratorOptions;
use crate::codegen::shared::binding::BindOptions;
use crate::naming::{to_snake, to_upper_camel};
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yml::Error,
  },
}

/// Every setting is optional; unset ones are derived in [`GenConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GenConfig {
  /// Go module path of the generated code.
  pub module: Option<String>,
  pub proto_package: Option<String>,
  /// `go_package` option of the schema.
  pub go_package: Option<String>,
  pub service_name: Option<String>,
  /// Import path of the protobuf generated package used by the service.
  pub pb_import: Option<String>,
  pub validation_import: Option<String>,
  pub user_error_sentinel: Option<String>,
  pub error_return: Option<String>,
}

impl GenConfig {
  pub fn from_yaml(content: &str) -> Result<Self, serde_yml::Error> {
    serde_yml::from_str(content)
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content =
      std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    Self::from_yaml(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  /* Settings present in `overrides` win */
  pub fn merge(self, overrides: GenConfig) -> GenConfig {
    GenConfig {
      module: overrides.module.or(self.module),
      proto_package: overrides.proto_package.or(self.proto_package),
      go_package: overrides.go_package.or(self.go_package),
      service_name: overrides.service_name.or(self.service_name),
      pb_import: overrides.pb_import.or(self.pb_import),
      validation_import: overrides.validation_import.or(self.validation_import),
      user_error_sentinel: overrides.user_error_sentinel.or(self.user_error_sentinel),
      error_return: overrides.error_return.or(self.error_return),
    }
  }

  pub fn resolve(&self, package: &str) -> ResolvedConfig {
    let module = self.module.clone().unwrap_or_else(|| package.to_string());
    let go_package = self.go_package.clone().unwrap_or_else(|| format!("{}/api/{}/v1", module, package));
    let defaults = BindOptions::default();

    ResolvedConfig {
      package: package.to_string(),
      proto_package: self.proto_package.clone().unwrap_or_else(|| format!("{}.v1", to_snake(package))),
      pb_import: self.pb_import.clone().unwrap_or_else(|| go_package.clone()),
      go_package,
      service_name: self.service_name.clone().unwrap_or_else(|| format!("{}Service", to_upper_camel(package))),
      validation_import: self.validation_import.clone().unwrap_or_else(|| format!("{}/internal/validation", module)),
      user_error_sentinel: self.user_error_sentinel.clone().unwrap_or(defaults.user_error_sentinel),
      error_return: self.error_return.clone().unwrap_or(defaults.error_return),
      module,
    }
  }
}

/// Fully populated settings for one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolvedConfig {
  pub package: String,
  pub module: String,
  pub proto_package: String,
  pub go_package: String,
  pub service_name: String,
  pub pb_import: String,
  pub validation_import: String,
  pub user_error_sentinel: String,
  pub error_return: String,
}

impl ResolvedConfig {
  pub fn bind_options(&self) -> BindOptions {
    BindOptions {
      user_error_sentinel: self.user_error_sentinel.clone(),
      validation_import: Some(self.validation_import.clone()),
      error_return: self.error_return.clone(),
      wire_package: "pb".to_string(),
    }
  }

  pub fn proto_options(&self, output_dir: &Path) -> ProtoCodeGeneratorOptions {
    ProtoCodeGeneratorOptions {
      output_dir: output_dir.display().to_string(),
      file_name: format!("{}.proto", to_snake(&self.package)),
      proto_package: self.proto_package.clone(),
      go_package: self.go_package.clone(),
      service_name: self.service_name.clone(),
    }
  }

  pub fn go_options(&self, output_dir: &Path) -> GoCodeGeneratorOptions {
    GoCodeGeneratorOptions {
      output_dir: output_dir.display().to_string(),
      package: self.package.clone(),
      module: self.module.clone(),
      pb_import: self.pb_import.clone(),
      service_name: self.service_name.clone(),
      bind: self.bind_options(),
    }
  }
}
