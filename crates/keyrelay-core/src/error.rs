use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("no {name}.json in any of the config search paths")]
    NotFoundInSearchPaths { name: String },

    #[error("error reading config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid admin id {value:?}: {source}")]
    InvalidAdminId {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("missing required field: {0}")]
    Missing(&'static str),
}
