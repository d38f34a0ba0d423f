//! Local snapshot storage location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_sources_file() -> String {
    String::from("sources.json")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the local layer.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the local source snapshot inside `data_dir`.
    #[serde(default = "default_sources_file")]
    pub sources_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sources_file: default_sources_file(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn sources_path(&self) -> PathBuf {
        self.data_dir.join(&self.sources_file)
    }
}
