//! The hardcoded fallback source used when no layer has a snapshot.

use serde::{Deserialize, Serialize};

fn default_key() -> String {
    String::from("bdzy")
}

fn default_name() -> String {
    String::from("bdzy")
}

fn default_description() -> String {
    String::from("default source")
}

fn default_endpoint() -> String {
    String::from("https://api.apibdzy.com/api.php/provide/vod/from/dbm3u8/at/json/")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_key")]
    pub key: String,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_description")]
    pub description: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            name: default_name(),
            description: default_description(),
            endpoint: default_endpoint(),
        }
    }
}
