use crate::error::AppResult;
use clap::ValueEnum;
use config::{Config, Environment as ConfigEnv, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::{default::Default, path::{Path, PathBuf}};

mod file_content;

pub use file_content::FileContent;

pub const DEFAULT_STORE_PATH: &str = "certificates.json";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GlobalConfig {
    pub workers: Option<usize>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl GlobalConfig {
    pub fn load_config(extra: Option<&Path>) -> AppResult<Self> {
        let mut builder = Config::builder()
            .add_source(ConfigFile::with_name("/etc/x509-viewer/config").required(false))
            .add_source(ConfigFile::with_name("config").required(false));
        if let Some(path) = extra {
            builder = builder.add_source(ConfigFile::from(path).required(true));
        }
        let cfg = builder
            .add_source(ConfigEnv::with_prefix("X509V").separator("_"))
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Keep the shelf in memory only.
    #[serde(default)]
    pub ephemeral: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            ephemeral: Default::default(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub mode: ExtractionMode,
}

/// Where the `name` and `cn` display fields come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Subject organizationName and issuer commonName, looked up by OID.
    #[default]
    Attributes,
    /// Second and third subject attributes in encoding order.
    Positional,
}
