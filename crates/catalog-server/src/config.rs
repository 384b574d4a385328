//! Server configuration, read from the environment

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Selects the relational backend when present
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_sheets_file")]
    pub sheets_file: String,
    #[serde(default = "default_categories_file")]
    pub categories_file: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to read environment")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn sheets_path(&self) -> PathBuf {
        self.data_dir.join(&self.sheets_file)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join(&self.categories_file)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_sheets_file() -> String {
    "dados.json".to_string()
}

fn default_categories_file() -> String {
    "categorias.json".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}
