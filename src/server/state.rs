//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::repository::{AssetStore, FsAssetStore, LayoutRepository, MemoryLayoutStore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// JSON file holding the stored layouts
    pub data_file: PathBuf,
    /// Directory uploaded logos are written to and served from
    pub asset_dir: PathBuf,
    /// Public URL prefix of `asset_dir` (e.g., "http://localhost:8080/assets")
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            data_file: PathBuf::from("data/layouts.json"),
            asset_dir: PathBuf::from("data/assets"),
            public_base_url: "http://127.0.0.1:8080/assets".to_string(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub repo: Arc<dyn LayoutRepository>,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    /// State backed by the configured data file and asset directory.
    pub async fn open(config: ServerConfig) -> Result<Self> {
        let repo = MemoryLayoutStore::open(&config.data_file).await?;
        let assets = FsAssetStore::new(&config.asset_dir, &config.public_base_url);
        Ok(Self::with_stores(config, Arc::new(repo), Arc::new(assets)))
    }

    pub fn with_stores(
        config: ServerConfig,
        repo: Arc<dyn LayoutRepository>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            config,
            repo,
            assets,
        }
    }
}
