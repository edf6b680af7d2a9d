use std::{path::PathBuf, sync::Arc};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Entry document of the SPA bundle; every unknown path resolves to it.
    pub fn index_path(&self) -> PathBuf {
        self.config.static_dir.join("index.html")
    }

    pub fn has_bundle(&self) -> bool {
        self.index_path().is_file()
    }
}
