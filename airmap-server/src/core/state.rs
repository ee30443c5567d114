//! State shared by all handlers.

use std::sync::Arc;

use airmap::{AirmapError, Catalog};

use crate::core::config::ServerConfig;

/// Handler state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
}

impl AppState {
    /// Wraps a loaded catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Loads the catalog named by the configuration, or the built-in one.
    pub fn load(config: &ServerConfig) -> Result<Self, AirmapError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                log::info!("Loading catalog from {}", path.display());
                Catalog::from_path(path)?
            }
            None => {
                log::info!("Using built-in catalog");
                Catalog::builtin()?
            }
        };
        log::info!("Datasets: {}", catalog.dataset_names().join(", "));

        Ok(Self::new(catalog))
    }

    /// Catalog answering lookups.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
