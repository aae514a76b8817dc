use idledig_game::{CatalogError, CatalogLoader, MissionCatalog};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read mission pool {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mission pool {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

/// Catalog source selected on the command line: a JSON file or the bundled pool.
#[derive(Debug, Clone, Default)]
pub struct CliCatalogLoader {
    path: Option<PathBuf>,
}

impl CliCatalogLoader {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn describe(&self) -> String {
        self.path.as_ref().map_or_else(
            || "bundled missions.json".to_string(),
            |path| path.display().to_string(),
        )
    }
}

impl CatalogLoader for CliCatalogLoader {
    type Error = LoadError;

    fn load_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        let Some(path) = &self.path else {
            return Ok(MissionCatalog::load_from_static());
        };
        let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        MissionCatalog::from_json(&json).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })
    }
}
