//! Fixtures

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{catalog::CatalogError, fixtures::catalogs::CatalogFixture};

pub mod catalogs;

pub use catalogs::NamedCatalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Catalog rejected the fixture entries
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loader for YAML fixtures under a base directory
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Fixtures {
    /// Fixtures rooted at `./fixtures`
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Fixtures rooted at a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load `catalogs/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it lists a
    /// price-point twice.
    pub fn load_catalog(&self, name: &str) -> Result<NamedCatalog, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        NamedCatalog::try_from(fixture)
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}
