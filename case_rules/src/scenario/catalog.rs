//! Scenario catalog - every chapter the game can switch to, keyed by id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::{ScenarioConfig, ScenarioError};

/// Immutable scenario configurations available to briefing transitions.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: HashMap<String, Arc<ScenarioConfig>>,
}

impl ScenarioCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.toml` and `.json` scenario in a directory.
    ///
    /// Files are read in name order; other files are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, ScenarioError> {
        let io_err = |source: std::io::Error| ScenarioError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let supported = matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("toml") | Some("json")
            );
            if supported && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::new();
        for path in paths {
            let config = ScenarioConfig::from_path(&path)?;
            tracing::debug!(scenario = %config.id, path = %path.display(), "loaded scenario");
            catalog.insert(config)?;
        }
        Ok(catalog)
    }

    /// Add a scenario. Ids must be unique.
    pub fn insert(&mut self, config: ScenarioConfig) -> Result<Arc<ScenarioConfig>, ScenarioError> {
        if self.scenarios.contains_key(&config.id) {
            return Err(ScenarioError::DuplicateScenario(config.id));
        }
        let config = Arc::new(config);
        self.scenarios.insert(config.id.clone(), Arc::clone(&config));
        Ok(config)
    }

    /// Get a scenario by id.
    pub fn get(&self, id: &str) -> Option<Arc<ScenarioConfig>> {
        self.scenarios.get(id).cloned()
    }

    /// Get all scenario ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.scenarios.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Get the number of scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
