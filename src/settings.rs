//! Engine settings
//!
//! Persisted as JSON next to the scene files. Every field has a default, so a
//! partial file only overrides what it names.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{ConnectionMap, Gating, TraceLimits, Viewport};

/// Errors while reading or writing a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trace settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Canvas size, sets how far unobstructed rays are drawn
    pub viewport: Viewport,

    // === Termination ===
    /// Deepest recursion level still traced
    pub max_depth: u32,
    /// Branches below this intensity are dropped
    pub min_intensity: f64,

    // === Circuit mode ===
    /// Only let light out of ports marked connected
    pub gating_enabled: bool,
    /// `"{id}-{port}" -> connected`
    pub connections: ConnectionMap,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = TraceLimits::default();
        Self {
            viewport: Viewport::default(),

            max_depth: limits.max_depth,
            min_intensity: limits.min_intensity,

            gating_enabled: false,
            connections: HashMap::new(),
        }
    }
}

impl Settings {
    pub fn limits(&self) -> TraceLimits {
        TraceLimits {
            max_depth: self.max_depth,
            min_intensity: self.min_intensity,
        }
    }

    /// Gating as the tracer sees it (connections are ignored when disabled)
    pub fn gating(&self) -> Gating {
        if self.gating_enabled {
            Gating::Enabled(self.connections.clone())
        } else {
            Gating::Disabled
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
