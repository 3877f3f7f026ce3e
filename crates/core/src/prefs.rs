use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display preferences that outlive a session. Kept separate from workflow
/// state on purpose: losing or resetting this file must never affect an
/// in-progress analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPrefs {
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to write display preferences to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode display preferences")]
    Encode(#[from] serde_json::Error),
}

pub trait PreferenceStore {
    /// Load preferences; a missing or unreadable store yields the defaults.
    fn load(&self) -> DisplayPrefs;

    fn save(&self, prefs: &DisplayPrefs) -> Result<(), PrefsError>;
}

/// Preferences persisted as pretty JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> DisplayPrefs {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return DisplayPrefs::default();
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "display preferences unreadable; using defaults"
                );
                DisplayPrefs::default()
            }
        }
    }

    fn save(&self, prefs: &DisplayPrefs) -> Result<(), PrefsError> {
        let raw = serde_json::to_string_pretty(prefs)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|source| PrefsError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        std::fs::write(&self.path, raw).map_err(|source| PrefsError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
