//! JSON persistence for the [`ActionRegistry`].
//!
//! The file format is shared with the device's original configurator: a JSON
//! object keyed by command name, each value carrying an `action_type`
//! discriminant plus the payload field matching that discriminant:
//!
//! ```json
//! {
//!   "VOLUMEUP": { "action_type": "key_macro", "keys": [175] },
//!   "KEY0":     { "action_type": "open_process", "process_path": "/bin/foo" }
//! }
//! ```
//!
//! # Validation
//!
//! Historically nothing validated these files, so a `key_macro` without keys
//! slid through and produced a binding that silently did nothing. Here the
//! whole document is validated before any entry is applied: a record whose
//! payload is missing or empty for its declared discriminant fails the load
//! with [`ConfigError::InvalidEntry`], and the caller's registry is left
//! untouched. `action_type = "none"` placeholder records are tolerated on
//! input and skipped; they are never written back out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::action::{Action, ActionRegistry, KeyCode};

/// Error type for config persistence operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON content could not be parsed.
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record's payload does not match its declared `action_type`.
    #[error("invalid config entry {name:?}: {reason}")]
    InvalidEntry { name: String, reason: String },
}

/// The `action_type` discriminant as it appears on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    None,
    KeyMacro,
    OpenProcess,
}

/// One persisted registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub action_type: ActionType,
    /// Key codes, present for `key_macro` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<KeyCode>>,
    /// Program path, present for `open_process` records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_path: Option<String>,
}

impl ConfigRecord {
    /// Converts a persisted record into a domain action.
    ///
    /// Returns `Ok(None)` for `none` placeholder records.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEntry`] when the payload is missing or empty for
    /// the declared discriminant.
    fn into_action(self, name: &str) -> Result<Option<Action>, ConfigError> {
        match self.action_type {
            ActionType::None => Ok(None),
            ActionType::KeyMacro => {
                let keys = self.keys.unwrap_or_default();
                let action = Action::key_macro(keys).map_err(|e| ConfigError::InvalidEntry {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(Some(action))
            }
            ActionType::OpenProcess => {
                let path = self.process_path.unwrap_or_default();
                let action =
                    Action::launch_process(path).map_err(|e| ConfigError::InvalidEntry {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(action))
            }
        }
    }

    /// Builds the persisted record for a domain action.
    fn from_action(action: &Action) -> Self {
        match action {
            Action::KeyMacro(keys) => Self {
                action_type: ActionType::KeyMacro,
                keys: Some(keys.clone()),
                process_path: None,
            },
            Action::LaunchProcess(path) => Self {
                action_type: ActionType::OpenProcess,
                keys: None,
                process_path: Some(path.to_string_lossy().into_owned()),
            },
        }
    }
}

/// Serializes the registry to pretty-printed JSON, one record per command,
/// keys in sorted order.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if serialization fails (it cannot for
/// well-formed records; the arm exists for the `?` chain).
pub fn serialize_registry(registry: &ActionRegistry) -> Result<String, ConfigError> {
    let records: BTreeMap<&str, ConfigRecord> = registry
        .iter()
        .map(|(name, action)| (name, ConfigRecord::from_action(action)))
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Parses and validates a config document into a registry.
///
/// Validation is all-or-nothing: every record is checked before any is
/// applied, so a malformed document never yields a half-built registry.
///
/// # Errors
///
/// [`ConfigError::Parse`] for malformed JSON, [`ConfigError::InvalidEntry`]
/// for a record whose payload does not match its discriminant.
pub fn deserialize_registry(content: &str) -> Result<ActionRegistry, ConfigError> {
    let records: BTreeMap<String, ConfigRecord> = serde_json::from_str(content)?;

    let mut registry = ActionRegistry::new();
    for (name, record) in records {
        match record.into_action(&name)? {
            Some(action) => registry.insert(name, action),
            None => debug!(command = %name, "skipping 'none' placeholder config entry"),
        }
    }
    Ok(registry)
}

/// Loads a registry from the config file at `path`.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system failures, plus everything
/// [`deserialize_registry`] reports.
pub fn load_registry(path: impl AsRef<Path>) -> Result<ActionRegistry, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_registry(&content)
}

/// Persists `registry` to the config file at `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// [`ConfigError::Io`] for file-system failures.
pub fn save_registry(path: impl AsRef<Path>, registry: &ActionRegistry) -> Result<(), ConfigError> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }

    let content = serialize_registry(registry)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
