//! Persisted playground credentials.
//!
//! The store keeps the API key, user id and agent id across restarts. Each
//! field is written back as soon as it changes; nothing is validated here.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::DefaultsConfig;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three values required before any remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub user_id: String,
    pub agent_id: String,
}

impl Credentials {
    /// True when every field is non-empty.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.user_id.is_empty() && !self.agent_id.is_empty()
    }
}

/// A single persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    ApiKey,
    UserId,
    AgentId,
}

/// On-disk document. Key names match what earlier playground builds stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedSettings {
    #[serde(rename = "mem0ApiKey", default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(rename = "agentId", default, skip_serializing_if = "Option::is_none")]
    agent_id: Option<String>,
}

/// Thread-safe, optionally file-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<SettingsStoreInner>,
}

#[derive(Debug)]
struct SettingsStoreInner {
    path: Option<PathBuf>,
    defaults: DefaultsConfig,
    values: RwLock<PersistedSettings>,
}

impl SettingsStore {
    /// Open a store backed by `path`. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>, defaults: DefaultsConfig) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => PersistedSettings::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PersistedSettings::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "Settings store opened");
        Ok(Self::build(Some(path), defaults, values))
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(defaults: DefaultsConfig) -> Self {
        Self::build(None, defaults, PersistedSettings::default())
    }

    fn build(path: Option<PathBuf>, defaults: DefaultsConfig, values: PersistedSettings) -> Self {
        Self {
            inner: Arc::new(SettingsStoreInner {
                path,
                defaults,
                values: RwLock::new(values),
            }),
        }
    }

    /// Current credentials with defaults substituted for absent ids.
    pub fn load(&self) -> Credentials {
        let values = self.inner.values.read().unwrap();
        let defaults = &self.inner.defaults;
        Credentials {
            api_key: values.api_key.clone().unwrap_or_default(),
            user_id: non_empty_or(values.user_id.as_deref(), &defaults.user_id),
            agent_id: non_empty_or(values.agent_id.as_deref(), &defaults.agent_id),
        }
    }

    /// Persist one field immediately.
    ///
    /// The write lock is held until the file is replaced, so concurrent saves
    /// land on disk in the same order they update memory.
    pub fn save(&self, field: SettingsField, value: impl Into<String>) -> Result<(), SettingsError> {
        let mut values = self.inner.values.write().unwrap();
        let slot = match field {
            SettingsField::ApiKey => &mut values.api_key,
            SettingsField::UserId => &mut values.user_id,
            SettingsField::AgentId => &mut values.agent_id,
        };
        *slot = Some(value.into());

        if let Some(path) = &self.inner.path {
            write_replace(path, &serde_json::to_string_pretty(&*values)?)?;
        }
        drop(values);

        debug!(field = ?field, "Setting saved");
        Ok(())
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Write `contents` next to `path`, then rename over it. Readers never see a
/// partially written document.
fn write_replace(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    std::fs::write(&temp_path, contents)?;
    std::fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_stored() {
        let store = SettingsStore::in_memory(DefaultsConfig::default());
        assert_eq!(
            store.load(),
            Credentials {
                api_key: String::new(),
                user_id: "alice".into(),
                agent_id: "haruka".into(),
            }
        );
    }

    #[test]
    fn test_empty_id_falls_back_to_default() {
        let store = SettingsStore::in_memory(DefaultsConfig::default());
        store.save(SettingsField::UserId, "").unwrap();
        store.save(SettingsField::ApiKey, "").unwrap();
        let creds = store.load();
        assert_eq!(creds.user_id, "alice");
        assert_eq!(creds.api_key, "");
        assert!(!creds.is_complete());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let defaults = DefaultsConfig {
            user_id: "bob".into(),
            agent_id: "kai".into(),
        };

        let store = SettingsStore::open(&path, defaults.clone()).unwrap();
        store.save(SettingsField::ApiKey, "secret").unwrap();
        store.save(SettingsField::AgentId, "haruka").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"mem0ApiKey\": \"secret\""));

        let reopened = SettingsStore::open(&path, defaults).unwrap();
        let creds = reopened.load();
        assert_eq!(creds.api_key, "secret");
        assert_eq!(creds.user_id, "bob");
        assert_eq!(creds.agent_id, "haruka");
        assert!(creds.is_complete());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = SettingsStore::open(&path, DefaultsConfig::default());
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_concurrent_saves_keep_file_whole() {
        use std::sync::Barrier;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path, DefaultsConfig::default()).unwrap();

        for round in 0..50 {
            let barrier = Barrier::new(3);
            let writes = [
                (SettingsField::ApiKey, format!("key-{round}")),
                (SettingsField::UserId, format!("user-{round}")),
                (SettingsField::AgentId, format!("agent-{round}")),
            ];
            std::thread::scope(|scope| {
                for (field, value) in &writes {
                    let store = store.clone();
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        store.save(*field, value.clone()).unwrap();
                    });
                }
            });

            let reopened = SettingsStore::open(&path, DefaultsConfig::default()).unwrap();
            let creds = reopened.load();
            assert_eq!(creds.api_key, format!("key-{round}"));
            assert_eq!(creds.user_id, format!("user-{round}"));
            assert_eq!(creds.agent_id, format!("agent-{round}"));
        }
        assert!(!dir.path().join("settings.json.tmp").exists());
    }
}
