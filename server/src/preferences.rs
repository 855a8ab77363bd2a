//! Persisted user preferences: current interface, theme and language.
//!
//! One store per process, created at startup and handed to handlers through
//! `AppState`. Every change is written through to disk.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Interface, Preferences, PreferencesPatch};

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to write preferences to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct PreferenceStore {
    path: PathBuf,
    current: RwLock<Preferences>,
}

impl PreferenceStore {
    /// Loads the stored preferences, falling back to defaults when the file is
    /// missing or unreadable.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable preferences");
                Preferences::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read preferences");
                Preferences::default()
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Preferences {
        self.current.read().await.clone()
    }

    pub async fn current_interface(&self) -> Interface {
        self.current.read().await.current_interface
    }

    pub async fn set_interface(&self, interface: Interface) -> Result<Preferences, PreferencesError> {
        self.update(PreferencesPatch {
            current_interface: Some(interface),
            ..Default::default()
        })
        .await
    }

    /// Applies `patch` and persists the result before releasing the lock, so
    /// the file always reflects the last accepted write.
    pub async fn update(&self, patch: PreferencesPatch) -> Result<Preferences, PreferencesError> {
        let mut guard = self.current.write().await;
        let mut next = guard.clone();
        next.apply(patch);

        let bytes = serde_json::to_vec_pretty(&next)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| PreferencesError::Write {
                path: self.path.clone(),
                source,
            })?;

        *guard = next.clone();
        tracing::debug!(path = %self.path.display(), "Preferences saved");
        Ok(next)
    }
}
