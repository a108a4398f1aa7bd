//! File UiState Repository 実装
//!
//! UI 状態を 1 つの JSON ドキュメントとして保存します。
//! 保存は一時ファイルへの書き込みとリネームで行うため、途中まで書かれた状態は読まれません。

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    MessageId, NotificationPermission, RepositoryError, UiState, UiStateRepository, UserName,
};

/// Stored document; every field may be missing in older files
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredUiState {
    unread_count: Option<u32>,
    last_read_message_id: Option<MessageId>,
    username: Option<UserName>,
    notification_permission: Option<NotificationPermission>,
}

impl StoredUiState {
    fn into_state(self, default_username: &UserName) -> UiState {
        UiState {
            unread_count: self.unread_count.unwrap_or(0),
            last_read_message_id: self.last_read_message_id,
            username: self.username.unwrap_or_else(|| default_username.clone()),
            notification_permission: self.notification_permission.unwrap_or_default(),
        }
    }
}

/// JSON file backed repository
#[derive(Debug, Clone)]
pub struct FileUiStateRepository {
    path: PathBuf,
}

impl FileUiStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ui-state"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UiStateRepository for FileUiStateRepository {
    async fn load(&self, default_username: &UserName) -> Result<UiState, RepositoryError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No UI state at {}, starting fresh", self.path.display());
                return Ok(UiState::new(default_username.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<StoredUiState>(&contents) {
            Ok(stored) => Ok(stored.into_state(default_username)),
            Err(e) => {
                tracing::warn!("Ignoring malformed UI state at {}: {}", self.path.display(), e);
                Ok(UiState::new(default_username.clone()))
            }
        }
    }

    async fn save(&self, state: &UiState) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(state)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!("Saved UI state to {}", self.path.display());
        Ok(())
    }
}
