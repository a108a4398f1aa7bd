//! Persisted UI state and the repository abstraction over its storage.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    error::RepositoryError,
    value_object::{MessageId, UserName},
};

/// Desktop notification permission as last answered by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    /// Not asked yet
    #[default]
    Default,
    Granted,
    Denied,
}

/// Small UI state that survives restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// Messages received while away and not yet read
    pub unread_count: u32,
    /// Last message id included in a read-acknowledgement
    pub last_read_message_id: Option<MessageId>,
    /// Cached user name of this session
    pub username: UserName,
    #[serde(default)]
    pub notification_permission: NotificationPermission,
}

impl UiState {
    /// Fresh state for `username`
    pub fn new(username: UserName) -> Self {
        Self {
            unread_count: 0,
            last_read_message_id: None,
            username,
            notification_permission: NotificationPermission::Default,
        }
    }
}

/// Repository trait for UI state (データアクセス層の抽象化).
///
/// `save` writes every field in one operation so no half-written state is
/// observable by this client.
#[async_trait]
pub trait UiStateRepository: Send + Sync {
    /// Load the last saved state.
    ///
    /// Absent storage yields `UiState::new(default_username)`; absent fields
    /// default to zero unread and no last-read marker.
    async fn load(&self, default_username: &UserName) -> Result<UiState, RepositoryError>;

    /// Persist all fields of `state`
    async fn save(&self, state: &UiState) -> Result<(), RepositoryError>;
}
