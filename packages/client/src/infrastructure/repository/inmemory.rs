//! InMemory UiState Repository 実装
//!
//! プロセス内だけで状態を保持する実装。主にテスト用。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, UiState, UiStateRepository, UserName};

/// インメモリ UiState Repository 実装
#[derive(Debug, Clone, Default)]
pub struct InMemoryUiStateRepository {
    state: Arc<Mutex<Option<UiState>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryUiStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that already holds `state`
    pub fn with_state(state: UiState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(state))),
            saves: Arc::default(),
        }
    }

    /// Number of completed saves
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl UiStateRepository for InMemoryUiStateRepository {
    async fn load(&self, default_username: &UserName) -> Result<UiState, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .clone()
            .unwrap_or_else(|| UiState::new(default_username.clone())))
    }

    async fn save(&self, state: &UiState) -> Result<(), RepositoryError> {
        *self.state.lock().await = Some(state.clone());
        *self.saves.lock().await += 1;
        Ok(())
    }
}
