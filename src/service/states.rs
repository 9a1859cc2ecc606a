//! Named states of the current workspace
//!
//! Every write goes through `WorkspaceStore::save`, so the whole workspace
//! is persisted after each change.

use serde::Serialize;
use serde_json::Value;

use super::WorkspaceStore;
use crate::domain::{normalize_state, DomainError, DomainResult, Workspace};

impl WorkspaceStore {
    /// Store a sanitized copy of `state` under `state_id`
    pub async fn set_state<S>(&mut self, state_id: &str, state: &S) -> DomainResult<Workspace>
    where
        S: Serialize + ?Sized,
    {
        let workspace = self
            .current
            .as_mut()
            .ok_or(DomainError::NoCurrentWorkspace)?;
        let state = normalize_state(state)?;

        log::debug!("[workspaces] save state {}", state_id);
        workspace.states.insert(state_id.to_string(), state);

        self.save().await
    }

    /// Stored state, `None` when the workspace has no state by that name
    pub fn get_state(&self, state_id: &str) -> DomainResult<Option<Value>> {
        let workspace = self
            .current
            .as_ref()
            .ok_or(DomainError::NoCurrentWorkspace)?;

        match workspace.states.get(state_id) {
            Some(state) => {
                log::debug!("[workspaces] get state {}", state_id);
                Ok(Some(state.clone()))
            }
            None => {
                log::debug!(
                    "[workspaces] couldn't retrieve workspace's state \"{}\" (unknown state)",
                    state_id
                );
                Ok(None)
            }
        }
    }

    /// Drop the state named `state_id`; unknown names are ignored
    pub async fn remove_state(&mut self, state_id: &str) -> DomainResult<Workspace> {
        let workspace = self
            .current
            .as_mut()
            .ok_or(DomainError::NoCurrentWorkspace)?;

        log::debug!("[workspaces] remove state {}", state_id);
        workspace.states.remove(state_id);

        self.save().await
    }
}
