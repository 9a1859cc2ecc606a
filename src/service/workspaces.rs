//! Workspace resolution, activation and CRUD

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::WorkspaceStore;
use crate::domain::{now_ms, DomainError, DomainResult, Workspace};
use crate::environment::{workspace_token, WORKSPACE_HINT_KEY};
use crate::identity::{allocate_name, make_unique, slugify};
use crate::repository::{Repository, WorkspaceOperations};

/// A workspace serialized for transfer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceExport {
    /// `<id>_<slugified name>`, without extension
    pub file_name: String,
    pub contents: String,
}

impl WorkspaceStore {
    /// Workspace named by the address, else by the persisted hint, else a new one
    pub async fn resolve_current(&self) -> DomainResult<Workspace> {
        let candidate = workspace_token(&self.environment.location_path())
            .or_else(|| self.environment.hint(WORKSPACE_HINT_KEY));

        if let Some(id) = candidate {
            if let Some(workspace) = self.get_workspace(&id).await? {
                return Ok(workspace);
            }
            log::debug!("[workspaces] workspace {} not found", id);
        }

        self.create().await
    }

    /// Make `workspace` current, point the environment at it and boot the application
    pub async fn activate(&mut self, workspace: Workspace) -> DomainResult<Workspace> {
        log::info!("[workspaces] activate {} ({})", workspace.name, workspace.id);

        self.current = Some(workspace.clone());
        self.environment
            .replace_location(&format!("/{}", workspace.id))?;
        self.environment
            .set_hint(WORKSPACE_HINT_KEY, &workspace.id)?;

        self.bootstrap.boot(&workspace).await?;
        Ok(workspace)
    }

    pub async fn get_workspace(&self, id: &str) -> DomainResult<Option<Workspace>> {
        log::debug!("[workspaces] get workspace {}", id);
        self.workspaces.find_by_id(id).await
    }

    /// All workspaces, least recently updated first
    pub async fn list(&self) -> DomainResult<Vec<Workspace>> {
        self.workspaces.list().await
    }

    /// Register a blank workspace
    pub async fn create(&self) -> DomainResult<Workspace> {
        let mut workspace = Workspace::blank(now_ms());
        self.register(&mut workspace).await?;

        log::debug!(
            "[workspaces] create new workspace {} ({})",
            workspace.name,
            workspace.id
        );
        self.read_back(&workspace.id).await
    }

    /// Copy the current workspace into a new one and activate the copy
    pub async fn duplicate(&mut self) -> DomainResult<Workspace> {
        let mut workspace = self
            .current
            .clone()
            .ok_or(DomainError::NoCurrentWorkspace)?;
        workspace.stamp(now_ms());
        self.register(&mut workspace).await?;

        log::debug!(
            "[workspaces] copy current workspace into {} ({})",
            workspace.name,
            workspace.id
        );
        let copy = self.read_back(&workspace.id).await?;
        self.activate(copy).await
    }

    /// Register a workspace coming from outside the store (e.g. an exported file)
    pub async fn import(&self, mut workspace: Workspace) -> DomainResult<Workspace> {
        workspace.stamp(now_ms());
        self.register(&mut workspace).await?;

        log::debug!(
            "[workspaces] import workspace {} ({})",
            workspace.name,
            workspace.id
        );
        self.read_back(&workspace.id).await
    }

    pub async fn import_json(&self, contents: &str) -> DomainResult<Workspace> {
        let workspace: Workspace = serde_json::from_str(contents)
            .map_err(|e| DomainError::InvalidInput(format!("workspace file: {}", e)))?;
        self.import(workspace).await
    }

    /// Rename the current workspace, suffixing the name if another workspace uses it
    pub async fn rename(&mut self, name: &str) -> DomainResult<Workspace> {
        let current_id = match &self.current {
            Some(workspace) => workspace.id.clone(),
            None => return Err(DomainError::NoCurrentWorkspace),
        };

        let others = self.workspaces.identities_except(&current_id).await?;
        let name = allocate_name(name, &others.names);

        if let Some(workspace) = self.current.as_mut() {
            log::debug!("[workspaces] rename workspace {} -> {}", workspace.name, name);
            workspace.name = name;
        }
        self.save().await
    }

    /// Delete a workspace. Deleting the current one also drops the in-memory handle.
    pub async fn remove(&mut self, id: &str) -> DomainResult<()> {
        log::debug!("[workspaces] remove workspace {}", id);
        self.workspaces.delete(id).await?;

        if self.current.as_ref().is_some_and(|current| current.id == id) {
            self.current = None;
        }
        Ok(())
    }

    /// Persist the current workspace as a whole.
    ///
    /// `updatedAt` always moves forward, even when the clock has not.
    pub async fn save(&mut self) -> DomainResult<Workspace> {
        let workspace = self
            .current
            .as_mut()
            .ok_or(DomainError::NoCurrentWorkspace)?;
        workspace.updated_at = now_ms().max(workspace.updated_at + 1);

        let snapshot = workspace.clone();
        self.workspaces.put(&snapshot).await?;
        Ok(snapshot)
    }

    /// The current workspace as a JSON document
    pub fn export(&self) -> DomainResult<WorkspaceExport> {
        let workspace = self
            .current
            .as_ref()
            .ok_or(DomainError::NoCurrentWorkspace)?;

        Ok(WorkspaceExport {
            file_name: format!("{}_{}", workspace.id, slugify(&workspace.name)),
            contents: serde_json::to_string_pretty(workspace)?,
        })
    }

    /// Write the export into `dir` as `<file_name>.json`
    pub fn export_to(&self, dir: &Path) -> DomainResult<PathBuf> {
        let export = self.export()?;
        let path = dir.join(format!("{}.json", export.file_name));

        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, export.contents)?;
        log::info!("[workspaces] exported to {}", path.display());
        Ok(path)
    }

    /// Allocate a free id and name against a fresh snapshot, then insert
    async fn register(&self, workspace: &mut Workspace) -> DomainResult<()> {
        let snapshot = self.workspaces.identities().await?;
        make_unique(workspace, &snapshot)?;
        self.workspaces.create(workspace).await
    }

    async fn read_back(&self, id: &str) -> DomainResult<Workspace> {
        self.get_workspace(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("workspace {}", id)))
    }
}
