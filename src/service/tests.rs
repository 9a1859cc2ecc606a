//! Workspace Store Tests

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::config::StoreConfig;
    use crate::domain::{DomainError, DomainResult, GifsStorage, ProductsStorage, Workspace};
    use crate::environment::{
        Bootstrap, Environment, MemoryEnvironment, NoopBootstrap, WORKSPACE_HINT_KEY,
    };
    use crate::identity::is_workspace_id;
    use crate::repository::{default_series, init_db};
    use crate::service::WorkspaceStore;

    /// Bootstrap remembering which workspaces were booted
    #[derive(Default)]
    struct RecordingBootstrap {
        booted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Bootstrap for RecordingBootstrap {
        async fn boot(&self, workspace: &Workspace) -> DomainResult<()> {
            self.booted.lock().unwrap().push(workspace.id.clone());
            Ok(())
        }
    }

    /// Environment whose hints cannot be removed
    struct StickyHints(MemoryEnvironment);

    impl Environment for StickyHints {
        fn location_path(&self) -> String {
            self.0.location_path()
        }

        fn replace_location(&self, path: &str) -> DomainResult<()> {
            self.0.replace_location(path)
        }

        fn hint(&self, key: &str) -> Option<String> {
            self.0.hint(key)
        }

        fn set_hint(&self, key: &str, value: &str) -> DomainResult<()> {
            self.0.set_hint(key, value)
        }

        fn remove_hint(&self, _key: &str) -> DomainResult<()> {
            Err(DomainError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only hints",
            )))
        }
    }

    async fn setup_store(env: Arc<MemoryEnvironment>) -> WorkspaceStore {
        WorkspaceStore::open(&StoreConfig::in_memory(), env, Arc::new(NoopBootstrap))
            .await
            .expect("Failed to open store")
    }

    async fn active_store() -> (WorkspaceStore, Arc<MemoryEnvironment>) {
        let env = Arc::new(MemoryEnvironment::new("/"));
        let mut store = setup_store(env.clone()).await;
        let workspace = store.resolve_current().await.unwrap();
        store.activate(workspace).await.unwrap();
        (store, env)
    }

    fn assert_unique(workspaces: &[Workspace]) {
        let ids: HashSet<_> = workspaces.iter().map(|w| w.id.as_str()).collect();
        let names: HashSet<_> = workspaces.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(ids.len(), workspaces.len(), "duplicate ids in {workspaces:?}");
        assert_eq!(names.len(), workspaces.len(), "duplicate names in {workspaces:?}");
    }

    #[tokio::test]
    async fn test_open_seeds_default_series() {
        let store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        let series = store.list_series().await.unwrap();
        assert_eq!(series.len(), default_series().unwrap().len());
        assert!(series.iter().all(|s| s.created_at == s.updated_at));
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        let created = store.create().await.unwrap();
        let fetched = store.get_workspace(&created.id).await.unwrap().unwrap();

        assert!(is_workspace_id(&fetched.id));
        assert_eq!(fetched.name, "Untitled");
        assert!(fetched.states.is_empty());
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_creations_stay_unique() {
        let store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        for _ in 0..5 {
            store.create().await.unwrap();
        }

        let workspaces = store.list().await.unwrap();
        assert_eq!(workspaces.len(), 5);
        assert_unique(&workspaces);
        assert!(workspaces.iter().any(|w| w.name == "Untitled 5"));
    }

    #[tokio::test]
    async fn test_resolve_prefers_path_token() {
        let env = Arc::new(MemoryEnvironment::new("/"));
        let store = setup_store(env.clone()).await;
        let first = store.create().await.unwrap();
        let second = store.create().await.unwrap();

        env.replace_location(&format!("/{}", first.id)).unwrap();
        env.set_hint(WORKSPACE_HINT_KEY, &second.id).unwrap();

        let resolved = store.resolve_current().await.unwrap();
        assert_eq!(resolved.id, first.id);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_hint() {
        let env = Arc::new(MemoryEnvironment::new("/settings"));
        let store = setup_store(env.clone()).await;
        let hinted = store.create().await.unwrap();
        env.set_hint(WORKSPACE_HINT_KEY, &hinted.id).unwrap();

        let resolved = store.resolve_current().await.unwrap();
        assert_eq!(resolved.id, hinted.id);
    }

    #[tokio::test]
    async fn test_resolve_creates_when_nothing_matches() {
        let env = Arc::new(MemoryEnvironment::new("/zz99").with_hint(WORKSPACE_HINT_KEY, "yy88"));
        let store = setup_store(env).await;

        let resolved = store.resolve_current().await.unwrap();
        assert_ne!(resolved.id, "zz99");
        assert_ne!(resolved.id, "yy88");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_activate_updates_environment_and_boots() {
        let env = Arc::new(MemoryEnvironment::new("/"));
        let bootstrap = Arc::new(RecordingBootstrap::default());
        let mut store =
            WorkspaceStore::open(&StoreConfig::in_memory(), env.clone(), bootstrap.clone())
                .await
                .unwrap();

        let workspace = store.resolve_current().await.unwrap();
        store.activate(workspace.clone()).await.unwrap();

        assert_eq!(env.location_path(), format!("/{}", workspace.id));
        assert_eq!(env.hint(WORKSPACE_HINT_KEY), Some(workspace.id.clone()));
        assert_eq!(store.current().map(|w| w.id.as_str()), Some(workspace.id.as_str()));
        assert_eq!(*bootstrap.booted.lock().unwrap(), vec![workspace.id]);
    }

    #[tokio::test]
    async fn test_state_operations_require_current_workspace() {
        let mut store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        assert!(matches!(
            store.set_state("chart", &json!({})).await,
            Err(DomainError::NoCurrentWorkspace)
        ));
        assert!(matches!(store.get_state("chart"), Err(DomainError::NoCurrentWorkspace)));
        assert!(matches!(
            store.remove_state("chart").await,
            Err(DomainError::NoCurrentWorkspace)
        ));
        assert!(matches!(store.save().await, Err(DomainError::NoCurrentWorkspace)));
        assert!(matches!(store.export(), Err(DomainError::NoCurrentWorkspace)));
    }

    #[tokio::test]
    async fn test_set_state_strips_private_fields() {
        let (mut store, _env) = active_store().await;

        store
            .set_state("chart1", &json!({"a": 1, "_tmp": 2, "_id": 9}))
            .await
            .unwrap();

        assert_eq!(store.get_state("chart1").unwrap(), Some(json!({"a": 1, "_id": 9})));

        let id = store.current().unwrap().id.clone();
        let persisted = store.get_workspace(&id).await.unwrap().unwrap();
        assert_eq!(persisted.states["chart1"], json!({"a": 1, "_id": 9}));
    }

    #[tokio::test]
    async fn test_get_unknown_state_is_none() {
        let (store, _env) = active_store().await;
        assert_eq!(store.get_state("missing").unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_state() {
        let (mut store, _env) = active_store().await;

        store.remove_state("never-set").await.expect("removing unknown state is a no-op");

        store.set_state("chart", &json!({"zoom": 2})).await.unwrap();
        store.remove_state("chart").await.unwrap();

        assert_eq!(store.get_state("chart").unwrap(), None);
        let id = store.current().unwrap().id.clone();
        let persisted = store.get_workspace(&id).await.unwrap().unwrap();
        assert!(persisted.states.is_empty());
    }

    #[tokio::test]
    async fn test_save_strictly_increases_updated_at() {
        let (mut store, _env) = active_store().await;

        let mut previous = store.current().unwrap().updated_at;
        for _ in 0..5 {
            let saved = store.save().await.unwrap();
            assert!(saved.updated_at > previous);
            previous = saved.updated_at;
        }
    }

    #[tokio::test]
    async fn test_save_writes_snapshot() {
        let (mut store, _env) = active_store().await;

        let saved = store.set_state("chart", &json!({"zoom": 1})).await.unwrap();

        // in-memory edits after a save do not leak into the stored record
        store.current.as_mut().unwrap().name = "Unsaved".into();
        let persisted = store.get_workspace(&saved.id).await.unwrap().unwrap();
        assert_eq!(persisted, saved);
        assert_ne!(persisted.name, "Unsaved");
    }

    #[tokio::test]
    async fn test_duplicate_copies_states_under_new_identity() {
        let (mut store, env) = active_store().await;
        store.set_state("chart", &json!({"zoom": 3})).await.unwrap();
        let source = store.current().unwrap().clone();

        let copy = store.duplicate().await.unwrap();

        assert_ne!(copy.id, source.id);
        assert_ne!(copy.name, source.name);
        assert_eq!(copy.states, source.states);
        assert_eq!(store.current().unwrap().id, copy.id);
        assert_eq!(env.hint(WORKSPACE_HINT_KEY), Some(copy.id.clone()));
        assert_unique(&store.list().await.unwrap());
    }

    #[tokio::test]
    async fn test_import_never_trusts_incoming_identity() {
        let (store, _env) = active_store().await;
        let existing = store.current().unwrap().clone();

        let mut incoming = existing.clone();
        incoming.states.insert("chart".into(), json!({"zoom": 4}));
        let imported = store.import(incoming).await.unwrap();

        assert_ne!(imported.id, existing.id);
        assert_eq!(imported.name, format!("{} 2", existing.name));
        assert_eq!(imported.states["chart"], json!({"zoom": 4}));
        assert_unique(&store.list().await.unwrap());
    }

    #[tokio::test]
    async fn test_import_json_keeps_free_identity() {
        let (store, _env) = active_store().await;

        let imported = store
            .import_json(r#"{"id": "Ab12", "name": "Scalping", "createdAt": 1, "updatedAt": 1, "states": {}}"#)
            .await
            .unwrap();

        assert_eq!(imported.name, "Scalping");
        assert!(imported.created_at > 1);
        assert_eq!(imported.created_at, imported.updated_at);
        // "Ab12" is kept unless the random first workspace happened to take it
        assert!(is_workspace_id(&imported.id));
    }

    #[tokio::test]
    async fn test_import_json_rejects_garbage() {
        let (store, _env) = active_store().await;
        assert!(matches!(
            store.import_json("not json").await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_keeps_names_unique() {
        let (mut store, _env) = active_store().await;
        let other = store.create().await.unwrap();

        let renamed = store.rename(&other.name).await.unwrap();
        assert_eq!(renamed.name, format!("{} 2", other.name));

        let renamed = store.rename("Scalping").await.unwrap();
        assert_eq!(renamed.name, "Scalping");

        // renaming to its own name is not a collision
        let renamed = store.rename("Scalping").await.unwrap();
        assert_eq!(renamed.name, "Scalping");
        assert_unique(&store.list().await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_current_clears_handle() {
        let (mut store, _env) = active_store().await;
        let id = store.current().unwrap().id.clone();

        store.remove(&id).await.unwrap();

        assert!(store.current().is_none());
        assert!(store.get_workspace(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at() {
        let (mut store, _env) = active_store().await;
        let other = store.create().await.unwrap();
        let active_id = store.current().unwrap().id.clone();

        std::thread::sleep(std::time::Duration::from_millis(2));
        store.save().await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![other.id, active_id]);
    }

    #[tokio::test]
    async fn test_export_names_file_by_id_and_slug() {
        let (mut store, _env) = active_store().await;
        store.rename("My Layout").await.unwrap();
        store.set_state("chart", &json!({"zoom": 1})).await.unwrap();

        let export = store.export().unwrap();
        let current = store.current().unwrap();
        assert_eq!(export.file_name, format!("{}_my-layout", current.id));

        let document: Workspace = serde_json::from_str(&export.contents).unwrap();
        assert_eq!(&document, current);

        let dir = tempfile::tempdir().unwrap();
        let path = store.export_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(format!("{}.json", export.file_name)));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_caches_passthrough() {
        let store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        let products = ProductsStorage {
            exchange: "BITMEX".into(),
            timestamp: 5,
            data: json!({"XBTUSD": {}}),
        };
        store.save_products(&products).await.unwrap();
        assert_eq!(store.get_products("BITMEX").await.unwrap(), Some(products));
        store.delete_products("BITMEX").await.unwrap();
        assert_eq!(store.get_products("BITMEX").await.unwrap(), None);

        let gifs = GifsStorage {
            slug: "pump".into(),
            timestamp: 5,
            data: json!([]),
        };
        store.save_gifs(&gifs).await.unwrap();
        assert_eq!(store.get_gifs("pump").await.unwrap(), Some(gifs));
        store.delete_gifs("pump").await.unwrap();
        assert_eq!(store.get_gifs("pump").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_series_passthrough() {
        let store = setup_store(Arc::new(MemoryEnvironment::new("/"))).await;

        let mut price = store.get_serie("price").await.unwrap().unwrap();
        let seeded_at = price.created_at;
        price.settings.insert("color".into(), json!("#fff"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.save_serie(&mut price).await.unwrap();

        let stored = store.get_serie("price").await.unwrap().unwrap();
        assert_eq!(stored.created_at, seeded_at);
        assert!(stored.updated_at > seeded_at);
        assert_eq!(stored.settings["color"], json!("#fff"));

        // the most recently saved serie lists last
        let series = store.list_series().await.unwrap();
        assert_eq!(series.last().map(|s| s.id.as_str()), Some("price"));

        store.delete_serie("price").await.unwrap();
        assert!(store.get_serie("price").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_does_not_resurrect_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::at(dir.path());
        let env = Arc::new(MemoryEnvironment::new("/"));

        let mut store = WorkspaceStore::open(&config, env.clone(), Arc::new(NoopBootstrap))
            .await
            .unwrap();
        let workspace = store.resolve_current().await.unwrap();
        let old_id = workspace.id.clone();
        store.activate(workspace).await.unwrap();

        store.reset().await.unwrap();

        assert!(store.current().is_none());
        assert_eq!(env.hint(WORKSPACE_HINT_KEY), None);
        assert!(!config.db_path().unwrap().exists());
        assert!(matches!(store.list().await, Err(DomainError::NotInitialized)));

        // the address still names the old id, but nothing answers to it
        assert_eq!(env.location_path(), format!("/{}", old_id));
        let store = WorkspaceStore::open(&config, env, Arc::new(NoopBootstrap))
            .await
            .unwrap();
        let fresh = store.resolve_current().await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(fresh.states.is_empty());
        assert_eq!(fresh.name, "Untitled");
    }

    #[tokio::test]
    async fn test_failed_reset_still_drops_current_workspace() {
        let env = Arc::new(StickyHints(MemoryEnvironment::new("/")));
        let mut store =
            WorkspaceStore::open(&StoreConfig::in_memory(), env, Arc::new(NoopBootstrap))
                .await
                .unwrap();
        let workspace = store.resolve_current().await.unwrap();
        store.activate(workspace).await.unwrap();

        assert!(matches!(store.reset().await, Err(DomainError::Io(_))));
        assert!(store.current().is_none());
        assert!(!store.db().is_open().await);
        assert!(matches!(store.save().await, Err(DomainError::NoCurrentWorkspace)));
    }

    #[tokio::test]
    async fn test_with_db_shares_initialized_database() {
        let db = init_db(None, &[]).await.unwrap();
        let store = WorkspaceStore::with_db(
            db,
            Arc::new(MemoryEnvironment::new("/")),
            Arc::new(NoopBootstrap),
        );

        assert!(store.list_series().await.unwrap().is_empty());
        assert!(store.db().is_open().await);
    }
}
