use crate::action::{self, Action, ActionKind, Command};
use crate::error::Result;
use crate::storage::{ActionBackend, StorageError, StorageResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Raw form input: ordered `(field, value)` pairs.
pub type FormFields = Vec<(String, String)>;

// ---------------------------------------------------------------------------
// ActionStore
// ---------------------------------------------------------------------------

/// Sole writer of the committed collection.
///
/// Every operation returns the complete post-operation collection; callers
/// replace their whole local view with it instead of patching.
#[derive(Clone)]
pub struct ActionStore {
    backend: Arc<dyn ActionBackend>,
    // Held across read-modify-write so each call sees the previous call's result.
    write_lock: Arc<Mutex<()>>,
}

impl ActionStore {
    pub fn new(backend: Arc<dyn ActionBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Current persisted collection, in storage order.
    pub async fn list(&self) -> Result<Vec<Action>> {
        let backend = Arc::clone(&self.backend);
        let actions = run_blocking(move || backend.read_all()).await?;
        tracing::debug!(count = actions.len(), "loaded custom actions");
        Ok(actions)
    }

    /// Normalize `fields` into a new Action and append it.
    pub async fn add(&self, fields: FormFields) -> Result<Vec<Action>> {
        let action = Action::from_fields(fields);
        action.validate()?;
        self.execute(Command::Add(action)).await
    }

    /// Replace the entry sharing `action.url`, or append it.
    pub async fn upsert(&self, mut action: Action) -> Result<Vec<Action>> {
        action.kind = ActionKind::Action;
        action.fill_defaults();
        action.validate()?;
        self.execute(Command::Upsert(action)).await
    }

    /// Remove the entry matching `action.url`. Missing entries are a no-op.
    pub async fn delete(&self, action: &Action) -> Result<Vec<Action>> {
        self.execute(Command::Delete(action.clone())).await
    }

    async fn execute(&self, cmd: Command) -> Result<Vec<Action>> {
        let _guard = self.write_lock.lock().await;
        let backend = Arc::clone(&self.backend);
        let op = cmd.name();
        let url = match &cmd {
            Command::Add(a) | Command::Upsert(a) | Command::Delete(a) => a.url.clone(),
        };
        let (actions, changed) = run_blocking(move || {
            let prior = backend.read_all()?;
            let (next, changed) = action::apply(prior, cmd);
            if changed {
                backend.write_all(&next)?;
            }
            Ok((next, changed))
        })
        .await?;
        if changed {
            tracing::info!(op, %url, count = actions.len(), "persisted custom actions");
        } else {
            tracing::debug!(op, %url, "no matching action, collection unchanged");
        }
        Ok(actions)
    }
}

async fn run_blocking<T, F>(f: F) -> StorageResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Join(e.to_string()))?
}

/// Convenience for building [`FormFields`] from string literals.
pub fn fields<I, K, V>(pairs: I) -> FormFields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::storage::{MemoryBackend, YamlBackend};

    fn memory_store() -> (Arc<MemoryBackend>, ActionStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = ActionStore::new(backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn add_normalizes_and_appends() {
        let (_, store) = memory_store();
        let actions = store
            .add(fields([
                ("name", "MDN"),
                ("emoji", "✨"),
                ("favIconUrl", "https://x/icon.png"),
                ("url", "https://developer.mozilla.org/"),
            ]))
            .await
            .unwrap();
        assert_eq!(actions.len(), 1);
        let mdn = &actions[0];
        assert_eq!(mdn.title, "MDN");
        assert_eq!(mdn.desc, "MDN");
        assert!(mdn.emoji);
        assert_eq!(mdn.emoji_char.as_deref(), Some("✨"));
        assert_eq!(mdn.kind, ActionKind::Action);
    }

    #[tokio::test]
    async fn add_without_name_is_rejected_and_not_persisted() {
        let (backend, store) = memory_store();
        let err = store
            .add(fields([("url", "https://example.com")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidAction(_)));
        assert_eq!(backend.write_count(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_always_appends_even_with_same_url() {
        let (_, store) = memory_store();
        store.add(fields([("name", "A"), ("url", "https://a")])).await.unwrap();
        let actions = store
            .add(fields([("name", "A2"), ("url", "https://a")]))
            .await
            .unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[tokio::test]
    async fn upsert_distinct_then_replace() {
        let (_, store) = memory_store();
        store.upsert(Action::new("A", "https://a")).await.unwrap();
        let actions = store.upsert(Action::new("B", "https://b")).await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions.iter().filter(|a| a.url == "https://a").count(), 1);
        assert_eq!(actions.iter().filter(|a| a.url == "https://b").count(), 1);

        let actions = store.upsert(Action::new("A2", "https://a")).await.unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].title, "A2");
        assert_eq!(actions[1].title, "B");
    }

    #[tokio::test]
    async fn upsert_then_list_contains_action() {
        let (_, store) = memory_store();
        let action = Action::new("Keys", "https://k").with_keys(["⌘", "K"]);
        store.upsert(action.clone()).await.unwrap();
        assert!(store.list().await.unwrap().contains(&action));
    }

    #[tokio::test]
    async fn upsert_rejects_invalid_action() {
        let (_, store) = memory_store();
        let err = store
            .upsert(Action::new("Bad", "https://bad").with_emoji("toolong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidAction(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (backend, store) = memory_store();
        store.upsert(Action::new("A", "https://a")).await.unwrap();
        let before = store.list().await.unwrap();
        let writes = backend.write_count();

        let after = store.delete(&Action::new("Z", "https://z")).await.unwrap();
        assert_eq!(after, before);
        assert_eq!(backend.write_count(), writes);

        let after = store.delete(&Action::new("A", "https://a")).await.unwrap();
        assert!(after.is_empty());
        let again = store.delete(&Action::new("A", "https://a")).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_storage_error() {
        let (backend, store) = memory_store();
        backend.set_offline(true);
        assert!(matches!(
            store.list().await,
            Err(ActionError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.upsert(Action::new("A", "https://a")).await,
            Err(ActionError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_adds_are_all_kept() {
        let (_, store) = memory_store();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add(fields([
                        ("name", format!("Action {i}")),
                        ("url", format!("https://example.com/{i}")),
                    ]))
                    .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn yaml_backend_persists_across_stores() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ActionStore::new(Arc::new(YamlBackend::new(dir.path())));
        store
            .add(fields([("name", "MDN"), ("url", "https://developer.mozilla.org/")]))
            .await
            .unwrap();

        let reopened = ActionStore::new(Arc::new(YamlBackend::new(dir.path())));
        let actions = reopened.list().await.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "MDN");
    }
}
