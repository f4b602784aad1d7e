use actions_core::config::Config;
use actions_core::{ActionListPresenter, DraftController, SharedDraft};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Sessions untouched for this long are dropped on the next registry access.
pub const DRAFT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Opening a session past this many evicts the least recently used one.
pub const MAX_OPEN_DRAFTS: usize = 64;

// ---------------------------------------------------------------------------
// DraftRegistry
// ---------------------------------------------------------------------------

struct Session {
    draft: SharedDraft,
    last_access: Instant,
}

/// Open edit sessions, keyed by the id handed to the client.
///
/// Bounded two ways: idle sessions expire after `idle_ttl`, and the registry
/// never holds more than `capacity` sessions. Dropping a session drops its
/// preview sender, which ends any preview stream still attached to it.
#[derive(Clone)]
pub struct DraftRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl Default for DraftRegistry {
    fn default() -> Self {
        Self::new(MAX_OPEN_DRAFTS, DRAFT_IDLE_TTL)
    }
}

impl DraftRegistry {
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
            idle_ttl,
        }
    }

    /// Register a new session and return its id.
    pub async fn open(&self, draft: DraftController) -> (Uuid, SharedDraft) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);
        while sessions.len() >= self.capacity {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_access)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            tracing::debug!(id = %oldest, "draft session evicted, registry full");
        }

        let id = Uuid::new_v4();
        let draft: SharedDraft = Arc::new(Mutex::new(draft));
        sessions.insert(
            id,
            Session {
                draft: draft.clone(),
                last_access: now,
            },
        );
        (id, draft)
    }

    /// Look up a live session and mark it as used.
    pub async fn get(&self, id: Uuid) -> Option<SharedDraft> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions, now);
        let session = sessions.get_mut(&id)?;
        session.last_access = now;
        Some(session.draft.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Option<SharedDraft> {
        self.sessions.lock().await.remove(&id).map(|s| s.draft)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let ttl = self.idle_ttl;
        sessions.retain(|id, s| {
            let live = now.duration_since(s.last_access) < ttl;
            if !live {
                tracing::debug!(%id, "draft session expired");
            }
            live
        });
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub presenter: ActionListPresenter,
    pub drafts: DraftRegistry,
}

impl AppState {
    /// Build state from the project's `.actions/config.yaml`.
    pub fn load(root: PathBuf) -> actions_core::Result<Self> {
        let config = Config::load(&root)?;
        let store = config.open_store(&root)?;
        let presenter = ActionListPresenter::new(store).with_heading(config.view.heading);
        Ok(Self::with_presenter(root, presenter))
    }

    /// Wrap an already constructed presenter.
    ///
    /// Activation only happens inside a Tokio runtime (skipped in sync unit tests).
    pub fn with_presenter(root: PathBuf, presenter: ActionListPresenter) -> Self {
        if tokio::runtime::Handle::try_current().is_ok() {
            presenter.activate();
        }
        Self {
            root,
            presenter,
            drafts: DraftRegistry::default(),
        }
    }

    pub fn with_drafts(mut self, drafts: DraftRegistry) -> Self {
        self.drafts = drafts;
        self
    }

    pub async fn draft(&self, id: Uuid) -> Option<SharedDraft> {
        self.drafts.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_core::storage::MemoryBackend;
    use actions_core::{Action, ActionStore};

    fn controller(url: &str) -> DraftController {
        let store = ActionStore::new(Arc::new(MemoryBackend::new()));
        DraftController::new(store, Action::new("A", url))
    }

    #[test]
    fn with_presenter_stores_root() {
        let presenter = ActionListPresenter::new(ActionStore::new(Arc::new(MemoryBackend::new())));
        let state = AppState::with_presenter(PathBuf::from("/tmp/test"), presenter);
        assert_eq!(state.root, PathBuf::from("/tmp/test"));
    }

    #[test]
    fn load_requires_init() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(AppState::load(dir.path().to_path_buf()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_expire() {
        let registry = DraftRegistry::new(8, Duration::from_secs(60));
        let (stale, _) = registry.open(controller("https://a")).await;
        tokio::time::advance(Duration::from_secs(30)).await;
        let (fresh, _) = registry.open(controller("https://b")).await;
        tokio::time::advance(Duration::from_secs(45)).await;

        assert!(registry.get(stale).await.is_none());
        assert!(registry.get(fresh).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn access_keeps_session_alive() {
        let registry = DraftRegistry::new(8, Duration::from_secs(60));
        let (id, _) = registry.open(controller("https://a")).await;
        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(40)).await;
            assert!(registry.get(id).await.is_some());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_registry_evicts_least_recently_used() {
        let registry = DraftRegistry::new(2, DRAFT_IDLE_TTL);
        let (a, _) = registry.open(controller("https://a")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        let (b, _) = registry.open(controller("https://b")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(registry.get(a).await.is_some());
        tokio::time::advance(Duration::from_secs(1)).await;
        let (c, _) = registry.open(controller("https://c")).await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.get(b).await.is_none());
        assert!(registry.get(a).await.is_some());
        assert!(registry.get(c).await.is_some());
    }

    #[tokio::test]
    async fn evicted_session_ends_preview_stream() {
        let registry = DraftRegistry::new(1, DRAFT_IDLE_TTL);
        let (_, draft) = registry.open(controller("https://a")).await;
        let mut rx = draft.lock().await.subscribe();
        drop(draft);

        registry.open(controller("https://b")).await;
        assert!(rx.changed().await.is_err());
    }
}
