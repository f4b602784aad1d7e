//! Orchestrates the custom-action list: load, order, render, dispatch intents.
//!
//! The presenter owns one piece of state, the last collection snapshot the
//! store handed back, held in a `watch` channel so renderers can subscribe.
//! Intents are not queued against each other: whichever completes last
//! determines the rendered snapshot.

use crate::action::{self, Action};
use crate::draft::{Commit, DraftController};
use crate::error::{ActionError, Result};
use crate::store::{ActionStore, FormFields};
use crate::view::{self, View};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

pub const DEFAULT_HEADING: &str = "Custom actions:";

/// A draft session that can be handed to a spawned save intent and still be
/// inspected by its owner afterwards.
pub type SharedDraft = Arc<AsyncMutex<DraftController>>;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Last failure shown alongside the list. A load failure is cleared by the
/// next successful load; an intent failure only by the next successful intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    LoadFailed { error: String },
    IntentFailed { intent: String, error: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed { error } => write!(f, "could not load actions: {error}"),
            Notice::IntentFailed { intent, error } => write!(f, "{intent} failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PresenterState {
    /// Committed collection in presentation order.
    pub actions: Vec<Action>,
    pub notice: Option<Notice>,
}

/// Stable ascending sort by title using plain code-point comparison, so
/// `"Mango" < "Zebra" < "apple"`.
pub fn ordered(mut actions: Vec<Action>) -> Vec<Action> {
    actions.sort_by(|a, b| a.title.cmp(&b.title));
    actions
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

pub enum Intent {
    Add(FormFields),
    Save(SharedDraft),
    Delete(Action),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Add(_) => "add",
            Intent::Save(_) => "save",
            Intent::Delete(_) => "delete",
        }
    }
}

// ---------------------------------------------------------------------------
// ActionListPresenter
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ActionListPresenter {
    store: ActionStore,
    heading: Arc<str>,
    state: Arc<watch::Sender<PresenterState>>,
    activation: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ActionListPresenter {
    pub fn new(store: ActionStore) -> Self {
        let (tx, _) = watch::channel(PresenterState::default());
        Self {
            store,
            heading: Arc::from(DEFAULT_HEADING),
            state: Arc::new(tx),
            activation: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Arc::from(heading.into());
        self
    }

    pub fn store(&self) -> &ActionStore {
        &self.store
    }

    /// Start loading the committed collection in the background. Until it
    /// resolves the snapshot stays empty.
    pub fn activate(&self) {
        let presenter = self.clone();
        let handle = tokio::spawn(async move {
            // Failures are recorded on the state as a notice.
            let _ = presenter.load().await;
        });
        if let Ok(mut slot) = self.activation.lock() {
            if let Some(previous) = slot.replace(handle) {
                previous.abort();
            }
        }
    }

    /// Load the committed collection and replace the snapshot.
    ///
    /// A failed load keeps the current (initially empty) list and records
    /// [`Notice::LoadFailed`] so a renderer can tell "no actions yet" apart
    /// from "store unreachable".
    pub async fn load(&self) -> Result<()> {
        match self.store.list().await {
            Ok(actions) => {
                let actions = ordered(actions);
                self.state.send_modify(|s| {
                    s.actions = actions;
                    if matches!(s.notice, Some(Notice::LoadFailed { .. })) {
                        s.notice = None;
                    }
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load custom actions");
                self.state.send_modify(|s| {
                    s.notice = Some(Notice::LoadFailed {
                        error: e.to_string(),
                    })
                });
                Err(e)
            }
        }
    }

    /// Abort a pending activation. The snapshot is left as is.
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.activation.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    pub fn snapshot(&self) -> PresenterState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresenterState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> View {
        view::render_list(&self.state.borrow(), &self.heading)
    }

    /// Open an edit session for the committed action with `url`.
    pub fn open_draft(&self, url: &str) -> Result<DraftController> {
        let state = self.state.borrow();
        let action = action::find(&state.actions, url)
            .cloned()
            .ok_or_else(|| ActionError::ActionNotFound(url.to_string()))?;
        Ok(DraftController::new(self.store.clone(), action))
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    pub async fn on_add_intent(&self, fields: FormFields) -> Result<Vec<Action>> {
        let result = self.store.add(fields).await;
        self.settle("add", result)
    }

    pub async fn on_save_intent(&self, draft: &mut DraftController) -> Result<Commit> {
        tracing::info!(url = %draft.draft().url, "saving action");
        match draft.commit().await {
            Ok(commit) => {
                self.replace(commit.actions.clone());
                Ok(commit)
            }
            Err(e) => Err(self.record_failure("save", e)),
        }
    }

    pub async fn on_delete_intent(&self, action: &Action) -> Result<Vec<Action>> {
        tracing::debug!(title = %action.title, "deleting custom action");
        let result = self.store.delete(action).await;
        self.settle("delete", result)
    }

    /// Run `intent` in the background. Every spawned intent that completes
    /// updates the snapshot exactly once; failures leave the list untouched.
    pub fn dispatch(&self, intent: Intent) -> JoinHandle<Result<()>> {
        tracing::debug!(intent = intent.name(), "dispatching intent");
        let presenter = self.clone();
        tokio::spawn(async move {
            match intent {
                Intent::Add(fields) => presenter.on_add_intent(fields).await.map(drop),
                Intent::Save(draft) => {
                    let mut draft = draft.lock().await;
                    presenter.on_save_intent(&mut draft).await.map(drop)
                }
                Intent::Delete(action) => presenter.on_delete_intent(&action).await.map(drop),
            }
        })
    }

    fn settle(&self, intent: &str, result: Result<Vec<Action>>) -> Result<Vec<Action>> {
        match result {
            Ok(actions) => {
                self.replace(actions.clone());
                Ok(actions)
            }
            Err(e) => Err(self.record_failure(intent, e)),
        }
    }

    fn replace(&self, actions: Vec<Action>) {
        let actions = ordered(actions);
        self.state.send_modify(|s| {
            s.actions = actions;
            s.notice = None;
        });
    }

    fn record_failure(&self, intent: &str, e: ActionError) -> ActionError {
        tracing::warn!(intent, error = %e, "custom action intent failed; keeping current list");
        self.state.send_modify(|s| {
            s.notice = Some(Notice::IntentFailed {
                intent: intent.to_string(),
                error: e.to_string(),
            })
        });
        e
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::store::fields;

    fn titles(actions: &[Action]) -> Vec<&str> {
        actions.iter().map(|a| a.title.as_str()).collect()
    }

    fn presenter_with(actions: Vec<Action>) -> (Arc<MemoryBackend>, ActionListPresenter) {
        let backend = Arc::new(MemoryBackend::with_actions(actions));
        let presenter = ActionListPresenter::new(ActionStore::new(backend.clone()));
        (backend, presenter)
    }

    #[test]
    fn ordering_is_ordinal_and_stable() {
        let sorted = ordered(vec![
            Action::new("Zebra", "https://z"),
            Action::new("apple", "https://a"),
            Action::new("Mango", "https://m1"),
            Action::new("Mango", "https://m2"),
        ]);
        assert_eq!(titles(&sorted), vec!["Mango", "Mango", "Zebra", "apple"]);
        assert_eq!(sorted[0].url, "https://m1");
        assert_eq!(sorted[1].url, "https://m2");

        // Re-sorting an ordered list keeps equal titles where they were.
        let again = ordered(sorted.clone());
        assert_eq!(again, sorted);
    }

    #[tokio::test]
    async fn snapshot_is_empty_until_load_resolves() {
        let (_, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        assert!(presenter.snapshot().actions.is_empty());

        let mut rx = presenter.subscribe();
        presenter.activate();
        rx.changed().await.unwrap();
        assert_eq!(titles(&rx.borrow().actions), vec!["A"]);
    }

    #[tokio::test]
    async fn load_failure_is_distinguishable_from_empty() {
        let (backend, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        backend.set_offline(true);
        assert!(presenter.load().await.is_err());

        let snap = presenter.snapshot();
        assert!(snap.actions.is_empty());
        assert!(matches!(snap.notice, Some(Notice::LoadFailed { .. })));

        backend.set_offline(false);
        presenter.load().await.unwrap();
        let snap = presenter.snapshot();
        assert_eq!(snap.actions.len(), 1);
        assert!(snap.notice.is_none());
    }

    #[tokio::test]
    async fn add_intent_replaces_snapshot_in_title_order() {
        let (_, presenter) = presenter_with(vec![Action::new("Zebra", "https://z")]);
        presenter.load().await.unwrap();
        presenter
            .on_add_intent(fields([("name", "apple"), ("url", "https://a")]))
            .await
            .unwrap();
        presenter
            .on_add_intent(fields([("name", "Mango"), ("url", "https://m")]))
            .await
            .unwrap();
        assert_eq!(
            titles(&presenter.snapshot().actions),
            vec!["Mango", "Zebra", "apple"]
        );
    }

    #[tokio::test]
    async fn failed_intent_keeps_snapshot() {
        let (backend, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        presenter.load().await.unwrap();
        let before = presenter.snapshot().actions;

        backend.set_offline(true);
        assert!(presenter
            .on_delete_intent(&Action::new("A", "https://a"))
            .await
            .is_err());
        let snap = presenter.snapshot();
        assert_eq!(snap.actions, before);
        assert!(matches!(
            snap.notice,
            Some(Notice::IntentFailed { ref intent, .. }) if intent == "delete"
        ));
    }

    #[tokio::test]
    async fn reload_keeps_intent_failure_notice() {
        let (backend, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        presenter.load().await.unwrap();

        backend.set_offline(true);
        assert!(presenter
            .on_add_intent(fields([("name", "B"), ("url", "https://b")]))
            .await
            .is_err());
        backend.set_offline(false);

        presenter.load().await.unwrap();
        assert!(matches!(
            presenter.snapshot().notice,
            Some(Notice::IntentFailed { ref intent, .. }) if intent == "add"
        ));
        assert!(presenter.view().root.to_text().contains("add failed"));

        presenter
            .on_add_intent(fields([("name", "B"), ("url", "https://b")]))
            .await
            .unwrap();
        assert!(presenter.snapshot().notice.is_none());
    }

    #[tokio::test]
    async fn invalid_add_keeps_snapshot() {
        let (_, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        presenter.load().await.unwrap();
        let err = presenter
            .on_add_intent(fields([("url", "https://nameless")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidAction(_)));
        assert_eq!(titles(&presenter.snapshot().actions), vec!["A"]);
    }

    #[tokio::test]
    async fn save_intent_commits_draft_and_refreshes() {
        let (_, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        presenter.load().await.unwrap();

        let mut draft = presenter.open_draft("https://a").unwrap();
        draft.update_with(|a| a.title = "Renamed".to_string()).unwrap();
        // The list does not see the draft.
        assert_eq!(titles(&presenter.snapshot().actions), vec!["A"]);

        presenter.on_save_intent(&mut draft).await.unwrap();
        assert_eq!(titles(&presenter.snapshot().actions), vec!["Renamed"]);
    }

    #[tokio::test]
    async fn failed_save_retains_draft() {
        let (backend, presenter) = presenter_with(vec![Action::new("A", "https://a")]);
        presenter.load().await.unwrap();
        let draft: SharedDraft = Arc::new(AsyncMutex::new(presenter.open_draft("https://a").unwrap()));
        draft
            .lock()
            .await
            .update_with(|a| a.title = "Unsaved".to_string())
            .unwrap();

        backend.set_offline(true);
        let outcome = presenter.dispatch(Intent::Save(draft.clone())).await.unwrap();
        assert!(outcome.is_err());
        assert_eq!(draft.lock().await.draft().title, "Unsaved");
        assert_eq!(titles(&presenter.snapshot().actions), vec!["A"]);
    }

    #[tokio::test]
    async fn open_draft_for_unknown_url_fails() {
        let (_, presenter) = presenter_with(Vec::new());
        assert!(matches!(
            presenter.open_draft("https://missing"),
            Err(ActionError::ActionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn racing_intents_are_all_applied() {
        let (_, presenter) = presenter_with(Vec::new());
        let mut rx = presenter.subscribe();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                presenter.dispatch(Intent::Add(fields([
                    ("name", format!("Action {i}")),
                    ("url", format!("https://example.com/{i}")),
                ])))
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert!(rx.has_changed().unwrap());

        // Snapshot reflects whichever completed last; the store kept all eight.
        let stored = presenter.store().list().await.unwrap();
        assert_eq!(stored.len(), 8);
        assert!(!presenter.snapshot().actions.is_empty());
    }

    #[tokio::test]
    async fn shutdown_aborts_pending_activation() {
        let (_, presenter) = presenter_with(Vec::new());
        presenter.activate();
        presenter.shutdown();
        assert!(presenter.activation.lock().unwrap().is_none());
    }
}
