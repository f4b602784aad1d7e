//! Edit sessions over a single committed Action.
//!
//! A [`DraftController`] keeps the in-progress value in a `watch` channel so
//! any number of preview consumers see every update as a full value. Nothing
//! reaches the store until [`DraftController::commit`].

use crate::action::{self, Action};
use crate::error::{ActionError, Result};
use crate::store::ActionStore;
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Editing,
    Committed,
    Discarded,
}

impl DraftState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DraftState::Editing)
    }
}

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftState::Editing => "editing",
            DraftState::Committed => "committed",
            DraftState::Discarded => "discarded",
        };
        f.write_str(s)
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The action as stored.
    pub action: Action,
    /// The store's full collection after the upsert.
    pub actions: Vec<Action>,
}

// ---------------------------------------------------------------------------
// DraftController
// ---------------------------------------------------------------------------

pub struct DraftController {
    store: ActionStore,
    baseline: Action,
    state: DraftState,
    preview: watch::Sender<Action>,
}

impl DraftController {
    /// Start an edit session; the draft begins as a copy of `action`.
    pub fn new(store: ActionStore, action: Action) -> Self {
        let (preview, _) = watch::channel(action.clone());
        Self {
            store,
            baseline: action,
            state: DraftState::Editing,
            preview,
        }
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    /// The last committed value this session knows about.
    pub fn baseline(&self) -> &Action {
        &self.baseline
    }

    pub fn draft(&self) -> Action {
        self.preview.borrow().clone()
    }

    pub fn is_dirty(&self) -> bool {
        *self.preview.borrow() != self.baseline
    }

    /// Receive every draft value published from now on.
    pub fn subscribe(&self) -> watch::Receiver<Action> {
        self.preview.subscribe()
    }

    /// Replace the draft wholesale with `next`.
    pub fn update(&mut self, next: Action) -> Result<Action> {
        self.ensure_editing()?;
        tracing::debug!(url = %next.url, title = %next.title, "draft updated");
        self.preview.send_replace(next.clone());
        Ok(next)
    }

    /// Build the next draft from the current one and publish it.
    pub fn update_with(&mut self, f: impl FnOnce(&mut Action)) -> Result<Action> {
        let mut next = self.draft();
        f(&mut next);
        self.update(next)
    }

    /// Upsert the draft. On failure the session stays open with the draft
    /// untouched so the caller can retry or keep editing.
    pub async fn commit(&mut self) -> Result<Commit> {
        self.ensure_editing()?;
        let draft = self.draft();
        match self.store.upsert(draft.clone()).await {
            Ok(actions) => {
                let stored = action::find(&actions, &draft.url)
                    .cloned()
                    .unwrap_or(draft);
                self.baseline = stored.clone();
                self.preview.send_replace(stored.clone());
                self.state = DraftState::Committed;
                tracing::info!(url = %stored.url, "draft committed");
                Ok(Commit {
                    action: stored,
                    actions,
                })
            }
            Err(e) => {
                tracing::warn!(url = %draft.url, error = %e, "draft commit failed; draft retained");
                Err(e)
            }
        }
    }

    /// End the session without saving. The preview falls back to the baseline.
    pub fn discard(&mut self) -> Result<()> {
        self.ensure_editing()?;
        self.preview.send_replace(self.baseline.clone());
        self.state = DraftState::Discarded;
        tracing::debug!(url = %self.baseline.url, "draft discarded");
        Ok(())
    }

    fn ensure_editing(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(ActionError::DraftClosed(self.state));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
