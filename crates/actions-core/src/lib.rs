//! Custom action management: the collection model, its CRUD protocol over a
//! persistence backend, draft editing with live preview, and the list
//! presenter that ties them together.

pub mod action;
pub mod config;
pub mod draft;
pub mod error;
pub mod io;
pub mod paths;
pub mod presenter;
pub mod storage;
pub mod store;
pub mod view;

pub use action::{Action, ActionKind, Icon};
pub use draft::{Commit, DraftController, DraftState};
pub use error::{ActionError, Result};
pub use presenter::{ActionListPresenter, Intent, Notice, PresenterState, SharedDraft};
pub use store::{ActionStore, FormFields};
