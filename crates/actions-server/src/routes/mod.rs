pub mod actions;
pub mod drafts;
pub mod events;
