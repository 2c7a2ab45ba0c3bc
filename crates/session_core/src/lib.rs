//! Per-session optimize/explain/revert state machine.

mod controller;
mod download;
pub mod prompts;
mod state;

pub use controller::{ExplanationView, RevertOutcome, SessionController};
pub use download::{Download, DOWNLOAD_CONTENT_TYPE};
pub use state::{EditOutcome, InputEdit, PendingInput, SessionState};
