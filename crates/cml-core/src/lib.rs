//! # CML Core
//!
//! The autocomplete engine behind the CML snippet editor.
//!
//! ## Architecture Overview
//!
//! ```text
//! keystroke ──► Scanner ──► Resolver ──► CodeEditor ──► popup / splice
//!                  ▲           ▲             │
//!                  │           │             ├─► EventBus (TextChanged, IdMapping, …)
//!            SuggestionPools ──┘             │
//!         (attributes + products             ▼
//!          + contextual overlay)      TranslationTable
//!                                  (label ⇄ id at load/save)
//! ```
//!
//! Everything runs on one thread. The only asynchronous step, fetching
//! a contextual pool, happens outside this crate: the editor emits a
//! [`ContextRequest`] and later accepts the answer through
//! [`CodeEditor::apply_context`], which discards answers for a trigger
//! that is no longer current.

pub mod config;
pub mod editor;
pub mod event;
pub mod pools;
pub mod popup;
pub mod resolver;
pub mod suggestion;
pub mod translate;

pub use cml_syntax::{ContextKey, ContextKind, EditorContext, ReferenceCategory};
pub use config::Config;
pub use editor::{Acceptance, CodeEditor, EditorKey, EditorState, KeyOutcome};
pub use event::{EditorEvent, EventBus, EventHandler};
pub use pools::{ContextualPool, SuggestionPools};
pub use popup::{Anchor, PopupRow, PopupState};
pub use resolver::{ContextRequest, Resolution, resolve};
pub use suggestion::{IdMapping, RawSuggestion, SuggestionItem, SuggestionKind};
pub use translate::TranslationTable;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] cml_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
