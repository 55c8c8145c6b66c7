//! # CML Services
//!
//! Everything the autocomplete engine talks to that it does not own:
//! suggestion providers, snippet persistence, user notifications and the
//! CML generation action, plus the [`Studio`] that wires them to a
//! [`cml_core::CodeEditor`].
//!
//! All collaborators are injected as trait objects; nothing here reaches
//! for global state.

pub mod generator;
pub mod memory;
pub mod notify;
pub mod provider;
pub mod sections;
pub mod store;
pub mod studio;

pub use generator::{CmlGenerator, GenerateAction};
pub use memory::{CollectingNotifier, MemorySnippetStore, PoolFile, StaticSuggestions};
pub use notify::{Notification, NotificationSink, NotificationVariant, TracingNotifier};
pub use provider::{ContextResponse, RecordContext, SuggestionProvider};
pub use sections::{SnippetSection, SnippetSections};
pub use store::{Snippet, SnippetKeyword, SnippetStore};
pub use studio::Studio;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised at the service boundary
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("{0}")]
    Persistence(String),

    #[error("Snippet not found: {0}")]
    NotFound(String),

    #[error("No snippet is open")]
    NoSnippetOpen,

    #[error("Core error: {0}")]
    Core(#[from] cml_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
