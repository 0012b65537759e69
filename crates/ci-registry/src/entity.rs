//! Registered entities and their cleanup callbacks

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;

/// Result of a cleanup callback
pub type CleanupResult = Result<(), CleanupError>;

/// Future returned by a cleanup callback
pub type CleanupFuture = Pin<Box<dyn Future<Output = CleanupResult> + Send>>;

/// One-shot callback that deletes an entity on the server
type CleanupFn = Box<dyn FnOnce() -> CleanupFuture + Send>;

/// Why a cleanup callback failed
#[derive(Debug, Clone, Error)]
pub enum CleanupError {
    /// The delete request failed or was rejected
    #[error("delete request failed: {0}")]
    Request(String),

    /// The entity's kind is unknown, so nothing can delete it automatically
    #[error("no automatic cleanup for entity created at {url}; remove it manually")]
    ManualReviewRequired { url: String },

    /// The callback panicked
    #[error("cleanup callback panicked")]
    Panicked,
}

/// Kind of server entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Project,
    BuildType,
    User,
    /// Created through an endpoint that is not recognised
    Unknown,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::BuildType => "buildType",
            EntityKind::User => "user",
            EntityKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity awaiting cleanup
///
/// Owned by the registry once added; the callback runs at most once.
pub struct RegisteredEntity {
    pub(crate) kind: EntityKind,
    pub(crate) id: String,
    pub(crate) display_name: Option<String>,
    pub(crate) cleanup: CleanupFn,
}

impl RegisteredEntity {
    /// Create an entity with its cleanup callback
    pub fn new<F, Fut>(kind: EntityKind, id: impl Into<String>, cleanup: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = CleanupResult> + Send + 'static,
    {
        Self {
            kind,
            id: id.into(),
            display_name: None,
            cleanup: Box::new(move || Box::pin(cleanup()) as CleanupFuture),
        }
    }

    /// Attach a human-readable name used in logs
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl fmt::Debug for RegisteredEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredEntity")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Terminal state of an entity after a cleanup attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupState {
    Cleaned,
    CleanupFailed(String),
}

/// What happened to one entity during a drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub kind: EntityKind,
    pub id: String,
    pub display_name: Option<String>,
    pub state: CleanupState,
}

impl CleanupOutcome {
    pub fn is_cleaned(&self) -> bool {
        self.state == CleanupState::Cleaned
    }
}
