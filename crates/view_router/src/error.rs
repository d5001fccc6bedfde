//! Router failure taxonomy.
//!
//! Every variant aborts only the navigation cycle that raised it: the
//! previously rendered view, the navigation state, and the history stack are
//! left untouched, and nothing here is ever allowed to escape as a panic.

use route_engine::{ResolveError, TreeError};
use thiserror::Error;

/// A navigation cycle or router construction failure.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Path validation or resolution failed.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The route declaration could not be turned into a tree.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The router was assembled without the pieces it needs to run.
    #[error("router misconfigured: {reason}")]
    StartupMisconfiguration {
        /// Human-readable description of the missing or invalid piece.
        reason: String,
    },

    /// No built-in or registered loader claims the resolved resource.
    #[error("no loader matches resource `{resource}`")]
    UnsupportedResourceType {
        /// The resource identifier nothing matched.
        resource: String,
    },

    /// A custom parser failed its registration-time shape check.
    #[error("registered parser is invalid: {reason}")]
    InvalidParser {
        /// What about the parser was rejected.
        reason: String,
    },

    /// A parser or module export produced a value that cannot be rendered.
    #[error("view `{resource}` produced output that is not renderable")]
    UnsupportedParserOutput {
        /// The resource whose output was rejected.
        resource: String,
    },

    /// The matched loader failed to retrieve or parse the resource.
    #[error("failed to load `{resource}`")]
    LoadFailed {
        /// The resource being loaded when the collaborator failed.
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    /// The rendering surface rejected a mutation.
    #[error("rendering surface failure")]
    SurfaceFailed(#[source] anyhow::Error),

    /// The history collaborator rejected a new entry.
    #[error("history entry could not be written")]
    HistoryFailed(#[source] anyhow::Error),
}
