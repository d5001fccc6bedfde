//! Typed failures for tree construction and path resolution.

use thiserror::Error;

/// A route tree that could not be constructed from its declaration.
///
/// Every variant carries the slash-joined location of the offending node so
/// callers can point at the exact level of a nested declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node was neither a resource string nor a nested table.
    #[error(
        "malformed route at `{at}`: expected a file path (string) or a table of nested routes, found {found}"
    )]
    MalformedNode {
        /// Location of the rejected node, `/`-joined from the root.
        at: String,
        /// JSON type name of the rejected value.
        found: &'static str,
    },

    /// One table declared more than one wildcard key.
    #[error("ambiguous wildcards at `{at}`: `{first}` and `{second}` would both match any segment")]
    DuplicateWildcard {
        /// Location of the table holding both keys.
        at: String,
        /// First wildcard key in declaration order.
        first: String,
        /// Conflicting wildcard key.
        second: String,
    },

    /// The declaration root was not a table.
    #[error("route declaration must be a table of routes, found {found}")]
    NonTableRoot {
        /// JSON type name of the rejected root.
        found: &'static str,
    },
}

/// A navigation path that failed to resolve against a route tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The path failed the grammar check before resolution started.
    #[error(
        "path `{path}` is not valid: disallowed character at byte {position}; \
         segments may only contain alphanumerics, `.`, `-`, and a leading wildcard marker"
    )]
    InvalidPath {
        /// The rejected path, verbatim.
        path: String,
        /// Byte offset of the first disallowed character.
        position: usize,
    },

    /// No literal key, wildcard, fallback, or default matched a segment.
    #[error("no route found for segment `{segment}` under `/{at}`")]
    NotFound {
        /// The segment that had no match.
        segment: String,
        /// Canonical route accumulated up to the miss.
        at: String,
    },

    /// The path ran out of segments while still inside a table.
    #[error("route `/{canonical}` does not name a view; the path stops short of a leaf")]
    IncompleteRoute {
        /// Canonical route of the table the path stopped at.
        canonical: String,
    },
}
