//! Route resolution engine.
//!
//! This crate maps slash-delimited navigation paths onto a declarative route
//! tree, producing the resource identifier to load plus any wildcard
//! captures gathered along the way. It is pure and synchronous: path grammar
//! checking, tree construction, and resolution perform no I/O and hold no
//! shared state, so the same inputs always produce the same outputs.

pub mod error;
pub mod path;
pub mod resolver;
pub mod tree;

pub use error::{ResolveError, TreeError};
pub use resolver::{ResolvedRoute, WildcardBinding, resolve};
pub use tree::RouteTree;

/// Reserved root-level key naming the resource for the empty or `/` path.
pub const DEFAULT_KEY: &str = "default";

/// Reserved key naming the resource substituted when nothing else matches
/// at a tree level.
pub const FALLBACK_KEY: &str = "fallback";

/// Wildcard marker used when a configuration does not override it.
pub const DEFAULT_WILDCARD_MARKER: char = ':';
