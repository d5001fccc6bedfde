//! Client-side view router.
//!
//! This crate orchestrates view transitions for a single rendering
//! container: a navigation request is guarded, resolved against the route
//! tree (see `route_engine`), loaded through a matching strategy, and
//! swapped into the container, with history and in-page listeners kept in
//! step. Host specifics such as actual fetching, DOM mutation, history
//! storage, and module evaluation stay behind narrow collaborator traits.

pub mod config;
pub mod content;
pub mod controller;
/// Rendering surface seam; DOM internals live on the host side.
pub mod dom;
pub mod error;
/// URL fetching for http, https, and file resources.
pub mod fetch;
pub mod history;
pub mod hooks;
/// Link-activation translation into navigation requests.
pub mod link;
pub mod loader;
/// Script-module import seam.
pub mod module;

pub use config::RouterConfig;
pub use content::{DomNode, RenderedContent, ViewValue};
pub use controller::{
    NavRequest, NavigationOutcome, NavigationState, RouterBuilder, RouterEvent, ViewRouter,
};
pub use error::RouterError;
pub use loader::{CustomParser, LoadContext, ParseFn, ParserPattern, ViewLoader};
