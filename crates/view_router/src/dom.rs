//! Rendering surface seam.
//!
//! The router mutates the view container exclusively through this trait;
//! DOM internals live on the host side. Implementations take `&self`;
//! surfaces are shared bridges and manage their own interior mutability.

use std::sync::Arc;

use anyhow::Error;

use crate::content::DomNode;

/// Host-side container the router renders into.
pub trait DomSurface: Send + Sync {
    /// Replace the container's contents with `markup`. An empty string
    /// clears the container.
    fn replace_markup(&self, markup: &str) -> Result<(), Error>;

    /// Append fragments to the container, in order.
    fn append_nodes(&self, nodes: &[DomNode]) -> Result<(), Error>;

    /// Re-execute scripts injected with the latest contents, tagging them
    /// with `marker_class` so a later cycle can find them.
    ///
    /// Scripts that arrive via bulk markup replacement do not run on their
    /// own; the surface is expected to lift and re-insert them.
    fn activate_scripts(&self, marker_class: &str) -> Result<(), Error>;

    /// Remove every script previously tagged with `marker_class`.
    fn clear_scripts(&self, marker_class: &str) -> Result<(), Error>;
}

impl<T: DomSurface + ?Sized> DomSurface for Arc<T> {
    fn replace_markup(&self, markup: &str) -> Result<(), Error> {
        (**self).replace_markup(markup)
    }

    fn append_nodes(&self, nodes: &[DomNode]) -> Result<(), Error> {
        (**self).append_nodes(nodes)
    }

    fn activate_scripts(&self, marker_class: &str) -> Result<(), Error> {
        (**self).activate_scripts(marker_class)
    }

    fn clear_scripts(&self, marker_class: &str) -> Result<(), Error> {
        (**self).clear_scripts(marker_class)
    }
}
