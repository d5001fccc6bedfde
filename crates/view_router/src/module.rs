//! Script-module import seam.

use anyhow::Error;
use async_trait::async_trait;
use url::Url;

use crate::content::ViewValue;

/// Imports a script-like view and surfaces its default export.
///
/// Module loading is host-specific (a bundler, an embedded engine, a test
/// double), so the router only holds this seam; a router assembled without
/// one reports script views as load failures instead of rendering them.
#[async_trait]
pub trait ModuleHost: Send + Sync {
    /// Import the module at `url` and return its default-exported value.
    ///
    /// # Errors
    ///
    /// Returns an error if the module cannot be imported or evaluates with
    /// a failure.
    async fn default_export(&self, url: &Url) -> Result<ViewValue, Error>;
}
