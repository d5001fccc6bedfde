//! Router configuration.
//!
//! Everything the composition root decides up front: the route declaration,
//! where view resources live, which container receives them, and the small
//! set of markers the router recognizes in paths and documents.

use std::env;

use route_engine::DEFAULT_WILDCARD_MARKER;
use serde_json::Value;
use url::Url;

/// Caller-supplied router settings.
///
/// `new` fills every option with its default; fields are public so the
/// composition root can override the ones it cares about.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Nested route declaration (segment key → resource or nested table).
    pub routes: Value,
    /// Origin resource URLs are formed against, e.g. the app's base URL.
    pub base_url: Url,
    /// Path prefix under which view resources live. A missing leading or
    /// trailing separator is added at assembly time.
    pub base_folder: String,
    /// Identifier of the container element views render into.
    pub container_id: String,
    /// First character of wildcard route keys.
    pub wildcard_marker: char,
    /// Tag name of link elements the host forwards activations for.
    pub link_tag: String,
    /// Class marking scripts the router injected, so the next cycle can
    /// remove them.
    pub script_marker_class: String,
    /// Whether router failures are reported through the logging channel.
    pub debug: bool,
}

impl RouterConfig {
    /// Construct a configuration with default options.
    #[inline]
    #[must_use]
    pub fn new(routes: Value, base_url: Url) -> Self {
        Self {
            routes,
            base_url,
            base_folder: "/".to_owned(),
            container_id: "router-view".to_owned(),
            wildcard_marker: DEFAULT_WILDCARD_MARKER,
            link_tag: "router-link".to_owned(),
            script_marker_class: "router-script".to_owned(),
            debug: true,
        }
    }

    /// Construct a configuration, overlaying environment variables.
    ///
    /// Reads the following environment variables:
    /// - `VIEW_ROUTER_DEBUG`: set to "0" to silence failure reporting
    /// - `VIEW_ROUTER_BASE_FOLDER`: path prefix for view resources
    #[inline]
    #[must_use]
    pub fn from_env(routes: Value, base_url: Url) -> Self {
        let mut config = Self::new(routes, base_url);
        if env::var("VIEW_ROUTER_DEBUG").ok().as_deref() == Some("0") {
            config.debug = false;
        }
        if let Ok(folder) = env::var("VIEW_ROUTER_BASE_FOLDER") {
            config.base_folder = folder;
        }
        config
    }

    /// The base folder with leading and trailing separators guaranteed.
    pub(crate) fn normalized_base_folder(&self) -> String {
        let mut folder = self.base_folder.clone();
        if !folder.starts_with('/') {
            folder.insert(0, '/');
        }
        if !folder.ends_with('/') {
            folder.push('/');
        }
        folder
    }
}
