//! Link-activation adapter.
//!
//! Hosts watch for activations of the configured link tag and forward the
//! element's attributes here; the adapter turns them into a [`NavRequest`]
//! for [`ViewRouter::handle`](crate::controller::ViewRouter::handle). It is
//! a pure translation; no cycle logic lives on this side.

use log::{error, warn};
use serde_json::Value;

use crate::config::RouterConfig;
use crate::controller::NavRequest;

/// The attributes of an activated element, as read by the host.
#[derive(Debug, Clone, Default)]
pub struct LinkElement {
    /// Element tag name; compared case-insensitively against the
    /// configured link tag.
    pub tag: String,
    /// Destination path (`to` attribute).
    pub to: Option<String>,
    /// Optional JSON payload (`pathData` attribute).
    pub path_data: Option<String>,
}

/// Translate an activated element into a navigation request.
///
/// Returns `None` when the element is not a link of the configured tag or
/// carries no destination. A `pathData` value that fails to parse as JSON
/// is reported and treated as absent; a broken payload never blocks the
/// navigation itself.
pub fn link_request(config: &RouterConfig, element: &LinkElement) -> Option<NavRequest> {
    if !element.tag.eq_ignore_ascii_case(&config.link_tag) {
        return None;
    }
    let Some(to) = element.to.as_ref() else {
        warn!("link element without a `to` attribute; ignoring activation");
        return None;
    };

    let data = element.path_data.as_deref().and_then(|raw| {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                if config.debug {
                    error!("could not parse link data: {err}; value received: {raw}");
                }
                None
            }
        }
    });

    Some(NavRequest::LinkActivation {
        path: to.clone(),
        data,
    })
}
