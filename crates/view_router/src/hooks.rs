//! Pre/post navigation hooks.

use async_trait::async_trait;

/// Externally supplied hooks bracketing every navigation cycle.
///
/// `before_navigation` is the sole cancellation point: returning `false`
/// aborts the cycle before any history write or container mutation.
/// `after_navigation` runs once the new view is in place; its outcome gates
/// nothing.
#[async_trait]
pub trait NavigationHooks: Send + Sync {
    /// Guard invoked before anything else in a cycle. Defaults to allowing
    /// the navigation.
    async fn before_navigation(&self) -> bool {
        true
    }

    /// Notification invoked after the new view rendered. Defaults to a
    /// no-op.
    async fn after_navigation(&self) {}
}

/// The default hooks: always permit, never react.
#[derive(Debug, Default)]
pub struct PermissiveHooks;

#[async_trait]
impl NavigationHooks for PermissiveHooks {}
