//! Path resolution.
//!
//! Walks a validated navigation path against a [`RouteTree`], one tree level
//! per non-empty segment, and produces the resource to load together with
//! the canonical route that matched and any wildcard captures. The walk is a
//! fold over the segment list carrying its accumulator explicitly, so two
//! resolutions of the same path are independent by construction.
//!
//! Matching at a table level, in order:
//! 1. a child whose key equals the segment exactly;
//! 2. the table's wildcard child, binding the segment to the key's name;
//! 3. the table's `fallback` resource;
//! 4. the root's `default` resource.
//!
//! Empty segments (doubled or leading separators) consume no tree level. A
//! trailing separator after resolution has reached a leaf is tolerated.

use indextree::NodeId;
use log::trace;

use crate::error::ResolveError;
use crate::path;
use crate::tree::{EntryKind, RouteTree};
use crate::{DEFAULT_KEY, FALLBACK_KEY};

/// One wildcard capture, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardBinding {
    /// The wildcard key's name, marker stripped.
    pub name: String,
    /// The literal path segment that matched.
    pub value: String,
}

/// Successful resolution of one navigation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Resource identifier of the matched leaf.
    pub resource: String,
    /// The `/`-joined keys actually matched, leading separator stripped;
    /// wildcard levels keep their declared key, not the captured value.
    pub canonical: String,
    /// Wildcard captures gathered on the way down.
    pub bindings: Vec<WildcardBinding>,
}

/// Accumulator threaded through the fold.
struct Walk {
    canonical: Vec<String>,
    bindings: Vec<WildcardBinding>,
}

impl Walk {
    fn at(&self) -> String {
        self.canonical.join("/")
    }
}

/// Resolve `path` against `tree`.
///
/// The empty path and `/` resolve as the literal segment `default`.
///
/// # Errors
///
/// - [`ResolveError::InvalidPath`] if the path fails the grammar check;
///   resolution is not attempted.
/// - [`ResolveError::NotFound`] if a segment matches nothing and no
///   `fallback`/`default` substitute applies, or if segments remain after
///   a leaf was reached.
/// - [`ResolveError::IncompleteRoute`] if the segments run out while still
///   on a table.
pub fn resolve(tree: &RouteTree, path: &str) -> Result<ResolvedRoute, ResolveError> {
    path::validate(path, tree.marker())?;

    let fixed = if path.is_empty() || path == "/" {
        DEFAULT_KEY
    } else {
        path
    };

    let mut walk = Walk {
        canonical: Vec::new(),
        bindings: Vec::new(),
    };
    let mut current = tree.root();

    for segment in fixed.split('/').filter(|segment| !segment.is_empty()) {
        current = step(tree, current, segment, &mut walk)?;
    }

    match tree.kind(current) {
        EntryKind::Leaf(resource) => {
            trace!("resolved `{path}` to `{resource}` via `{}`", walk.at());
            Ok(ResolvedRoute {
                resource: resource.clone(),
                canonical: walk.at(),
                bindings: walk.bindings,
            })
        }
        EntryKind::Table => Err(ResolveError::IncompleteRoute {
            canonical: walk.at(),
        }),
    }
}

/// Advance one segment from `current`, appending to the accumulator.
fn step(
    tree: &RouteTree,
    current: NodeId,
    segment: &str,
    walk: &mut Walk,
) -> Result<NodeId, ResolveError> {
    // A leaf consumes no further segments; nothing below it can match and
    // there is no table level at which a fallback could apply.
    if matches!(tree.kind(current), EntryKind::Leaf(_)) {
        return Err(ResolveError::NotFound {
            segment: segment.to_owned(),
            at: walk.at(),
        });
    }

    if let Some(child) = tree.child(current, segment) {
        walk.canonical.push(segment.to_owned());
        return Ok(child);
    }

    if let Some(wildcard) = tree.wildcard_child(current) {
        let key = tree.key(wildcard);
        walk.bindings.push(WildcardBinding {
            name: key[tree.marker().len_utf8()..].to_owned(),
            value: segment.to_owned(),
        });
        walk.canonical.push(key.to_owned());
        return Ok(wildcard);
    }

    // No match at this level: the level's fallback, then the root default.
    // Either substitute keeps the unmatched literal segment in the
    // canonical route and continues the walk from the substituted node.
    let substitute = tree
        .child(current, FALLBACK_KEY)
        .or_else(|| tree.child(tree.root(), DEFAULT_KEY));
    match substitute {
        Some(node) => {
            walk.canonical.push(segment.to_owned());
            Ok(node)
        }
        None => Err(ResolveError::NotFound {
            segment: segment.to_owned(),
            at: walk.at(),
        }),
    }
}
