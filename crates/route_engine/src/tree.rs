//! Declarative route tree.
//!
//! Routes are declared as a nested table mapping path segments to either a
//! resource identifier (a string leaf) or a further table. The declaration
//! is checked once, up front: every node becomes a tagged [`EntryKind`]
//! inside an [`Arena`], so resolution never re-inspects value shapes, and a
//! table declaring two wildcard keys is rejected outright instead of
//! silently honoring whichever comes first.

use indextree::{Arena, NodeId};
use serde_json::Value;

use crate::error::TreeError;

/// What a tree node holds: nested routes or a resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EntryKind {
    /// An interior level mapping segment keys to children.
    Table,
    /// A resource identifier, e.g. a relative file path.
    Leaf(String),
}

/// One named node of the route tree.
#[derive(Debug, Clone)]
pub(crate) struct RouteEntry {
    /// Segment key this node was declared under. Empty for the root.
    key: String,
    kind: EntryKind,
}

/// An immutable, shape-checked route tree.
///
/// Built from a JSON-like declaration via [`RouteTree::from_value`]; the
/// constructor is the only place shapes are examined, so a constructed tree
/// can be walked without error paths for malformed nodes.
#[derive(Debug)]
pub struct RouteTree {
    arena: Arena<RouteEntry>,
    root: NodeId,
    marker: char,
}

/// JSON type name used in [`TreeError`] reports.
fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

impl RouteTree {
    /// Build a tree from a nested declaration.
    ///
    /// `marker` is the wildcard marker character; keys beginning with it
    /// match any single path segment.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NonTableRoot`] if the declaration is not an object.
    /// - [`TreeError::MalformedNode`] if any value is neither a string nor
    ///   an object (arrays and null are invalid at every position).
    /// - [`TreeError::DuplicateWildcard`] if one table declares more than
    ///   one wildcard key.
    pub fn from_value(declaration: &Value, marker: char) -> Result<Self, TreeError> {
        let Value::Object(table) = declaration else {
            return Err(TreeError::NonTableRoot {
                found: value_type_name(declaration),
            });
        };

        let mut arena = Arena::new();
        let root = arena.new_node(RouteEntry {
            key: String::new(),
            kind: EntryKind::Table,
        });
        let mut tree = Self { arena, root, marker };
        tree.fill_table(root, table, &mut Vec::new())?;
        Ok(tree)
    }

    /// Insert `table`'s entries under `parent`, recursing into sub-tables.
    ///
    /// `trail` carries the segment keys from the root, for error reporting.
    fn fill_table(
        &mut self,
        parent: NodeId,
        table: &serde_json::Map<String, Value>,
        trail: &mut Vec<String>,
    ) -> Result<(), TreeError> {
        let mut wildcard: Option<&str> = None;
        for (key, value) in table {
            if key.starts_with(self.marker) {
                if let Some(first) = wildcard {
                    return Err(TreeError::DuplicateWildcard {
                        at: trail.join("/"),
                        first: first.to_owned(),
                        second: key.clone(),
                    });
                }
                wildcard = Some(key);
            }

            trail.push(key.clone());
            match value {
                Value::String(resource) => {
                    let node = self.arena.new_node(RouteEntry {
                        key: key.clone(),
                        kind: EntryKind::Leaf(resource.clone()),
                    });
                    parent.append(node, &mut self.arena);
                }
                Value::Object(nested) => {
                    let node = self.arena.new_node(RouteEntry {
                        key: key.clone(),
                        kind: EntryKind::Table,
                    });
                    parent.append(node, &mut self.arena);
                    self.fill_table(node, nested, trail)?;
                }
                other => {
                    return Err(TreeError::MalformedNode {
                        at: trail.join("/"),
                        found: value_type_name(other),
                    });
                }
            }
            trail.pop();
        }
        Ok(())
    }

    /// The configured wildcard marker.
    #[inline]
    pub const fn marker(&self) -> char {
        self.marker
    }

    /// Root table id.
    #[inline]
    pub(crate) const fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn entry(&self, node: NodeId) -> &RouteEntry {
        // Node ids never leave this tree, so the lookup cannot dangle.
        self.arena[node].get()
    }

    /// Segment key of `node` as declared.
    #[inline]
    pub(crate) fn key(&self, node: NodeId) -> &str {
        &self.entry(node).key
    }

    /// Tagged kind of `node`.
    #[inline]
    pub(crate) fn kind(&self, node: NodeId) -> &EntryKind {
        &self.entry(node).kind
    }

    /// Child of `table` whose key equals `key` exactly.
    pub(crate) fn child(&self, table: NodeId, key: &str) -> Option<NodeId> {
        table
            .children(&self.arena)
            .find(|&child| self.key(child) == key)
    }

    /// The wildcard child of `table`, if declared. Unique post-validation.
    pub(crate) fn wildcard_child(&self, table: NodeId) -> Option<NodeId> {
        table
            .children(&self.arena)
            .find(|&child| self.key(child).starts_with(self.marker))
    }

    /// Whether the root table declares `key` at all, leaf or not.
    pub fn declares(&self, key: &str) -> bool {
        self.child(self.root, key).is_some()
    }

    /// The root `default` resource, when declared as a leaf.
    pub fn default_resource(&self) -> Option<&str> {
        self.child(self.root, crate::DEFAULT_KEY)
            .and_then(|node| match self.kind(node) {
                EntryKind::Leaf(resource) => Some(resource.as_str()),
                EntryKind::Table => None,
            })
    }
}
