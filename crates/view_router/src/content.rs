//! Values that flow from loaders toward the rendering surface.

use serde_json::Value;

use crate::error::RouterError;

/// An opaque renderable fragment.
///
/// Produced by host parsers and module exports, consumed by the
/// [`DomSurface`](crate::dom::DomSurface); the router itself never looks
/// inside one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    markup: String,
}

impl DomNode {
    /// Wrap serialized markup as a renderable fragment.
    #[inline]
    pub fn from_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// The fragment's serialized form, for surfaces that consume markup.
    #[inline]
    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// What a host-side parser or module default-export handed back.
///
/// Hosts are free to return arbitrary values; only the first three shapes
/// are renderable. [`Data`](Self::Data) captures everything else so the
/// output check stays explicit instead of being lost in a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewValue {
    /// Plain markup, injected wholesale.
    Markup(String),
    /// A single renderable fragment.
    Node(DomNode),
    /// A list of renderable fragments, appended in order.
    Nodes(Vec<DomNode>),
    /// A non-renderable host value.
    Data(Value),
}

/// Content ready to hand to the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedContent {
    /// Markup replacing the container contents.
    Markup(String),
    /// One fragment appended to the emptied container.
    Node(DomNode),
    /// Fragments appended to the emptied container, in order.
    Nodes(Vec<DomNode>),
}

impl RenderedContent {
    /// Check and convert a host value into renderable content.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnsupportedParserOutput`] when the value is not one of
    /// the renderable shapes; `resource` names the view for the report.
    pub fn from_view_value(value: ViewValue, resource: &str) -> Result<Self, RouterError> {
        match value {
            ViewValue::Markup(markup) => Ok(Self::Markup(markup)),
            ViewValue::Node(node) => Ok(Self::Node(node)),
            ViewValue::Nodes(nodes) => Ok(Self::Nodes(nodes)),
            ViewValue::Data(_) => Err(RouterError::UnsupportedParserOutput {
                resource: resource.to_owned(),
            }),
        }
    }
}
