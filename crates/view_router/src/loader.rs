//! View loading strategies.
//!
//! A resolved resource identifier is claimed by the first strategy whose
//! `matches` accepts it: the built-in markup loader, then the built-in
//! script loader, then custom parsers in registration order. No claim means
//! the resource type is unsupported and the navigation aborts.

use std::fmt;
use std::sync::Arc;

use anyhow::Error;
use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::content::{RenderedContent, ViewValue};
use crate::error::RouterError;
use crate::fetch::ResourceFetcher;
use crate::module::ModuleHost;

/// Everything a loader may need for one load.
pub struct LoadContext<'cycle> {
    /// Fetcher collaborator for text retrieval.
    pub fetcher: &'cycle dyn ResourceFetcher,
    /// Module host, when the router was assembled with one.
    pub modules: Option<&'cycle dyn ModuleHost>,
    /// Fully formed URL of the resource.
    pub url: Url,
    /// The resolved resource identifier, for reporting.
    pub resource: &'cycle str,
}

/// One strategy for turning a resource identifier into rendered content.
#[async_trait]
pub trait ViewLoader: Send + Sync {
    /// Whether this loader claims `resource`.
    fn matches(&self, resource: &str) -> bool;

    /// Load and parse the claimed resource.
    ///
    /// # Errors
    ///
    /// [`RouterError::LoadFailed`] when retrieval fails,
    /// [`RouterError::UnsupportedParserOutput`] when the produced value is
    /// not renderable.
    async fn load(&self, cx: &LoadContext<'_>) -> Result<RenderedContent, RouterError>;
}

fn load_failed(resource: &str) -> impl FnOnce(Error) -> RouterError {
    let resource = resource.to_owned();
    move |source| RouterError::LoadFailed { resource, source }
}

/// Built-in loader for markup views (`.html`, `.htm`).
struct HtmlLoader;

#[async_trait]
impl ViewLoader for HtmlLoader {
    fn matches(&self, resource: &str) -> bool {
        resource.ends_with(".html") || resource.ends_with(".htm")
    }

    async fn load(&self, cx: &LoadContext<'_>) -> Result<RenderedContent, RouterError> {
        let markup = cx
            .fetcher
            .fetch_text(&cx.url)
            .await
            .map_err(load_failed(cx.resource))?;
        Ok(RenderedContent::Markup(markup))
    }
}

/// Built-in loader for script-module views (`.js`, `.mjs`).
///
/// Renders whatever the module's default export evaluates to, via the
/// router's [`ModuleHost`].
struct ScriptLoader;

#[async_trait]
impl ViewLoader for ScriptLoader {
    fn matches(&self, resource: &str) -> bool {
        resource.ends_with(".js") || resource.ends_with(".mjs")
    }

    async fn load(&self, cx: &LoadContext<'_>) -> Result<RenderedContent, RouterError> {
        let Some(modules) = cx.modules else {
            return Err(RouterError::LoadFailed {
                resource: cx.resource.to_owned(),
                source: anyhow::anyhow!("no module host registered for script views"),
            });
        };
        let export = modules
            .default_export(&cx.url)
            .await
            .map_err(load_failed(cx.resource))?;
        RenderedContent::from_view_value(export, cx.resource)
    }
}

/// How a custom parser claims resources.
#[derive(Debug, Clone)]
pub enum ParserPattern {
    /// Claim identifiers ending with the given string.
    Suffix(String),
    /// Claim identifiers containing the given string.
    Contains(String),
}

impl ParserPattern {
    fn matches(&self, resource: &str) -> bool {
        match self {
            Self::Suffix(suffix) => resource.ends_with(suffix.as_str()),
            Self::Contains(needle) => resource.contains(needle.as_str()),
        }
    }

    fn text(&self) -> &str {
        match self {
            Self::Suffix(text) | Self::Contains(text) => text,
        }
    }
}

/// Parse function signature: resource identifier plus fetched text in, host
/// value out.
pub type ParseFn = Arc<dyn Fn(&str, &str) -> Result<ViewValue, Error> + Send + Sync>;

/// A user-registered parser strategy.
///
/// Construction is the registration-time shape check: a blank pattern can
/// never claim anything meaningful and is rejected up front.
#[derive(Clone)]
pub struct CustomParser {
    pattern: ParserPattern,
    parse: ParseFn,
}

impl CustomParser {
    /// Validate and build a parser from its pattern and parse function.
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidParser`] when the pattern text is empty or
    /// whitespace.
    pub fn new(pattern: ParserPattern, parse: ParseFn) -> Result<Self, RouterError> {
        if pattern.text().trim().is_empty() {
            return Err(RouterError::InvalidParser {
                reason: "pattern is empty".to_owned(),
            });
        }
        Ok(Self { pattern, parse })
    }
}

impl fmt::Debug for CustomParser {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CustomParser")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ViewLoader for CustomParser {
    fn matches(&self, resource: &str) -> bool {
        self.pattern.matches(resource)
    }

    async fn load(&self, cx: &LoadContext<'_>) -> Result<RenderedContent, RouterError> {
        let text = cx
            .fetcher
            .fetch_text(&cx.url)
            .await
            .map_err(load_failed(cx.resource))?;
        let value = (self.parse)(cx.resource, &text).map_err(load_failed(cx.resource))?;
        RenderedContent::from_view_value(value, cx.resource)
    }
}

/// The ordered strategy list consulted for every load.
pub(crate) struct LoaderSet {
    loaders: Vec<Box<dyn ViewLoader>>,
}

impl LoaderSet {
    /// Built-ins only; custom parsers are appended afterwards.
    pub(crate) fn new() -> Self {
        Self {
            loaders: vec![Box::new(HtmlLoader), Box::new(ScriptLoader)],
        }
    }

    pub(crate) fn register(&mut self, parser: CustomParser) {
        self.loaders.push(Box::new(parser));
    }

    /// First matching loader wins.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnsupportedResourceType`] when nothing claims the
    /// resource; otherwise whatever the claiming loader reports.
    pub(crate) async fn dispatch(
        &self,
        cx: &LoadContext<'_>,
    ) -> Result<RenderedContent, RouterError> {
        for loader in &self.loaders {
            if loader.matches(cx.resource) {
                debug!("loading `{}` from {}", cx.resource, cx.url);
                return loader.load(cx).await;
            }
        }
        Err(RouterError::UnsupportedResourceType {
            resource: cx.resource.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::content::DomNode;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ResourceFetcher for MapFetcher {
        async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
            self.0
                .get(url.path())
                .map(|text| (*text).to_owned())
                .ok_or_else(|| anyhow!("no such resource: {url}"))
        }
    }

    struct FixedExport(ViewValue);

    #[async_trait]
    impl ModuleHost for FixedExport {
        async fn default_export(&self, _url: &Url) -> Result<ViewValue, Error> {
            Ok(self.0.clone())
        }
    }

    fn cx<'cycle>(
        fetcher: &'cycle dyn ResourceFetcher,
        modules: Option<&'cycle dyn ModuleHost>,
        resource: &'cycle str,
    ) -> LoadContext<'cycle> {
        let url = Url::parse("http://app.local/")
            .and_then(|base| base.join(resource))
            .unwrap();
        LoadContext {
            fetcher,
            modules,
            url,
            resource,
        }
    }

    #[tokio::test]
    async fn markup_views_come_back_as_markup() {
        let fetcher = MapFetcher(HashMap::from([("/home.html", "<h1>home</h1>")]));
        let set = LoaderSet::new();
        let content = set.dispatch(&cx(&fetcher, None, "home.html")).await.unwrap();
        assert_eq!(content, RenderedContent::Markup("<h1>home</h1>".to_owned()));
    }

    #[tokio::test]
    async fn script_views_render_the_default_export() {
        let fetcher = MapFetcher(HashMap::new());
        let modules = FixedExport(ViewValue::Nodes(vec![DomNode::from_markup("<li>a</li>")]));
        let set = LoaderSet::new();
        let content = set
            .dispatch(&cx(&fetcher, Some(&modules), "widget.js"))
            .await
            .unwrap();
        assert!(matches!(content, RenderedContent::Nodes(nodes) if nodes.len() == 1));
    }

    #[tokio::test]
    async fn script_views_without_a_module_host_fail_to_load() {
        let fetcher = MapFetcher(HashMap::new());
        let set = LoaderSet::new();
        let result = set.dispatch(&cx(&fetcher, None, "widget.js")).await;
        assert!(matches!(
            result,
            Err(RouterError::LoadFailed { resource, .. }) if resource == "widget.js"
        ));
    }

    #[tokio::test]
    async fn non_renderable_exports_are_rejected() {
        let fetcher = MapFetcher(HashMap::new());
        let modules = FixedExport(ViewValue::Data(json!(42)));
        let set = LoaderSet::new();
        let result = set.dispatch(&cx(&fetcher, Some(&modules), "widget.mjs")).await;
        assert!(matches!(
            result,
            Err(RouterError::UnsupportedParserOutput { .. })
        ));
    }

    #[tokio::test]
    async fn unclaimed_resources_are_unsupported() {
        let fetcher = MapFetcher(HashMap::new());
        let set = LoaderSet::new();
        let result = set.dispatch(&cx(&fetcher, None, "styles.css")).await;
        assert!(matches!(
            result,
            Err(RouterError::UnsupportedResourceType { resource }) if resource == "styles.css"
        ));
    }

    #[tokio::test]
    async fn custom_parsers_receive_the_fetched_text() {
        let fetcher = MapFetcher(HashMap::from([("/notes.md", "# heading")]));
        let parser = CustomParser::new(
            ParserPattern::Suffix(".md".to_owned()),
            Arc::new(|_resource: &str, text: &str| {
                Ok(ViewValue::Markup(format!("<article>{text}</article>")))
            }),
        )
        .unwrap();
        let mut set = LoaderSet::new();
        set.register(parser);
        let content = set.dispatch(&cx(&fetcher, None, "notes.md")).await.unwrap();
        assert_eq!(
            content,
            RenderedContent::Markup("<article># heading</article>".to_owned())
        );
    }

    #[tokio::test]
    async fn built_ins_win_over_custom_parsers() {
        let fetcher = MapFetcher(HashMap::from([("/page.html", "<p>real</p>")]));
        let parser = CustomParser::new(
            ParserPattern::Contains("page".to_owned()),
            Arc::new(|_resource: &str, _text: &str| {
                Ok(ViewValue::Markup("<p>shadowed</p>".to_owned()))
            }),
        )
        .unwrap();
        let mut set = LoaderSet::new();
        set.register(parser);
        let content = set.dispatch(&cx(&fetcher, None, "page.html")).await.unwrap();
        assert_eq!(content, RenderedContent::Markup("<p>real</p>".to_owned()));
    }

    #[test]
    fn blank_patterns_are_rejected_at_registration() {
        for pattern in [
            ParserPattern::Suffix(String::new()),
            ParserPattern::Contains("   ".to_owned()),
        ] {
            let result = CustomParser::new(
                pattern,
                Arc::new(|_resource: &str, text: &str| Ok(ViewValue::Markup(text.to_owned()))),
            );
            assert!(matches!(result, Err(RouterError::InvalidParser { .. })));
        }
    }
}
