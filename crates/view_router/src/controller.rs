//! Navigation controller.
//!
//! One router instance owns the route tree, the per-navigation state, and
//! the collaborator seams, and drives every view transition through the
//! same cycle: `Idle → Guarding → Resolving → Loading → Rendered → Idle`.
//! All trigger sources (programmatic calls, link activations, history
//! back/forward, in-page events) funnel into [`ViewRouter::handle`].
//!
//! Cycles are serialized by supersession: each cycle samples a generation
//! at entry and re-checks it after every suspension point, so a cycle that
//! was overtaken while awaiting a hook or a fetch exits without touching
//! the container. The newest navigation always wins and no stale render
//! can land on top of a fresh one.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, trace, warn};
use route_engine::{ResolvedRoute, RouteTree, WildcardBinding, resolve};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::info_span;
use url::Url;

use crate::config::RouterConfig;
use crate::content::RenderedContent;
use crate::dom::DomSurface;
use crate::error::RouterError;
use crate::fetch::{ResourceFetcher, UrlFetcher};
use crate::history::{HistorySink, MemoryHistory};
use crate::hooks::{NavigationHooks, PermissiveHooks};
use crate::loader::{CustomParser, LoadContext, LoaderSet};
use crate::module::ModuleHost;

/// A navigation trigger, by source.
///
/// Host adapters translate their events into one of these and call
/// [`ViewRouter::handle`]; none of them re-implements any cycle logic.
#[derive(Debug, Clone, PartialEq)]
pub enum NavRequest {
    /// Direct `navigate()`-style call. Writes a history entry.
    Programmatic {
        /// Destination path; a missing leading separator is added.
        path: String,
        /// Payload for the history entry; falls back to staged draft data.
        data: Option<Value>,
    },
    /// A link element activation. Writes a history entry.
    LinkActivation {
        /// Destination path from the link's `to` attribute.
        path: String,
        /// Payload parsed from the link's `pathData` attribute.
        data: Option<Value>,
    },
    /// The host's back/forward notification. Mounts only.
    HistoryPop {
        /// Path of the now-active history entry.
        path: String,
    },
    /// The in-page navigation event. Mounts only.
    PageEvent {
        /// Path carried by the event.
        path: String,
    },
}

/// Notification fanned out to in-page listeners on committing navigations.
#[derive(Debug, Clone)]
pub struct RouterEvent {
    /// The normalized destination path.
    pub path: String,
}

/// How a navigation cycle ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The new view is in the container.
    Rendered,
    /// The pre-navigation guard declined; nothing happened.
    Blocked,
    /// A newer navigation overtook this one; nothing further happened.
    Superseded,
}

/// Where a cycle currently is, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Guarding,
    Resolving,
    Loading,
    Rendered,
}

/// Per-navigation router state, replaced wholesale on every resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Canonical route of the current view, wildcard keys preserved.
    pub route: String,
    /// Wildcard captures of the current view.
    pub wildcards: Vec<WildcardBinding>,
}

/// Assembles a [`ViewRouter`] from its configuration and collaborators.
///
/// The rendering surface is the one mandatory collaborator; fetcher,
/// history, and hooks fall back to the stock implementations.
pub struct RouterBuilder {
    config: RouterConfig,
    fetcher: Option<Box<dyn ResourceFetcher>>,
    modules: Option<Box<dyn ModuleHost>>,
    dom: Option<Box<dyn DomSurface>>,
    history: Option<Box<dyn HistorySink>>,
    hooks: Option<Box<dyn NavigationHooks>>,
    parsers: Vec<CustomParser>,
}

impl RouterBuilder {
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            fetcher: None,
            modules: None,
            dom: None,
            history: None,
            hooks: None,
            parsers: Vec::new(),
        }
    }

    /// Rendering surface the router injects views into. Mandatory.
    #[must_use]
    pub fn dom(mut self, dom: impl DomSurface + 'static) -> Self {
        self.dom = Some(Box::new(dom));
        self
    }

    /// Resource fetcher. Defaults to [`UrlFetcher`].
    #[must_use]
    pub fn fetcher(mut self, fetcher: impl ResourceFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Module host for script views. Optional.
    #[must_use]
    pub fn module_host(mut self, modules: impl ModuleHost + 'static) -> Self {
        self.modules = Some(Box::new(modules));
        self
    }

    /// History collaborator. Defaults to [`MemoryHistory`].
    #[must_use]
    pub fn history(mut self, history: impl HistorySink + 'static) -> Self {
        self.history = Some(Box::new(history));
        self
    }

    /// Navigation hooks. Defaults to [`PermissiveHooks`].
    #[must_use]
    pub fn hooks(mut self, hooks: impl NavigationHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Append a custom parser; consulted after the built-in loaders, in
    /// registration order.
    #[must_use]
    pub fn parser(mut self, parser: CustomParser) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Validate the configuration and assemble the router.
    ///
    /// # Errors
    ///
    /// - [`RouterError::Tree`] when the route declaration is malformed.
    /// - [`RouterError::StartupMisconfiguration`] when no rendering surface
    ///   was supplied, `default` is missing, or `default` is not a resource
    ///   string.
    pub fn build(self) -> Result<ViewRouter, RouterError> {
        let tree = RouteTree::from_value(&self.config.routes, self.config.wildcard_marker)?;
        if tree.default_resource().is_none() {
            let reason = if tree.declares(route_engine::DEFAULT_KEY) {
                "default route is not a resource string"
            } else {
                "no default route specified"
            };
            return Err(RouterError::StartupMisconfiguration {
                reason: reason.to_owned(),
            });
        }
        let Some(dom) = self.dom else {
            return Err(RouterError::StartupMisconfiguration {
                reason: "no rendering surface registered".to_owned(),
            });
        };

        let mut loaders = LoaderSet::new();
        for parser in self.parsers {
            loaders.register(parser);
        }
        let (events, _) = broadcast::channel(16);

        Ok(ViewRouter {
            base_folder: self.config.normalized_base_folder(),
            config: self.config,
            tree,
            state: Mutex::new(NavigationState::default()),
            draft: Mutex::new(None),
            generation: AtomicU64::new(0),
            fetcher: self.fetcher.unwrap_or_else(|| Box::new(UrlFetcher)),
            modules: self.modules,
            dom,
            history: self.history.unwrap_or_else(|| Box::new(MemoryHistory::new())),
            hooks: self.hooks.unwrap_or_else(|| Box::new(PermissiveHooks)),
            loaders,
            events,
        })
    }
}

/// The router: one instance per composition root, no globals.
pub struct ViewRouter {
    config: RouterConfig,
    base_folder: String,
    tree: RouteTree,
    state: Mutex<NavigationState>,
    draft: Mutex<Option<Value>>,
    generation: AtomicU64,
    fetcher: Box<dyn ResourceFetcher>,
    modules: Option<Box<dyn ModuleHost>>,
    dom: Box<dyn DomSurface>,
    history: Box<dyn HistorySink>,
    hooks: Box<dyn NavigationHooks>,
    loaders: LoaderSet,
    events: broadcast::Sender<RouterEvent>,
}

impl ViewRouter {
    /// Start building a router.
    #[must_use]
    pub fn builder(config: RouterConfig) -> RouterBuilder {
        RouterBuilder::new(config)
    }

    /// Mount the view for the host's current location, typically right
    /// after assembly.
    ///
    /// # Errors
    ///
    /// Any cycle failure; see [`RouterError`].
    pub async fn start(&self, initial_path: &str) -> Result<NavigationOutcome, RouterError> {
        debug!("starting at `{initial_path}`");
        self.report(self.cycle(initial_path, None).await)
    }

    /// Single entry point for every navigation trigger.
    ///
    /// # Errors
    ///
    /// Any cycle failure; see [`RouterError`]. Failures abort only the
    /// requested cycle.
    pub async fn handle(&self, request: NavRequest) -> Result<NavigationOutcome, RouterError> {
        match request {
            NavRequest::Programmatic { path, data } | NavRequest::LinkActivation { path, data } => {
                self.navigate(&path, data).await
            }
            NavRequest::HistoryPop { path } | NavRequest::PageEvent { path } => {
                self.report(self.cycle(&path, None).await)
            }
        }
    }

    /// Programmatic navigation: normalize the path, commit a history entry
    /// (with `data`, or staged draft data), notify listeners, render.
    ///
    /// The guard still runs first: a declined navigation writes nothing.
    ///
    /// # Errors
    ///
    /// Any cycle failure; see [`RouterError`].
    pub async fn navigate(
        &self,
        path: &str,
        data: Option<Value>,
    ) -> Result<NavigationOutcome, RouterError> {
        let fixed = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        self.report(self.cycle(&fixed, Some(data)).await)
    }

    /// Stage a payload for the next committing navigation. Read once, then
    /// cleared.
    pub fn stage_data(&self, data: Value) {
        *lock(&self.draft) = Some(data);
    }

    /// Payload attached to the currently active history entry.
    pub fn current_data(&self) -> Option<Value> {
        self.history.current_data()
    }

    /// Canonical route of the current view.
    pub fn current_route(&self) -> String {
        lock(&self.state).route.clone()
    }

    /// Wildcard captures of the current view.
    pub fn wildcards(&self) -> Vec<WildcardBinding> {
        lock(&self.state).wildcards.clone()
    }

    /// Subscribe to committing-navigation notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// The configuration the router was assembled with.
    #[inline]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// One full navigation cycle. `commit` carries the history payload for
    /// committing triggers and is `None` for mount-only triggers.
    async fn cycle(
        &self,
        path: &str,
        commit: Option<Option<Value>>,
    ) -> Result<NavigationOutcome, RouterError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Guarding. The sole cancellation point; nothing observable has
        // happened yet.
        trace!("[{generation}] {:?} `{path}`", Phase::Guarding);
        if !self.hooks.before_navigation().await {
            debug!("[{generation}] navigation to `{path}` blocked by guard");
            return Ok(NavigationOutcome::Blocked);
        }
        if self.superseded(generation) {
            return Ok(NavigationOutcome::Superseded);
        }

        if let Some(data) = commit {
            let payload = {
                let staged = lock(&self.draft).take();
                data.or(staged).unwrap_or(Value::Null)
            };
            self.history
                .push(path, payload)
                .map_err(RouterError::HistoryFailed)?;
            if self
                .events
                .send(RouterEvent {
                    path: path.to_owned(),
                })
                .is_err()
            {
                trace!("[{generation}] no event listeners");
            }
        }

        // Resolving.
        trace!("[{generation}] {:?} `{path}`", Phase::Resolving);
        let resolved = {
            let span = info_span!("resolve", path = %path);
            let _entered = span.enter();
            resolve(&self.tree, path)?
        };
        *lock(&self.state) = NavigationState {
            route: resolved.canonical.clone(),
            wildcards: resolved.bindings.clone(),
        };

        // Loading.
        trace!("[{generation}] {:?} `{}`", Phase::Loading, resolved.resource);
        let content = self.load(&resolved).await?;
        if self.superseded(generation) {
            return Ok(NavigationOutcome::Superseded);
        }

        // Only now that a replacement is in hand does the previous view's
        // script set go away; an aborted cycle leaves it fully intact.
        self.inject(content).map_err(RouterError::SurfaceFailed)?;

        // Rendered.
        trace!("[{generation}] {:?} `{}`", Phase::Rendered, resolved.canonical);
        self.hooks.after_navigation().await;
        if self.superseded(generation) {
            return Ok(NavigationOutcome::Superseded);
        }
        self.dom
            .activate_scripts(&self.config.script_marker_class)
            .map_err(RouterError::SurfaceFailed)?;

        debug!(
            "[{generation}] rendered `{}` ({})",
            resolved.canonical, resolved.resource
        );
        Ok(NavigationOutcome::Rendered)
    }

    /// Dispatch the resolved resource to the loader set.
    async fn load(&self, resolved: &ResolvedRoute) -> Result<RenderedContent, RouterError> {
        let cx = LoadContext {
            fetcher: &*self.fetcher,
            modules: self.modules.as_deref(),
            url: self.resource_url(&resolved.resource)?,
            resource: &resolved.resource,
        };
        self.loaders.dispatch(&cx).await
    }

    /// Swap the loaded content into the container.
    fn inject(&self, content: RenderedContent) -> Result<(), anyhow::Error> {
        self.dom.clear_scripts(&self.config.script_marker_class)?;
        match content {
            RenderedContent::Markup(markup) => self.dom.replace_markup(&markup),
            RenderedContent::Node(node) => {
                self.dom.replace_markup("")?;
                self.dom.append_nodes(std::slice::from_ref(&node))
            }
            RenderedContent::Nodes(nodes) => {
                self.dom.replace_markup("")?;
                self.dom.append_nodes(&nodes)
            }
        }
    }

    /// Form the full URL of a resource under the configured base folder.
    fn resource_url(&self, resource: &str) -> Result<Url, RouterError> {
        let relative = format!("{}{resource}", self.base_folder);
        self.config.base_url.join(&relative).map_err(|err| {
            RouterError::LoadFailed {
                resource: resource.to_owned(),
                source: anyhow::anyhow!("cannot form resource url from `{relative}`: {err}"),
            }
        })
    }

    /// Whether a newer cycle has started since `generation` was sampled.
    fn superseded(&self, generation: u64) -> bool {
        let newest = self.generation.load(Ordering::SeqCst);
        if newest == generation {
            return false;
        }
        warn!("[{generation}] superseded by navigation {newest}, leaving the view alone");
        true
    }

    /// Report a cycle failure through the debug-gated logging channel; the
    /// typed error still reaches the caller either way.
    fn report(
        &self,
        result: Result<NavigationOutcome, RouterError>,
    ) -> Result<NavigationOutcome, RouterError> {
        if self.config.debug
            && let Err(err) = &result
        {
            error!("navigation aborted: {err}");
        }
        result
    }
}

/// Lock a mutex, riding out poisoning: router state stays usable even if a
/// holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
