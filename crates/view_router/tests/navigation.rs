//! Full navigation cycles against in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use route_engine::ResolveError;
use serde_json::{Value, json};
use tokio::sync::Notify;
use url::Url;
use view_router::config::RouterConfig;
use view_router::content::DomNode;
use view_router::controller::{NavRequest, NavigationOutcome, ViewRouter};
use view_router::dom::DomSurface;
use view_router::error::RouterError;
use view_router::fetch::ResourceFetcher;
use view_router::history::MemoryHistory;
use view_router::hooks::NavigationHooks;
use view_router::module::ModuleHost;

/// Every container mutation the router performed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SurfaceOp {
    Replace(String),
    Append(usize),
    Activate,
    ClearScripts,
}

#[derive(Default)]
struct RecordingSurface {
    ops: Mutex<Vec<SurfaceOp>>,
}

impl RecordingSurface {
    fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().unwrap().clone()
    }

    fn last_markup(&self) -> Option<String> {
        self.ops().into_iter().rev().find_map(|op| match op {
            SurfaceOp::Replace(markup) if !markup.is_empty() => Some(markup),
            _ => None,
        })
    }
}

impl DomSurface for RecordingSurface {
    fn replace_markup(&self, markup: &str) -> Result<(), Error> {
        self.ops
            .lock()
            .unwrap()
            .push(SurfaceOp::Replace(markup.to_owned()));
        Ok(())
    }

    fn append_nodes(&self, nodes: &[DomNode]) -> Result<(), Error> {
        self.ops.lock().unwrap().push(SurfaceOp::Append(nodes.len()));
        Ok(())
    }

    fn activate_scripts(&self, _marker_class: &str) -> Result<(), Error> {
        self.ops.lock().unwrap().push(SurfaceOp::Activate);
        Ok(())
    }

    fn clear_scripts(&self, _marker_class: &str) -> Result<(), Error> {
        self.ops.lock().unwrap().push(SurfaceOp::ClearScripts);
        Ok(())
    }
}

/// Serves canned text by URL path; optionally holds one path's response
/// until released.
struct GatedFetcher {
    responses: HashMap<String, String>,
    gated_path: Option<String>,
    release: Arc<Notify>,
}

impl GatedFetcher {
    fn serving(entries: &[(&str, &str)]) -> Self {
        Self {
            responses: entries
                .iter()
                .map(|(path, text)| ((*path).to_owned(), (*text).to_owned()))
                .collect(),
            gated_path: None,
            release: Arc::new(Notify::new()),
        }
    }

    fn gate(mut self, path: &str) -> (Self, Arc<Notify>) {
        self.gated_path = Some(path.to_owned());
        let release = Arc::clone(&self.release);
        (self, release)
    }
}

#[async_trait]
impl ResourceFetcher for GatedFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        if self.gated_path.as_deref() == Some(url.path()) {
            self.release.notified().await;
        }
        self.responses
            .get(url.path())
            .cloned()
            .ok_or_else(|| anyhow!("no such resource: {url}"))
    }
}

struct CountingHooks {
    allow: AtomicBool,
    after_calls: AtomicUsize,
}

impl CountingHooks {
    fn allowing() -> Self {
        Self {
            allow: AtomicBool::new(true),
            after_calls: AtomicUsize::new(0),
        }
    }

    fn deny(&self) {
        self.allow.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl NavigationHooks for CountingHooks {
    async fn before_navigation(&self) -> bool {
        self.allow.load(Ordering::SeqCst)
    }

    async fn after_navigation(&self) {
        self.after_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct NodesModule;

#[async_trait]
impl ModuleHost for NodesModule {
    async fn default_export(&self, _url: &Url) -> Result<view_router::ViewValue, Error> {
        Ok(view_router::ViewValue::Nodes(vec![
            DomNode::from_markup("<li>one</li>"),
            DomNode::from_markup("<li>two</li>"),
        ]))
    }
}

fn routes() -> Value {
    json!({
        "default": "home.html",
        "fallback": "404.html",
        "about": "about.html",
        "widget": "widget.js",
        "users": { ":id": "user.html" },
        "docs": { "guide": "guide.html" },
        "broken": "broken.html",
    })
}

fn config() -> RouterConfig {
    RouterConfig::new(routes(), Url::parse("http://app.local/").unwrap())
}

fn fetcher() -> GatedFetcher {
    GatedFetcher::serving(&[
        ("/home.html", "<h1>home</h1>"),
        ("/404.html", "<h1>missing</h1>"),
        ("/about.html", "<h1>about</h1>"),
        ("/user.html", "<h1>user</h1>"),
        ("/guide.html", "<h1>guide</h1>"),
    ])
}

struct Harness {
    router: Arc<ViewRouter>,
    surface: Arc<RecordingSurface>,
    history: Arc<MemoryHistory>,
    hooks: Arc<CountingHooks>,
}

fn harness() -> Harness {
    harness_with(fetcher())
}

fn harness_with(fetcher: GatedFetcher) -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let surface = Arc::new(RecordingSurface::default());
    let history = Arc::new(MemoryHistory::new());
    let hooks = Arc::new(CountingHooks::allowing());
    let router = ViewRouter::builder(config())
        .dom(Arc::clone(&surface))
        .fetcher(fetcher)
        .history(Arc::clone(&history))
        .hooks(HooksHandle(Arc::clone(&hooks)))
        .module_host(NodesModule)
        .build()
        .unwrap();
    Harness {
        router: Arc::new(router),
        surface,
        history,
        hooks,
    }
}

/// Hook delegation so the test keeps its own handle.
struct HooksHandle(Arc<CountingHooks>);

#[async_trait]
impl NavigationHooks for HooksHandle {
    async fn before_navigation(&self) -> bool {
        self.0.before_navigation().await
    }

    async fn after_navigation(&self) {
        self.0.after_navigation().await;
    }
}

#[tokio::test]
async fn start_renders_the_default_view_without_history() {
    let h = harness();
    let outcome = h.router.start("/").await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Rendered);
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>home</h1>"));
    assert_eq!(h.router.current_route(), "default");
    assert!(h.history.is_empty());
    assert_eq!(h.hooks.after_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigate_commits_history_and_notifies_listeners() {
    let h = harness();
    let mut events = h.router.subscribe();

    let outcome = h.router.navigate("about", None).await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Rendered);

    // Leading separator was added before the entry was written.
    assert_eq!(h.history.current_path().as_deref(), Some("/about"));
    assert_eq!(h.router.current_route(), "about");
    assert_eq!(events.try_recv().unwrap().path, "/about");
    // Notification only: exactly one render happened.
    assert_eq!(
        h.surface.ops(),
        vec![
            SurfaceOp::ClearScripts,
            SurfaceOp::Replace("<h1>about</h1>".to_owned()),
            SurfaceOp::Activate,
        ]
    );
}

#[tokio::test]
async fn wildcard_navigation_exposes_bindings_and_data() {
    let h = harness();
    h.router
        .navigate("/users/42", Some(json!({ "from": "test" })))
        .await
        .unwrap();
    assert_eq!(h.router.current_route(), "users/:id");
    let bindings = h.router.wildcards();
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].name, "id");
    assert_eq!(bindings[0].value, "42");
    assert_eq!(h.router.current_data(), Some(json!({ "from": "test" })));
}

#[tokio::test]
async fn blocked_navigation_has_no_side_effects() {
    let h = harness();
    h.router.start("/").await.unwrap();
    let ops_before = h.surface.ops();

    h.hooks.deny();
    let outcome = h.router.navigate("/about", None).await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Blocked);

    assert!(h.history.is_empty(), "guard must precede the history write");
    assert_eq!(h.surface.ops(), ops_before, "no container mutation");
    assert_eq!(h.router.current_route(), "default", "state untouched");
    assert_eq!(
        h.hooks.after_calls.load(Ordering::SeqCst),
        1,
        "post hook only for the initial render"
    );
}

#[tokio::test]
async fn invalid_paths_leave_everything_unchanged() {
    let h = harness();
    h.router.start("/").await.unwrap();
    let ops_before = h.surface.ops();

    let result = h.router.handle(NavRequest::PageEvent {
        path: "/no spaces allowed".to_owned(),
    });
    assert!(matches!(
        result.await,
        Err(RouterError::Resolution(ResolveError::InvalidPath { .. }))
    ));
    assert_eq!(h.surface.ops(), ops_before);
    assert_eq!(h.router.current_route(), "default");
    assert!(h.history.is_empty());
}

#[tokio::test]
async fn failed_resolution_keeps_the_previous_view() {
    let h = harness();
    h.router.start("/").await.unwrap();
    let ops_before = h.surface.ops();

    // `/docs` stops on a table, not a leaf.
    let result = h.router.handle(NavRequest::PageEvent {
        path: "/docs".to_owned(),
    });
    assert!(matches!(
        result.await,
        Err(RouterError::Resolution(ResolveError::IncompleteRoute { .. }))
    ));
    assert_eq!(h.surface.ops(), ops_before, "stale view left intact");
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>home</h1>"));
}

#[tokio::test]
async fn failed_load_keeps_scripts_of_the_previous_view() {
    let h = harness();
    h.router.start("/").await.unwrap();
    let ops_before = h.surface.ops();

    // Resolves fine, but the fetcher has no such file.
    let result = h.router.navigate("/broken", None).await;
    assert!(matches!(
        result,
        Err(RouterError::LoadFailed { resource, .. }) if resource == "broken.html"
    ));

    // Script cleanup runs only once a replacement is in hand.
    assert_eq!(h.surface.ops(), ops_before);
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>home</h1>"));
}

#[tokio::test]
async fn unmatched_paths_render_the_fallback_view() {
    let h = harness();
    h.router.navigate("/no-such-page", None).await.unwrap();
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>missing</h1>"));
    assert_eq!(h.router.current_route(), "no-such-page");
}

#[tokio::test]
async fn draft_data_is_consumed_exactly_once() {
    let h = harness();
    h.router.stage_data(json!({ "draft": true }));

    h.router.navigate("/about", None).await.unwrap();
    assert_eq!(h.router.current_data(), Some(json!({ "draft": true })));

    h.router.navigate("/users/7", None).await.unwrap();
    assert_eq!(h.router.current_data(), Some(Value::Null));
}

#[tokio::test]
async fn explicit_data_wins_and_still_clears_the_draft() {
    let h = harness();
    h.router.stage_data(json!("staged"));
    h.router
        .navigate("/about", Some(json!("explicit")))
        .await
        .unwrap();
    assert_eq!(h.router.current_data(), Some(json!("explicit")));

    h.router.navigate("/users/7", None).await.unwrap();
    assert_eq!(h.router.current_data(), Some(Value::Null));
}

#[tokio::test]
async fn history_pop_mounts_without_writing_history() {
    let h = harness();
    h.router.navigate("/about", None).await.unwrap();
    h.router.navigate("/users/42", None).await.unwrap();
    assert_eq!(h.history.len(), 2);

    // Host pops its stack, then notifies the router of the active path.
    let path = h.history.pop().unwrap();
    h.router.handle(NavRequest::HistoryPop { path }).await.unwrap();

    assert_eq!(h.history.len(), 1);
    assert_eq!(h.router.current_route(), "about");
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>about</h1>"));
}

#[tokio::test]
async fn script_views_append_module_nodes() {
    let h = harness();
    h.router.navigate("/widget", None).await.unwrap();
    let ops = h.surface.ops();
    assert_eq!(
        ops,
        vec![
            SurfaceOp::ClearScripts,
            SurfaceOp::Replace(String::new()),
            SurfaceOp::Append(2),
            SurfaceOp::Activate,
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_superseded_cycle_never_touches_the_container() {
    let (fetcher, release) = fetcher().gate("/about.html");
    let h = harness_with(fetcher);
    h.router.start("/").await.unwrap();
    let ops_after_start = h.surface.ops();

    let slow_router = Arc::clone(&h.router);
    let slow = tokio::spawn(async move { slow_router.navigate("/about", None).await });
    // Let the slow cycle sample its generation and park in the fetcher.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = h.router.navigate("/users/42", None).await.unwrap();
    assert_eq!(fast, NavigationOutcome::Rendered);

    release.notify_one();
    let slow_outcome = slow.await.unwrap().unwrap();
    assert_eq!(slow_outcome, NavigationOutcome::Superseded);

    // Exactly one render beyond the initial one, and it is the fast view.
    let ops = h.surface.ops();
    assert_eq!(ops.len(), ops_after_start.len() + 3);
    assert_eq!(h.surface.last_markup().as_deref(), Some("<h1>user</h1>"));
    assert_eq!(h.router.current_route(), "users/:id");
}

#[tokio::test]
async fn routers_are_independent_instances() {
    let first = harness();
    let second = harness();
    first.router.navigate("/about", None).await.unwrap();
    assert_eq!(second.router.current_route(), "");
    assert!(second.history.is_empty());
}

#[test]
fn missing_default_is_a_startup_misconfiguration() {
    let config = RouterConfig::new(
        json!({ "about": "about.html" }),
        Url::parse("http://app.local/").unwrap(),
    );
    let result = ViewRouter::builder(config)
        .dom(Arc::new(RecordingSurface::default()))
        .build();
    assert!(matches!(
        result,
        Err(RouterError::StartupMisconfiguration { reason }) if reason.contains("default")
    ));
}

#[test]
fn non_string_default_is_a_startup_misconfiguration() {
    let config = RouterConfig::new(
        json!({ "default": { "nested": "home.html" } }),
        Url::parse("http://app.local/").unwrap(),
    );
    let result = ViewRouter::builder(config)
        .dom(Arc::new(RecordingSurface::default()))
        .build();
    assert!(matches!(
        result,
        Err(RouterError::StartupMisconfiguration { reason }) if reason.contains("not a resource")
    ));
}

#[test]
fn malformed_route_declarations_fail_at_assembly() {
    let config = RouterConfig::new(
        json!({ "default": "home.html", "bad": ["x.html"] }),
        Url::parse("http://app.local/").unwrap(),
    );
    let result = ViewRouter::builder(config)
        .dom(Arc::new(RecordingSurface::default()))
        .build();
    assert!(matches!(result, Err(RouterError::Tree(_))));
}
