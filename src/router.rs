//! Hash-addressed page router.
//!
//! Each route pairs a template fragment with a [`PageController`]. Loading a
//! page swaps the fetched fragment into the [`Viewport`] and runs the
//! controller's `init` right after the swap.

use crate::pages::PageContext;
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
    path::PathBuf,
};
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};

pub const HOME_ROUTE: &str = "dashboard";
pub const NOT_FOUND_PLACEHOLDER: &str =
    r#"<div class="placeholder">Page not found</div>"#;

pub trait PageController: Send + Sync {
    /// Receives the freshly swapped markup and returns the rendered page.
    fn init(&self, ctx: &mut PageContext<'_>, html: String) -> String;

    fn cleanup(&self, _ctx: &mut PageContext<'_>) {}
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),
    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

pub trait TemplateSource: Send + Sync {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, TemplateError>> + Send;
}

/// Templates read from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsTemplates {
    root: PathBuf,
}

impl FsTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for FsTemplates {
    async fn fetch(&self, path: &str) -> Result<String, TemplateError> {
        match fs::read_to_string(self.root.join(path)).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(TemplateError::NotFound(path.to_string()))
            }
            Err(source) => Err(TemplateError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    templates: HashMap<String, String>,
}

impl MemoryTemplates {
    pub fn with(mut self, path: &str, html: &str) -> Self {
        self.templates.insert(path.to_string(), html.to_string());
        self
    }
}

impl TemplateSource for MemoryTemplates {
    async fn fetch(&self, path: &str) -> Result<String, TemplateError> {
        self.templates
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(path.to_string()))
    }
}

/// Where the page is being served from. A local-file origin cannot fetch
/// templates, so failed loads fall back to the standalone `<route>.html` pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Network,
    LocalFile,
}

pub struct Route {
    pub name: String,
    pub title: String,
    pub template: String,
    pub controller: Box<dyn PageController>,
}

/// The content region plus the document chrome the router keeps in sync.
/// The browser owns the history stack; a render only reports the URL to push.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    pub content: String,
    pub document_title: String,
    pub page_heading: String,
    pub active_nav: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Rendered {
        page: String,
        history_url: Option<String>,
    },
    Unchanged,
    Ignored,
    Placeholder,
    Redirect(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("route {0} registered after navigation started")]
    Sealed(String),
    #[error("route {0} is already registered")]
    Duplicate(String),
}

pub struct PageRouter<T> {
    routes: BTreeMap<String, Route>,
    templates: T,
    origin: Origin,
    current: Option<String>,
    sealed: bool,
    viewport: Viewport,
}

pub fn history_url(page: &str) -> String {
    if page == HOME_ROUTE {
        "#".to_string()
    } else {
        format!("#{page}")
    }
}

pub fn page_heading(page: &str) -> &'static str {
    match page {
        "visits" => "Visits",
        "appointments" => "Appointments",
        "settings" => "Settings",
        _ => "Dashboard",
    }
}

/// Route name for a history pop: the state payload, then the fragment, then home.
pub fn resolve_pop_target(state: Option<&str>, fragment: Option<&str>) -> String {
    state
        .filter(|page| !page.is_empty())
        .or_else(|| {
            fragment
                .map(|hash| hash.trim_start_matches('#'))
                .filter(|page| !page.is_empty())
        })
        .unwrap_or(HOME_ROUTE)
        .to_string()
}

impl<T: TemplateSource> PageRouter<T> {
    pub fn new(templates: T, origin: Origin) -> Self {
        Self {
            routes: BTreeMap::new(),
            templates,
            origin,
            current: None,
            sealed: false,
            viewport: Viewport::default(),
        }
    }

    pub fn register_route(&mut self, route: Route) -> Result<(), RouterError> {
        if self.sealed {
            warn!(route = %route.name, "ignoring route registered after startup");
            return Err(RouterError::Sealed(route.name));
        }
        if self.routes.contains_key(&route.name) {
            return Err(RouterError::Duplicate(route.name));
        }
        self.routes.insert(route.name.clone(), route);
        Ok(())
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub async fn navigate_to(
        &mut self,
        page: &str,
        push_history: bool,
        ctx: &mut PageContext<'_>,
    ) -> Navigation {
        if self.current.as_deref() == Some(page) {
            return Navigation::Unchanged;
        }
        self.load_page(page, push_history, ctx).await
    }

    /// Browser back/forward; never pushes a history entry.
    pub async fn pop_state(
        &mut self,
        state: Option<&str>,
        fragment: Option<&str>,
        ctx: &mut PageContext<'_>,
    ) -> Navigation {
        let page = resolve_pop_target(state, fragment);
        self.load_page(&page, false, ctx).await
    }

    /// Re-renders the active page after its selections changed. The page
    /// keeps its state, so no cleanup runs.
    pub async fn reload(&mut self, ctx: &mut PageContext<'_>) -> Navigation {
        match self.current.clone() {
            Some(page) => self.render(&page, false, false, ctx).await,
            None => Navigation::Ignored,
        }
    }

    pub async fn load_page(
        &mut self,
        page: &str,
        push_history: bool,
        ctx: &mut PageContext<'_>,
    ) -> Navigation {
        self.render(page, push_history, true, ctx).await
    }

    async fn render(
        &mut self,
        page: &str,
        push_history: bool,
        leave_current: bool,
        ctx: &mut PageContext<'_>,
    ) -> Navigation {
        self.sealed = true;
        let Some(route) = self.routes.get(page) else {
            error!("route not found: {page}");
            return Navigation::Ignored;
        };

        if leave_current {
            if let Some(previous) = self.current.as_deref().and_then(|name| self.routes.get(name)) {
                previous.controller.cleanup(ctx);
            }
        }

        let html = match self.templates.fetch(&route.template).await {
            Ok(html) => html,
            Err(err) => {
                error!("failed to load template for {page}: {err}");
                return match self.origin {
                    Origin::LocalFile => Navigation::Redirect(format!("{page}.html")),
                    Origin::Network => {
                        self.viewport.content = NOT_FOUND_PLACEHOLDER.to_string();
                        Navigation::Placeholder
                    }
                };
            }
        };

        self.viewport.document_title = route.title.clone();
        self.viewport.page_heading = page_heading(page).to_string();
        self.viewport.active_nav = Some(page.to_string());
        let pushed = push_history.then(|| history_url(page));
        self.current = Some(page.to_string());

        self.viewport.content = route.controller.init(ctx, html);
        info!(page, "page loaded");

        Navigation::Rendered {
            page: page.to_string(),
            history_url: pushed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::DemoState;
    use crate::storage::KvStore;
    use chrono::NaiveDate;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Default)]
    struct Counting {
        inits: Arc<AtomicUsize>,
        cleanups: Arc<AtomicUsize>,
    }

    impl PageController for Counting {
        fn init(&self, _ctx: &mut PageContext<'_>, html: String) -> String {
            self.inits.fetch_add(1, Ordering::SeqCst);
            format!("{html}<!-- ready -->")
        }

        fn cleanup(&self, _ctx: &mut PageContext<'_>) {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn route(name: &str, template: &str, controller: Counting) -> Route {
        Route {
            name: name.to_string(),
            title: format!("Helix EMR — {name}"),
            template: template.to_string(),
            controller: Box::new(controller),
        }
    }

    fn templates() -> MemoryTemplates {
        MemoryTemplates::default()
            .with("dashboard.html", "<h2>Dashboard</h2>")
            .with("visits.html", "<h2>Visits</h2>")
    }

    fn router(origin: Origin) -> (PageRouter<MemoryTemplates>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let dashboard = Counting::default();
        let inits = Arc::clone(&dashboard.inits);
        let cleanups = Arc::clone(&dashboard.cleanups);
        let mut router = PageRouter::new(templates(), origin);
        router.register_route(route("dashboard", "dashboard.html", dashboard)).unwrap();
        router
            .register_route(route("visits", "visits.html", Counting::default()))
            .unwrap();
        router
            .register_route(route("settings", "settings.html", Counting::default()))
            .unwrap();
        (router, inits, cleanups)
    }

    fn context<'a>(store: &'a mut KvStore, demo: &'a mut DemoState) -> PageContext<'a> {
        PageContext {
            store,
            demo,
            today: NaiveDate::from_ymd_opt(2025, 9, 16).unwrap(),
        }
    }

    #[tokio::test]
    async fn load_swaps_content_and_runs_init() {
        let (mut router, inits, _) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        let nav = router.navigate_to("visits", true, &mut ctx).await;
        assert_eq!(
            nav,
            Navigation::Rendered {
                page: "visits".to_string(),
                history_url: Some("#visits".to_string()),
            }
        );
        let view = router.viewport();
        assert_eq!(view.content, "<h2>Visits</h2><!-- ready -->");
        assert_eq!(view.document_title, "Helix EMR — visits");
        assert_eq!(view.page_heading, "Visits");
        assert_eq!(view.active_nav.as_deref(), Some("visits"));
        assert_eq!(router.current(), Some("visits"));
        assert_eq!(inits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn same_route_is_short_circuited() {
        let (mut router, inits, _) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        router.navigate_to("dashboard", false, &mut ctx).await;
        let nav = router.navigate_to("dashboard", true, &mut ctx).await;
        assert_eq!(nav, Navigation::Unchanged);
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_route_keeps_current_page() {
        let (mut router, _, cleanups) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        router.navigate_to("dashboard", false, &mut ctx).await;
        let before = router.viewport().content.clone();
        let nav = router.navigate_to("billing", true, &mut ctx).await;
        assert_eq!(nav, Navigation::Ignored);
        assert_eq!(router.current(), Some("dashboard"));
        assert_eq!(router.viewport().content, before);
        assert_eq!(cleanups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn leaving_a_route_runs_its_cleanup() {
        let (mut router, _, cleanups) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        router.navigate_to("dashboard", false, &mut ctx).await;
        router.navigate_to("visits", false, &mut ctx).await;
        assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_template_renders_placeholder_over_network() {
        let (mut router, _, _) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        router.navigate_to("dashboard", false, &mut ctx).await;
        let nav = router.navigate_to("settings", true, &mut ctx).await;
        assert_eq!(nav, Navigation::Placeholder);
        assert_eq!(router.viewport().content, NOT_FOUND_PLACEHOLDER);
        assert_eq!(router.current(), Some("dashboard"));
    }

    #[tokio::test]
    async fn missing_template_redirects_from_local_file() {
        let (mut router, _, _) = router(Origin::LocalFile);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        let nav = router.navigate_to("settings", true, &mut ctx).await;
        assert_eq!(nav, Navigation::Redirect("settings.html".to_string()));
        assert!(router.viewport().content.is_empty());
    }

    #[tokio::test]
    async fn pop_state_prefers_state_then_fragment_then_home() {
        assert_eq!(resolve_pop_target(Some("visits"), Some("#settings")), "visits");
        assert_eq!(resolve_pop_target(None, Some("#settings")), "settings");
        assert_eq!(resolve_pop_target(None, Some("#")), HOME_ROUTE);
        assert_eq!(resolve_pop_target(None, None), HOME_ROUTE);

        let (mut router, _, _) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);
        router.navigate_to("visits", true, &mut ctx).await;
        let nav = router.pop_state(None, Some(""), &mut ctx).await;
        assert_eq!(
            nav,
            Navigation::Rendered {
                page: "dashboard".to_string(),
                history_url: None,
            }
        );
    }

    #[tokio::test]
    async fn repeated_pushes_report_urls_without_keeping_them() {
        let (mut router, _, _) = router(Origin::Network);
        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);

        for _ in 0..500 {
            let nav = router.navigate_to("visits", true, &mut ctx).await;
            assert_eq!(
                nav,
                Navigation::Rendered {
                    page: "visits".to_string(),
                    history_url: Some("#visits".to_string()),
                }
            );
            let nav = router.navigate_to("dashboard", true, &mut ctx).await;
            assert_eq!(
                nav,
                Navigation::Rendered {
                    page: "dashboard".to_string(),
                    history_url: Some("#".to_string()),
                }
            );
        }

        let view = router.viewport();
        assert_eq!(view.content, "<h2>Dashboard</h2><!-- ready -->");
        assert_eq!(view.active_nav.as_deref(), Some("dashboard"));
    }

    #[tokio::test]
    async fn registration_closes_after_first_navigation() {
        let (mut router, _, _) = router(Origin::Network);
        assert_eq!(
            router.register_route(route("visits", "visits.html", Counting::default())),
            Err(RouterError::Duplicate("visits".to_string()))
        );

        let (mut store, mut demo) = (KvStore::default(), DemoState::default());
        let mut ctx = context(&mut store, &mut demo);
        router.navigate_to("dashboard", false, &mut ctx).await;
        assert_eq!(
            router.register_route(route("patient", "patient.html", Counting::default())),
            Err(RouterError::Sealed("patient".to_string()))
        );
    }

    #[test]
    fn home_route_maps_to_bare_fragment() {
        assert_eq!(history_url("dashboard"), "#");
        assert_eq!(history_url("appointments"), "#appointments");
        assert_eq!(page_heading("patient"), "Dashboard");
    }
}
