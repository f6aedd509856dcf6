use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc;
use url::Url;

use crate::config::ConfigState;
use crate::i18n::Language;
use crate::registry::{
    self, artifact_urls, resolve_index, Candidate, CandidateFailure, Fetcher, Metadata, Preview,
    RegistryError, Schema,
};
use crate::router::{Route, RouteToken};
use crate::state::{PageState, Panel, PanelUpdate};
use crate::ui::{self, Page, ViewOptions};

/// A detail panel result coming back from a fetch task.
#[derive(Debug)]
pub struct PanelResponse {
    pub token: RouteToken,
    pub update: PanelUpdate,
}

/// Owns the page state and the fetcher. All state changes happen here, on the
/// runtime thread; fetch tasks only send [`PanelResponse`]s back.
pub struct Controller {
    state: PageState,
    config: ConfigState,
    fetcher: Arc<Fetcher>,
    locale: Language,
    cwd: PathBuf,
    panel_tx: mpsc::UnboundedSender<PanelResponse>,
    panel_rx: mpsc::UnboundedReceiver<PanelResponse>,
    stale_discarded: u64,
}

impl Controller {
    pub fn new(config: ConfigState, cwd: PathBuf) -> registry::error::Result<Self> {
        let fetcher = Fetcher::new(config.config.request_timeout())?;
        let locale = Language::from_setting(&config.config.locale);
        let (panel_tx, panel_rx) = mpsc::unbounded_channel();
        Ok(Self {
            state: PageState::default(),
            config,
            fetcher: Arc::new(fetcher),
            locale,
            cwd,
            panel_tx,
            panel_rx,
            stale_discarded: 0,
        })
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn locale(&self) -> Language {
        self.locale
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            locale: self.locale,
            preview_rows: self.config.config.preview_rows,
        }
    }

    pub fn page(&self) -> Page {
        ui::build_page(&self.state, self.view_options())
    }

    /// Resolution order: argument, environment, stored preference, default.
    pub fn candidates(&self, argument: Option<&str>, environment: Option<&str>) -> Vec<Candidate> {
        registry::candidates(
            argument,
            environment,
            self.config.config.last_index_url.as_deref(),
        )
    }

    /// Loads the first index that resolves and stores its URL. On failure the
    /// current state is left untouched.
    pub async fn load(&mut self, candidates: &[Candidate]) -> Result<(), Vec<CandidateFailure>> {
        let loaded = resolve_index(&self.fetcher, candidates, &self.cwd).await?;
        let url = loaded.url.to_string();
        self.state.replace_index(loaded);
        self.config.remember_index(&url);
        self.state.enter_route();
        self.spawn_detail_fetches();
        Ok(())
    }

    /// Reloads from `location`, or from the current index URL when `None`.
    pub async fn reload(&mut self, location: Option<&str>) -> Result<(), Vec<CandidateFailure>> {
        let location = match location.map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => l.to_string(),
            None => match &self.state.index_url {
                Some(url) => url.to_string(),
                None => {
                    let candidates = self.candidates(None, None);
                    return self.load(&candidates).await;
                }
            },
        };
        let candidate = Candidate {
            origin: registry::CandidateOrigin::Argument,
            location,
        };
        self.load(&[candidate]).await
    }

    pub fn set_query(&mut self, query: &str) {
        self.state.set_query(query);
    }

    pub fn navigate(&mut self, route: Route) {
        let token = self.state.navigate(route);
        debug!("navigate to {} (token {})", self.state.route, token.0);
        self.spawn_detail_fetches();
    }

    pub fn back(&mut self) -> bool {
        if self.state.back().is_none() {
            return false;
        }
        self.spawn_detail_fetches();
        true
    }

    /// Starts one task per detail panel for the current route. Each task tags
    /// its result with the token it was started under.
    fn spawn_detail_fetches(&mut self) {
        let Some(detail) = &self.state.detail else {
            return;
        };
        let token = self.state.token;
        let (Some(base), Some(ds)) = (&self.state.base_url, self.state.find(&detail.dataset_id)) else {
            return;
        };
        let wants_preview = detail.preview_file.is_some();
        let wants_schema = detail.schema_file.is_some();

        let urls = match artifact_urls(base, ds) {
            Ok(urls) => urls,
            Err(e) => {
                warn!("cannot build artifact urls for {}: {}", ds.id, e);
                let reason = e.to_string();
                let mut failed = vec![
                    PanelUpdate::Metadata(Panel::Failed(reason.clone())),
                    PanelUpdate::Readme(Panel::Failed(reason.clone())),
                ];
                if wants_preview {
                    failed.push(PanelUpdate::Preview(Panel::Failed(reason.clone())));
                }
                if wants_schema {
                    failed.push(PanelUpdate::Schema(Panel::Failed(reason)));
                }
                for update in failed {
                    self.state.apply(token, update);
                }
                return;
            }
        };

        self.spawn_panel(token, urls.metadata, |f, url| async move {
            PanelUpdate::Metadata(fetch_metadata(&f, &url).await)
        });
        self.spawn_panel(token, urls.readme, |f, url| async move {
            PanelUpdate::Readme(fetch_readme(&f, &url).await)
        });
        if let Some(url) = urls.preview {
            self.spawn_panel(token, url, |f, url| async move {
                PanelUpdate::Preview(fetch_preview(&f, &url).await)
            });
        }
        if let Some(url) = urls.schema {
            self.spawn_panel(token, url, |f, url| async move {
                PanelUpdate::Schema(fetch_schema(&f, &url).await)
            });
        }
    }

    fn spawn_panel<F, Fut>(&self, token: RouteToken, url: Url, fetch: F)
    where
        F: FnOnce(Arc<Fetcher>, Url) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = PanelUpdate> + Send + 'static,
    {
        let fetcher = self.fetcher.clone();
        let tx = self.panel_tx.clone();
        tokio::spawn(async move {
            let update = fetch(fetcher, url).await;
            let _ = tx.send(PanelResponse { token, update });
        });
    }

    /// Applies one panel result. Results from earlier navigations are dropped.
    pub fn apply(&mut self, response: PanelResponse) -> bool {
        let applied = self.state.apply(response.token, response.update);
        if !applied {
            self.stale_discarded += 1;
            debug!(
                "discarded stale panel result (token {}, current {})",
                response.token.0, self.state.token.0
            );
        }
        applied
    }

    /// Waits for the next panel result.
    pub async fn next_response(&mut self) -> Option<PanelResponse> {
        self.panel_rx.recv().await
    }

    /// True while the current detail view still has panels in flight.
    pub fn detail_pending(&self) -> bool {
        self.state.detail.as_ref().is_some_and(|d| !d.is_complete())
    }

    /// Applies results until every panel of the current detail view is settled.
    pub async fn settle(&mut self) {
        while self.detail_pending() {
            match self.next_response().await {
                Some(response) => {
                    self.apply(response);
                }
                None => break,
            }
        }
    }
}

fn degrade<T>(what: &str, url: &Url, err: RegistryError) -> Panel<T> {
    if err.is_not_found() {
        debug!("{} not found at {}", what, url);
        Panel::Missing
    } else {
        warn!("{} unavailable ({}): {}", what, url, err);
        Panel::Failed(err.to_string())
    }
}

pub async fn fetch_metadata(fetcher: &Fetcher, url: &Url) -> Panel<Metadata> {
    match fetcher.get_json(url).await {
        Ok(value) => Panel::Ready(Metadata::from_value(value)),
        Err(e) => degrade("metadata", url, e),
    }
}

pub async fn fetch_preview(fetcher: &Fetcher, url: &Url) -> Panel<Preview> {
    match fetcher.get_json(url).await {
        Ok(value) => match Preview::from_value(&value) {
            Some(p) => Panel::Ready(p),
            None => {
                warn!("preview at {} has no columns", url);
                Panel::Missing
            }
        },
        Err(e) => degrade("preview", url, e),
    }
}

pub async fn fetch_schema(fetcher: &Fetcher, url: &Url) -> Panel<Schema> {
    match fetcher.get_json(url).await {
        Ok(value) => match Schema::from_value(&value) {
            Some(s) => Panel::Ready(s),
            None => {
                warn!("schema at {} has no columns", url);
                Panel::Missing
            }
        },
        Err(e) => degrade("schema", url, e),
    }
}

pub async fn fetch_readme(fetcher: &Fetcher, url: &Url) -> Panel<String> {
    match fetcher.get_text(url).await {
        Ok(text) => Panel::Ready(text),
        Err(e) => degrade("readme", url, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::CandidateOrigin;
    use crate::ui::View;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn controller(dir: &tempfile::TempDir) -> Controller {
        let config = ConfigState {
            config: Config {
                locale: "en".into(),
                ..Default::default()
            },
            path: dir.path().join("config.json"),
        };
        Controller::new(config, dir.path().to_path_buf()).unwrap()
    }

    fn index_body(ids: &[&str]) -> serde_json::Value {
        json!({
            "generated_at": "2026-01-24T10:00:00Z",
            "datasets": ids.iter().map(|id| json!({"id": id, "title": format!("{} title", id)})).collect::<Vec<_>>()
        })
    }

    async fn mount_json(server: &MockServer, p: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn arg(location: String) -> Vec<Candidate> {
        vec![Candidate {
            origin: CandidateOrigin::Argument,
            location,
        }]
    }

    #[tokio::test]
    async fn test_load_renders_every_dataset_and_stores_url() {
        let server = MockServer::start().await;
        mount_json(&server, "/reg/index.json", index_body(&["a/one", "a/two", "b/three"])).await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);

        let url = format!("{}/reg/index.json", server.uri());
        c.load(&arg(url.clone())).await.unwrap();

        let View::List(list) = c.page().body else {
            panic!("expected list view");
        };
        assert_eq!(list.rows.len(), 3);
        assert_eq!(c.config().config.last_index_url.as_deref(), Some(url.as_str()));
        assert!(dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_stored_preference_used_after_argument_and_env() {
        let server = MockServer::start().await;
        mount_json(&server, "/pref/index.json", index_body(&["p/one"])).await;
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigState {
            config: Config {
                locale: "en".into(),
                last_index_url: Some(format!("{}/pref/index.json", server.uri())),
                ..Default::default()
            },
            path: dir.path().join("config.json"),
        };
        let mut c = Controller::new(config, dir.path().to_path_buf()).unwrap();

        let bad_arg = format!("{}/missing/index.json", server.uri());
        let candidates = c.candidates(Some(&bad_arg), None);
        assert_eq!(candidates[0].origin, CandidateOrigin::Argument);
        assert_eq!(candidates[1].origin, CandidateOrigin::Preference);

        c.load(&candidates).await.unwrap();
        assert!(c.state().find("p/one").is_some());
    }

    #[tokio::test]
    async fn test_reload_replaces_list() {
        let server = MockServer::start().await;
        mount_json(&server, "/a/index.json", index_body(&["a/one", "a/two"])).await;
        mount_json(&server, "/b/index.json", index_body(&["b/only"])).await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);

        c.load(&arg(format!("{}/a/index.json", server.uri()))).await.unwrap();
        c.reload(Some(&format!("{}/b/index.json", server.uri()))).await.unwrap();

        let View::List(list) = c.page().body else {
            panic!("expected list view");
        };
        let ids: Vec<_> = list.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b/only"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_current_index() {
        let server = MockServer::start().await;
        mount_json(&server, "/a/index.json", index_body(&["a/one"])).await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);

        c.load(&arg(format!("{}/a/index.json", server.uri()))).await.unwrap();
        let failures = c
            .reload(Some(&format!("{}/gone/index.json", server.uri())))
            .await
            .unwrap_err();
        assert_eq!(failures.len(), 1);
        assert!(c.state().find("a/one").is_some());
    }

    #[tokio::test]
    async fn test_detail_panels_load_concurrently() {
        let server = MockServer::start().await;
        mount_json(&server, "/index.json", index_body(&["official/quakes"])).await;
        mount_json(
            &server,
            "/datasets/official/quakes/metadata.json",
            json!({
                "format": "parquet",
                "columns": [{"name": "mag", "type": "double"}],
                "preview": {"columns": ["mag"], "rows": [{"mag": 4.2}]}
            }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/datasets/official/quakes/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Quakes"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);
        c.load(&arg(format!("{}/index.json", server.uri()))).await.unwrap();
        c.navigate(Route::parse("#/d/official%2Fquakes"));
        c.settle().await;

        let View::Detail(detail) = c.page().body else {
            panic!("expected detail view");
        };
        assert_eq!(detail.title.as_deref(), Some("official/quakes title"));
        assert!(matches!(detail.preview, ui::detail_panel::Section::Content(_)));
        assert!(matches!(detail.schema, ui::detail_panel::Section::Content(_)));
        assert_eq!(
            detail.readme,
            ui::detail_panel::Section::Content("# Quakes".into())
        );
    }

    #[tokio::test]
    async fn test_metadata_failure_is_local() {
        let server = MockServer::start().await;
        mount_json(&server, "/index.json", index_body(&["a/broken", "a/fine"])).await;
        Mock::given(method("GET"))
            .and(path("/datasets/a/broken/metadata.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_json(&server, "/datasets/a/fine/metadata.json", json!({"format": "parquet"})).await;

        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);
        c.load(&arg(format!("{}/index.json", server.uri()))).await.unwrap();

        c.navigate(Route::Detail("a/broken".into()));
        c.settle().await;
        let View::Detail(broken) = c.page().body else {
            panic!("expected detail view");
        };
        assert_eq!(broken.preview, ui::detail_panel::Section::Message("Failed.".into()));
        assert_eq!(
            broken.readme,
            ui::detail_panel::Section::Message("Not available.".into())
        );

        c.navigate(Route::List);
        assert!(matches!(c.page().body, View::List(_)));

        c.navigate(Route::Detail("a/fine".into()));
        c.settle().await;
        let View::Detail(fine) = c.page().body else {
            panic!("expected detail view");
        };
        assert!(fine.facts.contains(&("format".to_string(), "parquet".to_string())));
        assert_eq!(fine.preview, ui::detail_panel::Section::Message("No preview.".into()));
    }

    #[tokio::test]
    async fn test_results_from_previous_route_are_discarded() {
        let server = MockServer::start().await;
        mount_json(&server, "/index.json", index_body(&["a/slow", "a/fast"])).await;
        Mock::given(method("GET"))
            .and(path("/datasets/a/slow/metadata.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"format": "slow-format"}))
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        mount_json(&server, "/datasets/a/fast/metadata.json", json!({"format": "csv"})).await;

        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);
        c.load(&arg(format!("{}/index.json", server.uri()))).await.unwrap();

        c.navigate(Route::Detail("a/slow".into()));
        c.navigate(Route::Detail("a/fast".into()));
        c.settle().await;

        // both of the slow dataset's results arrive late and are dropped
        while c.stale_discarded() < 2 {
            let response = c.next_response().await.unwrap();
            assert!(!c.apply(response));
        }

        let detail = c.state().detail.as_ref().unwrap();
        assert_eq!(detail.dataset_id, "a/fast");
        assert_eq!(detail.facts.format.as_deref(), Some("csv"));
    }

    #[tokio::test]
    async fn test_unknown_id_renders_not_found() {
        let server = MockServer::start().await;
        mount_json(&server, "/index.json", index_body(&["a/one"])).await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(&dir);
        c.load(&arg(format!("{}/index.json", server.uri()))).await.unwrap();

        c.navigate(Route::Detail("a/nope".into()));
        c.settle().await;
        assert!(matches!(c.page().body, View::NotFound { .. }));
    }
}
