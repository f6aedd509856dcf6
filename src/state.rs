use url::Url;

use crate::registry::{Dataset, DetailFacts, LoadedIndex, Metadata, Preview, Schema};
use crate::router::{Route, RouteToken};

/// Load state of one detail panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Loading,
    Ready(T),
    Missing,
    Failed(String),
}

impl<T> Panel<T> {
    pub fn as_ref(&self) -> Panel<&T> {
        match self {
            Panel::Loading => Panel::Loading,
            Panel::Ready(v) => Panel::Ready(v),
            Panel::Missing => Panel::Missing,
            Panel::Failed(e) => Panel::Failed(e.clone()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }
}

/// Result of one artifact fetch, tagged by the caller with a route token.
#[derive(Debug, Clone)]
pub enum PanelUpdate {
    Metadata(Panel<Metadata>),
    Preview(Panel<Preview>),
    Schema(Panel<Schema>),
    Readme(Panel<String>),
}

#[derive(Debug, Clone)]
pub struct DetailState {
    pub dataset_id: String,
    pub facts: DetailFacts,
    pub metadata: Panel<Metadata>,
    meta_preview: Option<Preview>,
    /// `None` when the entry has no `preview_key`.
    pub preview_file: Option<Panel<Preview>>,
    /// `None` when the entry has no `schema_key`.
    pub schema_file: Option<Panel<Schema>>,
    pub readme: Panel<String>,
}

impl DetailState {
    pub fn new(ds: &Dataset) -> Self {
        let has_key = |k: &Option<String>| k.as_deref().is_some_and(|k| !k.trim().is_empty());
        Self {
            dataset_id: ds.id.clone(),
            facts: DetailFacts::from_entry(ds),
            metadata: Panel::Loading,
            meta_preview: None,
            preview_file: has_key(&ds.preview_key).then_some(Panel::Loading),
            schema_file: has_key(&ds.schema_key).then_some(Panel::Loading),
            readme: Panel::Loading,
        }
    }

    pub fn apply(&mut self, update: PanelUpdate) {
        match update {
            PanelUpdate::Metadata(panel) => {
                if let Panel::Ready(meta) = &panel {
                    self.facts.merge_metadata(meta);
                    self.meta_preview = meta.preview();
                }
                self.metadata = panel;
            }
            PanelUpdate::Preview(panel) => self.preview_file = Some(panel),
            PanelUpdate::Schema(panel) => self.schema_file = Some(panel),
            PanelUpdate::Readme(panel) => self.readme = panel,
        }
    }

    /// Metadata's embedded preview wins; then `preview_key`; otherwise the
    /// panel follows the metadata fetch.
    pub fn preview(&self) -> Panel<&Preview> {
        if let Some(p) = &self.meta_preview {
            return Panel::Ready(p);
        }
        if let Some(file) = &self.preview_file {
            // an unrelated metadata failure must not hide a good preview file
            return file.as_ref();
        }
        self.follow_metadata()
    }

    /// `schema_key` wins; otherwise the columns listed in metadata.
    pub fn schema(&self) -> Panel<Schema> {
        if let Some(file) = &self.schema_file {
            return match file {
                Panel::Ready(s) => Panel::Ready(s.clone()),
                Panel::Loading => Panel::Loading,
                Panel::Missing => Panel::Missing,
                Panel::Failed(e) => Panel::Failed(e.clone()),
            };
        }
        match &self.metadata {
            Panel::Ready(meta) => meta.schema().map_or(Panel::Missing, Panel::Ready),
            Panel::Loading => Panel::Loading,
            Panel::Missing => Panel::Missing,
            Panel::Failed(e) => Panel::Failed(e.clone()),
        }
    }

    fn follow_metadata(&self) -> Panel<&Preview> {
        match &self.metadata {
            Panel::Loading => Panel::Loading,
            Panel::Ready(_) | Panel::Missing => Panel::Missing,
            Panel::Failed(e) => Panel::Failed(e.clone()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.metadata.is_loading()
            && !self.readme.is_loading()
            && !self.preview_file.as_ref().is_some_and(Panel::is_loading)
            && !self.schema_file.as_ref().is_some_and(Panel::is_loading)
    }
}

/// Routes kept for `back`; the oldest are dropped beyond this.
pub const HISTORY_LIMIT: usize = 64;

/// Everything the browser knows, owned by the controller and passed to the
/// renderers by reference.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub index_url: Option<Url>,
    pub base_url: Option<Url>,
    pub generated_at: Option<String>,
    pub datasets: Vec<Dataset>,
    pub query: String,
    pub route: Route,
    pub token: RouteToken,
    pub detail: Option<DetailState>,
    history: Vec<Route>,
}

impl PageState {
    pub fn is_loaded(&self) -> bool {
        self.index_url.is_some()
    }

    /// Swaps in a freshly loaded index. Nothing from the previous index survives;
    /// the route is kept so an open detail view is re-resolved by the caller.
    pub fn replace_index(&mut self, loaded: LoadedIndex) {
        self.index_url = Some(loaded.url);
        self.base_url = Some(loaded.base);
        self.generated_at = loaded.index.generated_at;
        self.datasets = loaded.index.datasets;
        self.detail = None;
        self.token = self.token.next();
    }

    pub fn find(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    /// Switches route and invalidates any in-flight detail work.
    pub fn navigate(&mut self, route: Route) -> RouteToken {
        if route != self.route {
            let previous = std::mem::replace(&mut self.route, route);
            if self.history.len() == HISTORY_LIMIT {
                self.history.remove(0);
            }
            self.history.push(previous);
        }
        self.enter_route()
    }

    /// Returns to the previous route, if any.
    pub fn back(&mut self) -> Option<RouteToken> {
        let previous = self.history.pop()?;
        self.route = previous;
        Some(self.enter_route())
    }

    /// Rebuilds the detail slot for the current route under a new token.
    pub fn enter_route(&mut self) -> RouteToken {
        self.token = self.token.next();
        self.detail = match &self.route {
            Route::Detail(id) => self.find(id).map(DetailState::new),
            Route::List => None,
        };
        self.token
    }

    /// Applies a panel result. Returns false (and changes nothing) when the
    /// result belongs to an earlier navigation.
    pub fn apply(&mut self, token: RouteToken, update: PanelUpdate) -> bool {
        if token != self.token {
            return false;
        }
        match self.detail.as_mut() {
            Some(detail) => {
                detail.apply(update);
                true
            }
            None => false,
        }
    }
}
