pub mod detail_panel;
pub mod format;
pub mod html;
pub mod results_list;
pub mod status_bar;
pub mod style;

use crate::i18n::{self, Language};
use crate::router::Route;
use crate::state::PageState;

use self::detail_panel::DetailView;
use self::results_list::ListView;
use self::status_bar::StatusLine;
use self::style::Style;

pub use self::html::{render_html, LinkMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub locale: Language,
    pub preview_rows: usize,
}

/// Everything that is drawn for one state of the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Language code of the labels, for the HTML `lang` attribute.
    pub lang: &'static str,
    pub status: StatusLine,
    pub body: View,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    NotLoaded { message: String },
    List(ListView),
    Detail(Box<DetailView>),
    NotFound { id: String, message: String },
}

pub fn build_page(state: &PageState, opts: ViewOptions) -> Page {
    let status = status_bar::build(state, opts.locale);
    let body = if !state.is_loaded() {
        View::NotLoaded {
            message: i18n::ts(opts.locale, "status_not_loaded"),
        }
    } else {
        match &state.route {
            Route::List => View::List(results_list::build(state, opts.locale)),
            Route::Detail(id) => match (state.find(id), state.detail.as_ref()) {
                (Some(ds), Some(detail)) => View::Detail(Box::new(detail_panel::build(
                    state,
                    ds,
                    detail,
                    opts.locale,
                    opts.preview_rows,
                ))),
                _ => View::NotFound {
                    id: id.clone(),
                    message: i18n::t(opts.locale, "detail_not_found", &[("id", id)]),
                },
            },
        }
    };
    Page {
        lang: opts.locale.code(),
        status,
        body,
    }
}

/// Renders the body only; the status line is drawn separately by the caller.
pub fn render_body_text(page: &Page, style: Style) -> String {
    match &page.body {
        View::NotLoaded { message } => format!("{}\n", style.muted(message)),
        View::List(list) => results_list::render_text(list, style),
        View::Detail(detail) => detail_panel::render_text(detail, style),
        View::NotFound { message, .. } => format!("{}\n", style.danger(message)),
    }
}

pub fn render_text(page: &Page, style: Style) -> String {
    let mut out = status_bar::render_text(&page.status, style);
    out.push('\n');
    out.push_str(&render_body_text(page, style));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CandidateOrigin, Dataset, Index, LoadedIndex};
    use url::Url;

    const OPTS: ViewOptions = ViewOptions {
        locale: Language::En,
        preview_rows: 20,
    };

    fn loaded_state() -> PageState {
        let mut state = PageState::default();
        state.replace_index(LoadedIndex {
            origin: CandidateOrigin::Argument,
            url: Url::parse("https://h/index.json").unwrap(),
            base: Url::parse("https://h/").unwrap(),
            index: Index {
                generated_at: None,
                datasets: vec![Dataset {
                    id: "a/b".into(),
                    ..Default::default()
                }],
            },
        });
        state
    }

    #[test]
    fn test_not_loaded_page() {
        let page = build_page(&PageState::default(), OPTS);
        assert!(matches!(page.body, View::NotLoaded { .. }));
    }

    #[test]
    fn test_unknown_id_is_not_found_view() {
        let mut state = loaded_state();
        state.navigate(Route::Detail("a/zzz".into()));
        let page = build_page(&state, OPTS);
        assert_eq!(
            page.body,
            View::NotFound {
                id: "a/zzz".into(),
                message: "Dataset \"a/zzz\" not found.".into(),
            }
        );
        assert_eq!(
            render_body_text(&page, Style::plain()),
            "Dataset \"a/zzz\" not found.\n"
        );
    }

    #[test]
    fn test_route_selects_view() {
        let mut state = loaded_state();
        assert!(matches!(build_page(&state, OPTS).body, View::List(_)));
        state.navigate(Route::Detail("a/b".into()));
        assert!(matches!(build_page(&state, OPTS).body, View::Detail(_)));
        state.navigate(Route::parse("#/d/"));
        assert!(matches!(build_page(&state, OPTS).body, View::List(_)));
    }
}
