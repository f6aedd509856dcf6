use crate::i18n::{self, Language};
use crate::state::PageState;

use super::format::format_timestamp;
use super::style::Style;

const SEPARATOR: &str = " \u{2502} ";

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub brand: String,
    /// Preformatted parts, shown in order.
    pub parts: Vec<String>,
    pub loading: bool,
}

pub fn build(state: &PageState, locale: Language) -> StatusLine {
    let mut parts = Vec::new();
    match &state.index_url {
        Some(url) => parts.push(i18n::t(locale, "status_index", &[("url", url.as_str())])),
        None => parts.push(i18n::ts(locale, "status_not_loaded")),
    }
    if let Some(ts) = state.generated_at.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(i18n::t(locale, "status_generated", &[("date", &format_timestamp(ts))]));
    }
    let query = state.query.trim();
    if !query.is_empty() {
        parts.push(i18n::t(locale, "status_query", &[("query", query)]));
    }
    parts.push(state.route.to_fragment());

    StatusLine {
        brand: i18n::ts(locale, "brand_portal"),
        parts,
        loading: state.detail.as_ref().is_some_and(|d| !d.is_complete()),
    }
}

pub fn render_text(line: &StatusLine, style: Style) -> String {
    let mut out = style.accent(&style.strong(&line.brand));
    for part in &line.parts {
        out.push_str(&style.dim(SEPARATOR));
        out.push_str(&style.muted(part));
    }
    if line.loading {
        out.push_str(&style.dim(SEPARATOR));
        out.push_str(&style.dim("\u{2026}"));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CandidateOrigin, Dataset, Index, LoadedIndex};
    use crate::router::Route;
    use url::Url;

    #[test]
    fn test_not_loaded() {
        let line = build(&PageState::default(), Language::En);
        assert_eq!(line.parts, vec!["No index loaded.", "#/"]);
        assert!(!line.loading);
    }

    #[test]
    fn test_loaded_with_query_and_detail() {
        let mut state = PageState::default();
        state.replace_index(LoadedIndex {
            origin: CandidateOrigin::Default,
            url: Url::parse("file:///srv/reg/index.json").unwrap(),
            base: Url::parse("file:///srv/reg/").unwrap(),
            index: Index {
                generated_at: Some("2026-01-24T10:05:00Z".into()),
                datasets: vec![Dataset {
                    id: "a/b".into(),
                    ..Default::default()
                }],
            },
        });
        state.set_query("  rates ");
        state.navigate(Route::Detail("a/b".into()));

        let line = build(&state, Language::En);
        assert_eq!(
            line.parts,
            vec![
                "Index: file:///srv/reg/index.json",
                "generated 2026-01-24 10:05 UTC",
                "filter: \"rates\"",
                "#/d/a%2Fb",
            ]
        );
        assert!(line.loading);
        let text = render_text(&line, Style::plain());
        assert!(text.starts_with("OpenData \u{2502} Index: "));
    }
}
