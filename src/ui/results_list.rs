use crate::i18n::{self, Language};
use crate::registry::{filter_datasets, Dataset};
use crate::router::detail_href;
use crate::state::PageState;

use super::format::{format_bytes, format_count, format_date, pad, truncate};
use super::style::Style;

const MAX_ID_WIDTH: usize = 60;
const COLUMN_GAP: &str = "  ";

/// One formatted row of the dataset table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetListItem {
    pub id: String,
    pub href: String,
    pub title: String,
    pub rows: String,
    pub size: String,
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub headers: [String; 4],
    pub rows: Vec<DatasetListItem>,
    pub summary: String,
    /// Set instead of rows when there is nothing to show.
    pub empty_message: Option<String>,
}

pub fn list_item(ds: &Dataset) -> DatasetListItem {
    DatasetListItem {
        id: ds.id.clone(),
        href: detail_href(&ds.id),
        title: ds.display_title().to_string(),
        rows: format_count(ds.row_count),
        size: format_bytes(ds.data_size_bytes),
        updated: format_date(ds.updated_at.as_deref()),
    }
}

pub fn build(state: &PageState, locale: Language) -> ListView {
    let matched = filter_datasets(&state.datasets, &state.query);
    let rows: Vec<DatasetListItem> = matched.into_iter().map(list_item).collect();

    let empty_message = if state.datasets.is_empty() {
        Some(i18n::ts(locale, "list_no_datasets"))
    } else if rows.is_empty() {
        Some(i18n::t(locale, "list_no_match", &[("query", state.query.trim())]))
    } else {
        None
    };

    ListView {
        headers: [
            i18n::ts(locale, "col_id"),
            i18n::ts(locale, "col_rows"),
            i18n::ts(locale, "col_size"),
            i18n::ts(locale, "col_updated"),
        ],
        summary: i18n::t(
            locale,
            "list_count",
            &[
                ("shown", &rows.len().to_string()),
                ("total", &state.datasets.len().to_string()),
            ],
        ),
        rows,
        empty_message,
    }
}

fn column_width<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

pub fn render_text(view: &ListView, style: Style) -> String {
    if let Some(msg) = &view.empty_message {
        return format!("{}\n", style.muted(msg));
    }

    let ids: Vec<String> = view
        .rows
        .iter()
        .map(|r| truncate(&r.id, MAX_ID_WIDTH))
        .collect();
    let w_id = column_width(&view.headers[0], ids.iter().map(String::as_str));
    let w_rows = column_width(&view.headers[1], view.rows.iter().map(|r| r.rows.as_str()));
    let w_size = column_width(&view.headers[2], view.rows.iter().map(|r| r.size.as_str()));
    let w_upd = column_width(&view.headers[3], view.rows.iter().map(|r| r.updated.as_str()));

    let mut out = String::new();
    let header = [
        pad(&view.headers[0], w_id, false),
        pad(&view.headers[1], w_rows, true),
        pad(&view.headers[2], w_size, true),
        pad(&view.headers[3], w_upd, true),
    ]
    .join(COLUMN_GAP);
    out.push_str(&style.strong(&header));
    out.push('\n');

    for (row, id) in view.rows.iter().zip(&ids) {
        // padding is applied before styling so escape codes do not skew widths
        let line = [
            style.accent(&pad(id, w_id, false)),
            pad(&row.rows, w_rows, true),
            pad(&row.size, w_size, true),
            pad(&row.updated, w_upd, true),
        ]
        .join(COLUMN_GAP);
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str(&style.muted(&view.summary));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CandidateOrigin, Index, LoadedIndex};
    use url::Url;

    fn state_with(datasets: Vec<Dataset>) -> PageState {
        let url = Url::parse("https://h/index.json").unwrap();
        let mut state = PageState::default();
        state.replace_index(LoadedIndex {
            origin: CandidateOrigin::Argument,
            base: Url::parse("https://h/").unwrap(),
            url,
            index: Index {
                generated_at: None,
                datasets,
            },
        });
        state
    }

    fn sample() -> Vec<Dataset> {
        vec![
            Dataset {
                id: "official/ecb-eurofxref-hist".into(),
                title: Some("ECB rates".into()),
                row_count: Some(6_543),
                data_size_bytes: Some(1536),
                updated_at: Some("2026-01-24T10:00:00Z".into()),
                ..Default::default()
            },
            Dataset {
                id: "official/fred-fedfunds-monthly".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_empty_query_lists_everything() {
        let state = state_with(sample());
        let view = build(&state, Language::En);
        assert_eq!(view.rows.len(), 2);
        assert!(view.empty_message.is_none());
        assert_eq!(view.summary, "2 of 2 datasets");
    }

    #[test]
    fn test_list_item_formatting() {
        let state = state_with(sample());
        let view = build(&state, Language::En);
        let first = &view.rows[0];
        assert_eq!(first.rows, "6,543");
        assert_eq!(first.size, "1.5 KB");
        assert_eq!(first.updated, "2026-01-24");
        assert_eq!(first.href, "#/d/official%2Fecb-eurofxref-hist");

        let second = &view.rows[1];
        assert_eq!(second.rows, "-");
        assert_eq!(second.size, "-");
        assert_eq!(second.updated, "-");
        assert_eq!(second.title, "official/fred-fedfunds-monthly");
    }

    #[test]
    fn test_no_match_renders_only_message() {
        let mut state = state_with(sample());
        state.set_query("nothing-like-this");
        let view = build(&state, Language::En);
        assert!(view.rows.is_empty());
        let text = render_text(&view, Style::plain());
        assert_eq!(text, "No datasets match \"nothing-like-this\".\n");
    }

    #[test]
    fn test_empty_index_message() {
        let state = state_with(vec![]);
        let view = build(&state, Language::En);
        assert_eq!(view.empty_message.as_deref(), Some("No datasets."));
    }

    #[test]
    fn test_text_table_alignment() {
        let state = state_with(sample());
        let text = render_text(&build(&state, Language::En), Style::plain());
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Dataset ID"));
        assert!(lines[1].starts_with("official/ecb-eurofxref-hist"));
        assert!(lines[1].contains("6,543"));
        assert!(lines[1].ends_with("2026-01-24"));
        // every table line has the same width
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert_eq!(lines[1].chars().count(), lines[2].chars().count());
        assert_eq!(lines[3], "2 of 2 datasets");
    }
}
