use log::warn;

use crate::i18n::{self, Language};
use crate::registry::{artifact_url, artifact_urls, Dataset, Preview, Schema};
use crate::state::{DetailState, Panel, PageState};

use super::format::{format_bytes_exact, format_count, format_date, pad, truncate};
use super::style::Style;

const MAX_CELL_WIDTH: usize = 24;

/// What a panel shows: either its content or a single status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Message(String),
    Content(T),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRow {
    pub name: String,
    pub dtype: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Label/value pairs, only for values that are known.
    pub facts: Vec<(String, String)>,
    pub data_url: Option<String>,
    pub snippet: String,
    pub labels: SectionLabels,
    pub preview: Section<PreviewTable>,
    pub schema: Section<Vec<SchemaRow>>,
    pub readme: Section<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionLabels {
    pub usage: String,
    pub preview: String,
    pub schema: String,
    pub readme: String,
    pub data: String,
    pub back: String,
}

pub fn usage_snippet(id: &str) -> String {
    format!("import opendata as od\ndf = od.load(\"{}\")", id)
}

fn panel_message<T>(panel: &Panel<T>, missing_key: &str, locale: Language) -> Option<String> {
    match panel {
        Panel::Ready(_) => None,
        Panel::Loading => Some(i18n::ts(locale, "panel_loading")),
        Panel::Missing => Some(i18n::ts(locale, missing_key)),
        Panel::Failed(_) => Some(i18n::ts(locale, "panel_failed")),
    }
}

fn preview_section(panel: Panel<&Preview>, max_rows: usize, locale: Language) -> Section<PreviewTable> {
    let preview = match panel {
        Panel::Ready(p) if !p.is_empty() => p,
        Panel::Ready(_) => return Section::Message(i18n::ts(locale, "panel_no_preview")),
        other => {
            return Section::Message(
                panel_message(&other, "panel_no_preview", locale).unwrap_or_default(),
            )
        }
    };
    let shown = preview.truncated(max_rows);
    let rows = (0..shown.rows.len())
        .map(|r| shown.columns.iter().map(|c| shown.cell(r, c)).collect())
        .collect();
    Section::Content(PreviewTable {
        columns: shown.columns,
        rows,
    })
}

fn schema_section(panel: Panel<Schema>, locale: Language) -> Section<Vec<SchemaRow>> {
    match panel {
        Panel::Ready(schema) if !schema.columns.is_empty() => Section::Content(
            schema
                .columns
                .into_iter()
                .map(|c| SchemaRow {
                    name: c.name,
                    dtype: c.dtype.unwrap_or_default(),
                })
                .collect(),
        ),
        Panel::Ready(_) => Section::Message(i18n::ts(locale, "panel_not_available")),
        other => Section::Message(
            panel_message(&other, "panel_not_available", locale).unwrap_or_default(),
        ),
    }
}

fn readme_section(panel: &Panel<String>, locale: Language) -> Section<String> {
    match panel {
        Panel::Ready(text) if !text.trim().is_empty() => Section::Content(text.clone()),
        Panel::Ready(_) => Section::Message(i18n::ts(locale, "panel_not_available")),
        other => Section::Message(
            panel_message(other, "panel_not_available", locale).unwrap_or_default(),
        ),
    }
}

fn facts(ds: &Dataset, detail: &DetailState, locale: Language) -> Vec<(String, String)> {
    let f = &detail.facts;
    let mut out = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            out.push((i18n::ts(locale, key), v));
        }
    };
    push("field_updated", f.updated_at.as_deref().map(|d| format_date(Some(d))));
    push("field_rows", f.row_count.map(|n| format_count(Some(n))));
    push("field_size", f.data_size_bytes.map(format_bytes_exact));
    push("field_license", f.license.clone());
    push("field_frequency", f.frequency.clone());
    push("field_format", f.format.clone());
    push("field_version", f.version.clone());
    push(
        "field_columns",
        (!f.columns.is_empty()).then(|| f.columns.join(", ")),
    );
    push("field_source", f.source.clone());
    push("field_geo", f.geo.clone());
    push("field_repo", ds.repo.clone());
    out
}

/// Builds the detail view for a dataset whose panels may still be loading.
pub fn build(
    state: &PageState,
    ds: &Dataset,
    detail: &DetailState,
    locale: Language,
    preview_rows: usize,
) -> DetailView {
    let data_url = state.base_url.as_ref().and_then(|base| {
        let url = match detail.facts.data_key.as_deref() {
            Some(key) => artifact_url(base, key),
            None => artifact_urls(base, ds).map(|urls| urls.data),
        };
        url.map(|u| u.to_string())
            .map_err(|e| warn!("No data link for {}: {}", ds.id, e))
            .ok()
    });

    DetailView {
        id: ds.id.clone(),
        title: ds.title.clone().filter(|t| !t.trim().is_empty()),
        description: ds.description.clone().filter(|d| !d.trim().is_empty()),
        tags: ds.labels().into_iter().map(str::to_string).collect(),
        facts: facts(ds, detail, locale),
        data_url,
        snippet: usage_snippet(&ds.id),
        labels: SectionLabels {
            usage: i18n::ts(locale, "section_usage"),
            preview: i18n::ts(locale, "section_preview"),
            schema: i18n::ts(locale, "section_schema"),
            readme: i18n::ts(locale, "section_readme"),
            data: i18n::ts(locale, "field_data"),
            back: i18n::ts(locale, "detail_back"),
        },
        preview: preview_section(detail.preview(), preview_rows, locale),
        schema: schema_section(detail.schema(), locale),
        readme: readme_section(&detail.readme, locale),
    }
}

fn heading(out: &mut String, style: Style, label: &str) {
    out.push('\n');
    out.push_str(&style.strong(&format!("## {}", label)));
    out.push('\n');
}

fn render_message(out: &mut String, style: Style, msg: &str) {
    out.push_str(&style.muted(msg));
    out.push('\n');
}

fn render_preview_table(out: &mut String, table: &PreviewTable) {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(truncate(name, MAX_CELL_WIDTH).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<String>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| pad(v, *w, false))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    out.push_str(&line(
        table.columns.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect(),
    ));
    out.push('\n');
    for row in cells {
        out.push_str(&line(row));
        out.push('\n');
    }
}

pub fn render_text(view: &DetailView, style: Style) -> String {
    let mut out = String::new();
    out.push_str(&style.accent(&style.strong(&view.id)));
    out.push('\n');
    if let Some(title) = &view.title {
        out.push_str(title);
        out.push('\n');
    }
    if let Some(desc) = &view.description {
        out.push_str(&style.muted(desc));
        out.push('\n');
    }
    if !view.tags.is_empty() {
        out.push_str(&style.dim(&view.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")));
        out.push('\n');
    }

    out.push('\n');
    let label_width = view
        .facts
        .iter()
        .map(|(k, _)| k.chars().count())
        .chain(std::iter::once(view.labels.data.chars().count()))
        .max()
        .unwrap_or(0);
    for (label, value) in &view.facts {
        out.push_str(&format!("{}  {}\n", style.muted(&pad(label, label_width, false)), value));
    }
    if let Some(url) = &view.data_url {
        out.push_str(&format!(
            "{}  {}\n",
            style.muted(&pad(&view.labels.data, label_width, false)),
            style.accent(url)
        ));
    }

    heading(&mut out, style, &view.labels.usage);
    out.push_str(&view.snippet);
    out.push('\n');

    heading(&mut out, style, &view.labels.preview);
    match &view.preview {
        Section::Content(table) => render_preview_table(&mut out, table),
        Section::Message(msg) => render_message(&mut out, style, msg),
    }

    heading(&mut out, style, &view.labels.schema);
    match &view.schema {
        Section::Content(rows) => {
            let w = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
            for row in rows {
                let line = format!("{}  {}", pad(&row.name, w, false), style.dim(&row.dtype));
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
        Section::Message(msg) => render_message(&mut out, style, msg),
    }

    heading(&mut out, style, &view.labels.readme);
    match &view.readme {
        Section::Content(text) => {
            out.push_str(text.trim_end());
            out.push('\n');
        }
        Section::Message(msg) => render_message(&mut out, style, msg),
    }

    out.push('\n');
    out.push_str(&style.dim(&view.labels.back));
    out.push('\n');
    out
}
