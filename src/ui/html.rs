//! Static HTML rendering of a [`Page`], used by `--format html` and `export`.
//!
//! Markup mirrors the portal page: a `data-table` list with right-aligned
//! numeric cells, a `dl` of facts, and plain tables for preview and schema.

use crate::registry::ids;

use super::detail_panel::{DetailView, Section};
use super::results_list::ListView;
use super::status_bar::StatusLine;
use super::{Page, View};

/// How dataset links are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// `#/d/<id>` routes, as typed in the interactive browser.
    #[default]
    Fragment,
    /// Relative links between the files written by `export`.
    StaticFiles,
}

const CSS: &str = r#"
body { font-family: ui-monospace, monospace; margin: 0 auto; max-width: 1100px; padding: 1rem; color: #222; }
header { display: flex; gap: .75rem; align-items: baseline; border-bottom: 1px solid #ddd; padding-bottom: .5rem; }
header .brand { font-weight: bold; color: #0a7bb8; text-decoration: none; }
.muted { color: #8b8b8b; }
table { border-collapse: collapse; width: 100%; margin: .5rem 0; }
th, td { text-align: left; padding: .2rem .6rem; border-bottom: 1px solid #eee; }
.r { text-align: right; }
dl { display: grid; grid-template-columns: max-content 1fr; gap: .2rem 1rem; }
dt { color: #8b8b8b; }
pre { background: #f6f6f6; padding: .6rem; overflow-x: auto; white-space: pre-wrap; }
.tag { display: inline-block; margin-right: .4rem; color: #555; }
"#;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Path of a dataset's page inside an export directory. Valid ids map to
/// `d/<namespace>/<name>.html`; anything else is percent-encoded into one file name.
pub fn static_page_path(id: &str) -> String {
    match ids::split_dataset_id(id) {
        Ok((ns, name)) => format!("d/{}/{}.html", ns, name),
        Err(_) => format!("d/{}.html", urlencoding::encode(id)),
    }
}

fn root_prefix(page_path: &str) -> String {
    "../".repeat(page_path.matches('/').count())
}

struct Links {
    mode: LinkMode,
    root: String,
}

impl Links {
    fn for_view(mode: LinkMode, view: &View) -> Self {
        let root = match (mode, view) {
            (LinkMode::StaticFiles, View::Detail(d)) => root_prefix(&static_page_path(&d.id)),
            (LinkMode::StaticFiles, View::NotFound { id, .. }) => root_prefix(&static_page_path(id)),
            _ => String::new(),
        };
        Self { mode, root }
    }

    fn dataset(&self, id: &str, fragment_href: &str) -> String {
        match self.mode {
            LinkMode::Fragment => fragment_href.to_string(),
            LinkMode::StaticFiles => format!("{}{}", self.root, static_page_path(id)),
        }
    }

    fn home(&self) -> String {
        match self.mode {
            LinkMode::Fragment => "#/".to_string(),
            LinkMode::StaticFiles => format!("{}index.html", self.root),
        }
    }
}

fn base_template(
    lang: &str,
    title: &str,
    status: &StatusLine,
    links: &Links,
    content: &str,
) -> String {
    let parts: String = status
        .parts
        .iter()
        .map(|p| format!(r#"<span class="muted">{}</span>"#, html_escape(p)))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <header>
        <a class="brand" href="{home}">{brand}</a>
        {parts}
    </header>
    <main>
{content}
    </main>
</body>
</html>
"#,
        lang = lang,
        title = html_escape(title),
        css = CSS,
        home = html_escape(&links.home()),
        brand = html_escape(&status.brand),
        parts = parts,
        content = content,
    )
}

fn list_html(view: &ListView, links: &Links) -> String {
    if let Some(msg) = &view.empty_message {
        return format!(r#"<p class="muted">{}</p>"#, html_escape(msg));
    }
    let head = format!(
        r#"<th>{}</th><th class="r">{}</th><th class="r">{}</th><th class="r">{}</th>"#,
        html_escape(&view.headers[0]),
        html_escape(&view.headers[1]),
        html_escape(&view.headers[2]),
        html_escape(&view.headers[3]),
    );
    let rows: String = view
        .rows
        .iter()
        .map(|item| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td class="r">{}</td><td class="r">{}</td><td class="r">{}</td></tr>"#,
                html_escape(&links.dataset(&item.id, &item.href)),
                html_escape(&item.id),
                html_escape(&item.rows),
                html_escape(&item.size),
                html_escape(&item.updated),
            )
        })
        .collect();
    format!(
        r#"<table class="data-table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>
<p class="muted">{}</p>"#,
        head,
        rows,
        html_escape(&view.summary)
    )
}

fn message_html(msg: &str) -> String {
    format!(r#"<span class="muted">{}</span>"#, html_escape(msg))
}

fn detail_html(view: &DetailView, links: &Links) -> String {
    let mut out = String::new();
    out.push_str(&format!("<h1>{}</h1>\n", html_escape(&view.id)));
    if let Some(title) = &view.title {
        out.push_str(&format!("<h2>{}</h2>\n", html_escape(title)));
    }
    if let Some(desc) = &view.description {
        out.push_str(&format!("<p>{}</p>\n", html_escape(desc)));
    }
    if !view.tags.is_empty() {
        let tags: String = view
            .tags
            .iter()
            .map(|t| format!(r#"<span class="tag">#{}</span>"#, html_escape(t)))
            .collect();
        out.push_str(&format!("<p>{}</p>\n", tags));
    }

    let mut facts: String = view
        .facts
        .iter()
        .map(|(k, v)| format!("<dt>{}</dt><dd>{}</dd>", html_escape(k), html_escape(v)))
        .collect();
    if let Some(url) = &view.data_url {
        facts.push_str(&format!(
            r#"<dt>{}</dt><dd><a href="{}">{}</a></dd>"#,
            html_escape(&view.labels.data),
            html_escape(url),
            html_escape(url)
        ));
    }
    out.push_str(&format!("<dl>{}</dl>\n", facts));

    out.push_str(&format!(
        "<h3>{}</h3>\n<pre>{}</pre>\n",
        html_escape(&view.labels.usage),
        html_escape(&view.snippet)
    ));

    let preview = match &view.preview {
        Section::Content(table) => {
            let h: String = table
                .columns
                .iter()
                .map(|c| format!("<th>{}</th>", html_escape(c)))
                .collect();
            let b: String = table
                .rows
                .iter()
                .map(|r| {
                    let cells: String = r
                        .iter()
                        .map(|c| format!("<td>{}</td>", html_escape(c)))
                        .collect();
                    format!("<tr>{}</tr>", cells)
                })
                .collect();
            format!("<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>", h, b)
        }
        Section::Message(msg) => message_html(msg),
    };
    out.push_str(&format!(
        "<h3>{}</h3>\n<div id=\"preview\">{}</div>\n",
        html_escape(&view.labels.preview),
        preview
    ));

    let schema = match &view.schema {
        Section::Content(rows) => {
            let b: String = rows
                .iter()
                .map(|r| {
                    format!(
                        "<tr><td>{}</td><td class=\"muted\">{}</td></tr>",
                        html_escape(&r.name),
                        html_escape(&r.dtype)
                    )
                })
                .collect();
            format!("<table><tbody>{}</tbody></table>", b)
        }
        Section::Message(msg) => message_html(msg),
    };
    out.push_str(&format!(
        "<h3>{}</h3>\n<div id=\"schema\">{}</div>\n",
        html_escape(&view.labels.schema),
        schema
    ));

    let readme = match &view.readme {
        Section::Content(text) => format!("<pre>{}</pre>", html_escape(text)),
        Section::Message(msg) => message_html(msg),
    };
    out.push_str(&format!(
        "<h3>{}</h3>\n<div id=\"readme\">{}</div>\n",
        html_escape(&view.labels.readme),
        readme
    ));

    out.push_str(&format!(
        r#"<p><a href="{}">&larr;</a></p>"#,
        html_escape(&links.home())
    ));
    out
}

pub fn render_html(page: &Page, mode: LinkMode) -> String {
    let links = Links::for_view(mode, &page.body);
    let (title, content) = match &page.body {
        View::NotLoaded { message } => (page.status.brand.clone(), message_html(message)),
        View::List(list) => (page.status.brand.clone(), list_html(list, &links)),
        View::Detail(detail) => (
            format!("{} - {}", detail.id, page.status.brand),
            detail_html(detail, &links),
        ),
        View::NotFound { id, message } => (
            format!("{} - {}", id, page.status.brand),
            format!(
                r#"<p class="muted">{}</p><p><a href="{}">&larr;</a></p>"#,
                html_escape(message),
                html_escape(&links.home())
            ),
        ),
    };
    base_template(page.lang, &title, &page.status, &links, &content)
}
