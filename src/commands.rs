use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cli::OutputFormat;
use crate::config::ConfigState;
use crate::controller::Controller;
use crate::i18n::{self, Language};
use crate::registry::{Candidate, CandidateFailure};
use crate::router::Route;
use crate::ui::{self, html, style::Style, LinkMode};

/// "Failed to load index.json" followed by one line per candidate tried.
pub fn describe_failures(locale: Language, failures: &[CandidateFailure]) -> String {
    let mut out = i18n::ts(locale, "index_failed");
    for f in failures {
        out.push('\n');
        out.push_str(&i18n::t(
            locale,
            "index_tried",
            &[
                ("location", &f.candidate.location),
                ("origin", &f.candidate.origin.to_string()),
                ("reason", &f.reason),
            ],
        ));
    }
    out
}

/// Loads the index for a one-shot command. Failure is fatal here.
pub async fn load_index(controller: &mut Controller, candidates: &[Candidate]) -> Result<()> {
    controller
        .load(candidates)
        .await
        .map_err(|failures| anyhow!(describe_failures(controller.locale(), &failures)))
}

/// Accepts both a bare id and a `#/d/<id>` route.
pub fn route_for(target: &str) -> Route {
    let target = target.trim();
    if target.starts_with('#') {
        Route::parse(target)
    } else {
        Route::Detail(target.to_string())
    }
}

fn write_page(
    controller: &Controller,
    format: OutputFormat,
    style: Style,
    out: &mut impl Write,
) -> Result<()> {
    let page = controller.page();
    let rendered = match format {
        OutputFormat::Text => ui::render_text(&page, style),
        OutputFormat::Html => ui::render_html(&page, LinkMode::Fragment),
    };
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

pub fn list(
    controller: &mut Controller,
    query: &str,
    format: OutputFormat,
    style: Style,
    out: &mut impl Write,
) -> Result<()> {
    controller.set_query(query);
    controller.navigate(Route::List);
    write_page(controller, format, style, out)
}

/// Unknown ids render the not-found view; that is not an error.
pub async fn show(
    controller: &mut Controller,
    target: &str,
    format: OutputFormat,
    style: Style,
    out: &mut impl Write,
) -> Result<()> {
    controller.navigate(route_for(target));
    controller.settle().await;
    write_page(controller, format, style, out)
}

/// Writes `index.html` plus one page per dataset. Returns the number of pages.
pub async fn export(controller: &mut Controller, dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    controller.set_query("");
    controller.navigate(Route::List);
    let index_page = ui::render_html(&controller.page(), LinkMode::StaticFiles);
    write_file(&dir.join("index.html"), &index_page)?;
    let mut written = 1;

    let ids: Vec<String> = controller
        .state()
        .datasets
        .iter()
        .map(|d| d.id.clone())
        .collect();
    for id in ids {
        controller.navigate(Route::Detail(id.clone()));
        controller.settle().await;
        let page = ui::render_html(&controller.page(), LinkMode::StaticFiles);
        write_file(&dir.join(html::static_page_path(&id)), &page)?;
        written += 1;
        debug!("exported {}", id);
    }
    controller.navigate(Route::List);
    info!("Exported {} pages to {}", written, dir.display());
    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Applies the requested changes and prints the resulting config.
pub fn configure(
    state: &mut ConfigState,
    set_index: Option<&str>,
    clear_index: bool,
    locale: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let mut changed = false;
    if let Some(url) = set_index.map(str::trim).filter(|u| !u.is_empty()) {
        state.config.last_index_url = Some(url.to_string());
        changed = true;
    }
    if clear_index {
        state.config.last_index_url = None;
        changed = true;
    }
    if let Some(code) = locale {
        let code = code.trim().to_lowercase();
        if !matches!(code.as_str(), "auto" | "en" | "tr") {
            return Err(anyhow!("Unsupported locale '{}' (expected auto, en or tr)", code));
        }
        state.config.locale = code;
        changed = true;
    }

    if changed {
        state.save()?;
        let lang = Language::from_setting(&state.config.locale);
        let path = state.path.display().to_string();
        writeln!(out, "{}", i18n::t(lang, "config_saved", &[("path", &path)]))?;
    }
    writeln!(out, "{}", serde_json::to_string_pretty(&state.config)?)?;
    Ok(())
}

enum Action {
    Continue,
    Quit,
}

/// Interactive session: reads commands from `input`, renders to `out`, and
/// folds detail panel results in as they arrive.
pub async fn browse<R, W>(
    controller: &mut Controller,
    candidates: &[Candidate],
    input: R,
    out: &mut W,
    style: Style,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let locale = controller.locale();
    let mut lines = input.lines();

    if let Err(failures) = controller.load(candidates).await {
        writeln!(out, "{}", style.danger(&describe_failures(locale, &failures)))?;
        if !prompt_for_index(controller, &mut lines, out, style).await? {
            return Ok(());
        }
    }
    render(controller, out, style)?;

    let mut prompted = false;
    loop {
        if !prompted {
            write!(out, "{}", i18n::ts(locale, "prompt_main"))?;
            out.flush()?;
            prompted = true;
        }
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                prompted = false;
                match handle_line(controller, line.trim(), out, style).await? {
                    Action::Quit => break,
                    Action::Continue => {}
                }
            }
            Some(response) = controller.next_response() => {
                if controller.apply(response) && !controller.detail_pending() {
                    writeln!(out)?;
                    render(controller, out, style)?;
                    prompted = false;
                }
            }
        }
    }
    if controller.stale_discarded() > 0 {
        debug!(
            "{}",
            i18n::t(
                locale,
                "status_stale_discarded",
                &[("count", &controller.stale_discarded().to_string())]
            )
        );
    }
    Ok(())
}

fn render<W: Write>(controller: &Controller, out: &mut W, style: Style) -> Result<()> {
    out.write_all(ui::render_text(&controller.page(), style).as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Asks for an index location until one loads. Returns false on EOF or an
/// empty answer.
async fn prompt_for_index<R, W>(
    controller: &mut Controller,
    lines: &mut tokio::io::Lines<R>,
    out: &mut W,
    style: Style,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let locale = controller.locale();
    loop {
        write!(out, "{}", i18n::ts(locale, "prompt_index"))?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        let location = line.trim();
        if location.is_empty() {
            return Ok(false);
        }
        match controller.reload(Some(location)).await {
            Ok(()) => return Ok(true),
            Err(failures) => {
                writeln!(out, "{}", style.danger(&describe_failures(locale, &failures)))?
            }
        }
    }
}

async fn handle_line<W: Write>(
    controller: &mut Controller,
    line: &str,
    out: &mut W,
    style: Style,
) -> Result<Action> {
    let locale = controller.locale();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    match word {
        "" => return Ok(Action::Continue),
        "quit" | "exit" | "q" => return Ok(Action::Quit),
        "help" | "?" => {
            writeln!(out, "{}", i18n::ts(locale, "help"))?;
            return Ok(Action::Continue);
        }
        "list" => controller.navigate(Route::List),
        "open" if !rest.is_empty() => controller.navigate(route_for(rest)),
        "back" => {
            if !controller.back() {
                return Ok(Action::Continue);
            }
        }
        "reload" => {
            let location = (!rest.is_empty()).then_some(rest);
            if let Err(failures) = controller.reload(location).await {
                writeln!(out, "{}", style.danger(&describe_failures(locale, &failures)))?;
                return Ok(Action::Continue);
            }
        }
        _ if line.starts_with('/') => {
            controller.set_query(&line[1..]);
            controller.navigate(Route::List);
        }
        _ if line.starts_with('#') => controller.navigate(Route::parse(line)),
        _ => {
            writeln!(
                out,
                "{}",
                i18n::t(locale, "unknown_command", &[("command", word)])
            )?;
            return Ok(Action::Continue);
        }
    }
    render(controller, out, style)?;
    Ok(Action::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::CandidateOrigin;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn controller(dir: &Path) -> Controller {
        let config = ConfigState {
            config: Config {
                locale: "en".into(),
                ..Default::default()
            },
            path: dir.join("config.json"),
        };
        Controller::new(config, dir.to_path_buf()).unwrap()
    }

    fn arg(location: &str) -> Vec<Candidate> {
        vec![Candidate {
            origin: CandidateOrigin::Argument,
            location: location.to_string(),
        }]
    }

    async fn registry() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "datasets": [
                    {"id": "official/ecb-rates", "title": "ECB rates", "tags": ["fx"], "row_count": 6543},
                    {"id": "official/quakes", "description": "USGS earthquakes"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/datasets/official/ecb-rates/metadata.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "format": "parquet",
                "preview": {"columns": ["date", "rate"], "rows": [{"date": "2026-01-02", "rate": 1.09}]}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_list_filters_by_query() {
        let server = registry().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        load_index(&mut c, &arg(&format!("{}/index.json", server.uri()))).await.unwrap();

        let mut out = Vec::new();
        list(&mut c, "QUAKES", OutputFormat::Text, Style::plain(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("official/quakes"));
        assert!(!text.contains("official/ecb-rates"));
        assert!(text.contains("1 of 2 datasets"));
    }

    #[tokio::test]
    async fn test_one_shot_load_failure_lists_candidates() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        let candidates = c.candidates(Some(&format!("{}/index.json", server.uri())), None);

        let err = load_index(&mut c, &candidates).await.unwrap_err().to_string();
        assert!(err.starts_with("Failed to load index.json"));
        assert!(err.contains("(argument)"));
        assert!(err.contains("(default)"));
    }

    #[tokio::test]
    async fn test_show_route_and_bare_id() {
        let server = registry().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        load_index(&mut c, &arg(&format!("{}/index.json", server.uri()))).await.unwrap();

        let mut out = Vec::new();
        show(&mut c, "#/d/official%2Fecb-rates", OutputFormat::Text, Style::plain(), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("ECB rates"));
        assert!(text.contains("2026-01-02  1.09"));
        assert!(text.contains("format  parquet"));

        let mut out = Vec::new();
        show(&mut c, "official/missing", OutputFormat::Text, Style::plain(), &mut out)
            .await
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Dataset \"official/missing\" not found."));
    }

    #[tokio::test]
    async fn test_export_writes_static_pages() {
        let server = registry().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        load_index(&mut c, &arg(&format!("{}/index.json", server.uri()))).await.unwrap();

        let out_dir = dir.path().join("site");
        let written = export(&mut c, &out_dir).await.unwrap();
        assert_eq!(written, 3);

        let index = std::fs::read_to_string(out_dir.join("index.html")).unwrap();
        assert!(index.contains(r#"href="d/official/quakes.html""#));
        let detail = std::fs::read_to_string(out_dir.join("d/official/ecb-rates.html")).unwrap();
        assert!(detail.contains("<td>1.09</td>"));
        assert!(out_dir.join("d/official/quakes.html").exists());
    }

    #[test]
    fn test_configure_sets_and_clears_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ConfigState {
            config: Config::default(),
            path: dir.path().join("nested/config.json"),
        };
        let mut out = Vec::new();
        configure(&mut state, Some("https://h/index.json"), false, Some("TR"), &mut out).unwrap();
        assert_eq!(state.config.last_index_url.as_deref(), Some("https://h/index.json"));
        assert_eq!(state.config.locale, "tr");
        assert!(state.path.exists());

        configure(&mut state, None, true, None, &mut Vec::new()).unwrap();
        assert!(state.config.last_index_url.is_none());
        assert!(configure(&mut state, None, false, Some("xx"), &mut Vec::new()).is_err());
    }

    #[tokio::test]
    async fn test_browse_session() {
        let server = registry().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        Mock::given(method("GET"))
            .and(path("/mirror/index.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "datasets": [{"id": "mirror/only"}]
            })))
            .mount(&server)
            .await;
        let mirror = format!("{}/mirror/index.json", server.uri());
        let input = format!(
            "/nothing-matches\n/\n#/d/official%2Fnope\nback\nreload {}\nfrobnicate\nquit\n",
            mirror
        );

        let mut out = Vec::new();
        browse(
            &mut c,
            &arg(&format!("{}/index.json", server.uri())),
            input.as_bytes(),
            &mut out,
            Style::plain(),
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No datasets match \"nothing-matches\"."));
        assert!(text.contains("Dataset \"official/nope\" not found."));
        // initial render, the cleared search and `back` all show the full list
        assert_eq!(text.matches("2 of 2 datasets").count(), 3);
        assert!(text.contains("mirror/only"));
        assert!(text.contains("1 of 1 datasets"));
        assert!(text.contains("Unknown command: frobnicate"));
        assert_eq!(c.config().config.last_index_url.as_deref(), Some(mirror.as_str()));
        assert!(c.state().find("official/ecb-rates").is_none());
    }

    #[tokio::test]
    async fn test_browse_prompts_when_no_candidate_loads() {
        let server = registry().await;
        let dir = tempfile::tempdir().unwrap();
        let mut c = controller(dir.path());
        let input = format!("{}/nope.json\n{}/index.json\nquit\n", server.uri(), server.uri());

        let mut out = Vec::new();
        browse(
            &mut c,
            &arg(&format!("{}/missing.json", server.uri())),
            input.as_bytes(),
            &mut out,
            Style::plain(),
        )
        .await
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Failed to load index.json").count(), 2);
        assert!(text.contains("Index URL (empty to quit): "));
        assert!(text.contains("official/ecb-rates"));
        assert_eq!(
            c.config().config.last_index_url,
            Some(format!("{}/index.json", server.uri()))
        );
    }
}
