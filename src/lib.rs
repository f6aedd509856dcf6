pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod i18n;
pub mod registry;
pub mod router;
pub mod state;
pub mod ui;

use std::io::Write;

use anyhow::Result;
use log::LevelFilter;

use cli::{Cli, Command, INDEX_ENV};
use config::ConfigState;
use controller::Controller;
use registry::Candidate;
use ui::style::Style;

/// `warn` for dependencies, `info` for this crate (`debug` when verbose).
/// `RUST_LOG` overrides both.
pub fn init_logging(verbose: bool) {
    static ONCE: std::sync::Once = std::sync::Once::new();

    ONCE.call_once(|| {
        let own = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Warn)
            .filter_module("opendata_browser_lib", own)
            .filter_module("opendata_browser", own)
            .parse_env("RUST_LOG")
            .format_timestamp(None)
            .try_init();
    });
}

/// Index candidates for this run: `--index`, then `OPENDATA_INDEX_URL` as
/// seen through `env`, then the stored preference and the default path.
pub fn index_candidates(
    controller: &Controller,
    index_arg: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Vec<Candidate> {
    let env_index = env(INDEX_ENV);
    controller.candidates(index_arg, env_index.as_deref())
}

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let mut config_state = ConfigState::load(config_path);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let command = cli.command();
    if let Command::Config {
        set_index,
        clear_index,
        locale,
    } = &command
    {
        return commands::configure(
            &mut config_state,
            set_index.as_deref(),
            *clear_index,
            locale.as_deref(),
            &mut out,
        );
    }

    let style = Style::for_mode(config_state.config.color);
    let cwd = std::env::current_dir()?;
    let mut controller = Controller::new(config_state, cwd)?;
    let candidates = index_candidates(&controller, cli.index.as_deref(), |key| {
        std::env::var(key).ok()
    });

    match command {
        Command::Browse => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            commands::browse(&mut controller, &candidates, stdin, &mut out, style).await
        }
        Command::List { query, format } => {
            commands::load_index(&mut controller, &candidates).await?;
            commands::list(&mut controller, &query, format, style, &mut out)
        }
        Command::Show { id, format } => {
            commands::load_index(&mut controller, &candidates).await?;
            commands::show(&mut controller, &id, format, style, &mut out).await
        }
        Command::Export { out: dir } => {
            commands::load_index(&mut controller, &candidates).await?;
            let count = commands::export(&mut controller, &dir).await?;
            let dir = dir.display().to_string();
            let count = count.to_string();
            writeln!(
                out,
                "{}",
                i18n::t(
                    controller.locale(),
                    "export_done",
                    &[("count", &count), ("dir", &dir)]
                )
            )?;
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}
