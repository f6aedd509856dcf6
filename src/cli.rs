use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

pub const INDEX_ENV: &str = "OPENDATA_INDEX_URL";

#[derive(Parser, Debug)]
#[command(name = "opendata-browser", version, about = "Browse a static open-data registry")]
pub struct Cli {
    /// Index URL or path, tried before OPENDATA_INDEX_URL and the stored preference
    #[arg(long, global = true, value_name = "URL")]
    pub index: Option<String>,

    /// Config file (defaults to the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the dataset list, optionally filtered
    List {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print one dataset's detail view
    Show {
        /// Dataset id or `#/d/<id>` route
        id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Interactive browser (the default)
    Browse,
    /// Write a static HTML copy of the list and every detail page
    Export {
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
    },
    /// Show or change stored preferences
    Config {
        #[arg(long, value_name = "URL", conflicts_with = "clear_index")]
        set_index: Option<String>,
        #[arg(long)]
        clear_index: bool,
        /// `auto`, `en` or `tr`
        #[arg(long, value_name = "CODE")]
        locale: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Browse)
    }
}
