//! Command-line argument parsing for esql-reports.
//!
//! Uses clap to parse CLI arguments.

use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;

/// Generate charts for Typst reports from ES|QL queries.
///
/// For every `#figure(image("NAME"))` in a document, runs the chart script
/// `NAME.toml` next to it, writes the rendered chart to `NAME`, then compiles
/// the document with typst.
#[derive(Parser, Debug)]
#[command(name = "esql-reports")]
#[command(version, about, long_about, disable_version_flag = true)]
pub struct Cli {
    /// Typst documents to process
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Elasticsearch URL, optionally with credentials (user:pass or API-KEY:key)
    #[arg(short = 'e', long = "es", value_name = "URL", env = "ES_URL")]
    pub es: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generate the charts but do not run the document compiler
    #[arg(long)]
    pub no_compile: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Prints the long help text to stdout.
    pub fn print_help() {
        let _ = Self::command().print_long_help();
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns true if there is nothing to process.
    pub fn has_no_files(&self) -> bool {
        self.files.is_empty()
    }
}
