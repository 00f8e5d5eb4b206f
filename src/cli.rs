//! Command-line interface definitions for Web Summarizer.
//!
//! This module defines the CLI arguments and subcommands using the `clap`
//! crate. The configuration path can also come from the environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Web Summarizer application.
///
/// # Examples
///
/// ```sh
/// # Summarize one page and print title, summary and tags
/// web_summarizer summarize -u https://example.com/post
///
/// # Ask for a freeform markdown digest instead
/// web_summarizer summarize -u https://example.com/post --markdown
///
/// # Run the HTTP API on port 8001
/// web_summarizer serve --port 8001
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "WEB_SUMMARIZER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize a document from a given URL
    Summarize {
        /// URL of the document to summarize
        #[arg(short, long)]
        url: String,

        /// Print a freeform markdown summary instead of summary + tags
        #[arg(long)]
        markdown: bool,
    },

    /// Run the Web Summarizer HTTP API
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, default_value_t = 8001)]
        port: u16,
    },
}
