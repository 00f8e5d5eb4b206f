//! # Web Summarizer
//!
//! Extracts the readable article text from a web page and turns it into a
//! short synopsis plus a handful of topical tags using a local Ollama model.
//!
//! ## Features
//!
//! - Multi-strategy extraction: DOM content scoring, whole-page fallback, and
//!   a WebDriver-rendered path for sites known to defeat plain fetching
//! - Head-and-tail clamping of long articles before they reach the model
//! - Strict JSON contract with the model, with a degraded-but-safe fallback
//!   whenever its output does not validate
//! - CLI and HTTP API front ends over the same pipeline
//!
//! ## Usage
//!
//! ```sh
//! web_summarizer summarize -u https://example.com/post
//! web_summarizer serve --host 0.0.0.0 --port 8001
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Policy**: Decide whether the URL needs a rendered page
//! 2. **Extraction**: Pull title, date and body text out of the page
//! 3. **Clamping**: Keep the first 2000 and last 1000 characters of long text
//! 4. **Generation**: Ask the model for a JSON summary
//! 5. **Validation**: Parse and check the reply, or fall back to the title

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod clamp;
mod cli;
mod config;
mod error;
mod extract;
mod models;
mod parse;
mod pipeline;
mod policy;
mod prompt;
mod server;
mod utils;

use cli::{Cli, Command};
use config::{OutputMode, Settings};
use pipeline::Summarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Summarize { url, markdown } => {
            if markdown {
                settings.output_mode = OutputMode::Markdown;
            }
            let summarizer = Summarizer::from_settings(&settings);
            let start_time = std::time::Instant::now();
            match summarizer.report(&url).await {
                Ok(report) => println!("{report}"),
                Err(e) => {
                    println!("Error while processing: {e}");
                    std::process::exit(1);
                }
            }
            let elapsed = start_time.elapsed();
            info!(?elapsed, "Execution complete");
        }
        Command::Serve { host, port } => {
            let summarizer = Arc::new(Summarizer::from_settings(&settings));
            info!(mode = ?summarizer.mode(), "Starting HTTP API");
            server::serve(summarizer, &host, port).await?;
        }
    }

    Ok(())
}
