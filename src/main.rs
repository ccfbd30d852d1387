// Copyright 2026 Scriptlens Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::Parser;
use scriptlens::chrome::ChromeSession;
use scriptlens::{gather_script_artifacts, FetchMode};

#[derive(Parser)]
#[command(
    name = "scriptlens",
    about = "Scriptlens — gather the script artifacts of a page load",
    version
)]
struct Cli {
    /// Page URL to load and gather
    url: String,

    /// Fetch script bodies one at a time (for memory-constrained hosts)
    #[arg(long)]
    series: bool,

    /// Navigation timeout in milliseconds
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "scriptlens=debug" } else { "scriptlens=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let url = url::Url::parse(&cli.url)
        .with_context(|| format!("invalid URL: {}", cli.url))?
        .to_string();

    let mode = if cli.series {
        FetchMode::Series
    } else {
        FetchMode::Parallel
    };

    let session = ChromeSession::launch().await?;
    let final_url = session.navigate(&url, cli.timeout_ms).await?;
    let records = session.network_records();

    let artifacts =
        gather_script_artifacts(&session, &records, &final_url, &session, mode).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&artifacts)?
    } else {
        serde_json::to_string(&artifacts)?
    };
    println!("{json}");

    session.close().await?;
    Ok(())
}
