/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use live_region::config::{ProfileManager, DEFAULT_PROFILE};
use live_region::region::ConsoleSink;
use live_region::{AnnounceOptions, Announcer, Outcome};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Live-region announcer: reads lines from stdin and announces them.
///
/// Line syntax:
///   text          polite announcement
///   !text         assertive announcement
///   @500 text     polite announcement delayed by 500 ms
///   #clear        abandon everything still pending
///
/// Example:
///   printf 'Saved\n!Connection lost\n@1000 Retrying\n' | live-region -c profiles.yaml -p default
#[derive(Debug, Parser)]
#[command(
    name = "live-region",
    about = "Live-region announcer – priority-ordered, throttled announcements",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML profile configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Profile to use from the configuration file.
    #[arg(short = 'p', long = "profile", default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Override the profile's minimum interval between writes (ms).
    #[arg(short = 'i', long = "interval-ms")]
    interval_ms: Option<u64>,
}

// ── Input parsing ─────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Line {
    Announce { text: String, options: AnnounceOptions },
    Clear,
}

fn parse_line(line: &str) -> Line {
    if line.trim() == "#clear" {
        return Line::Clear;
    }
    if let Some(text) = line.strip_prefix('!') {
        return Line::Announce {
            text: text.to_string(),
            options: AnnounceOptions::assertive(),
        };
    }
    if let Some(rest) = line.strip_prefix('@') {
        if let Some((delay, text)) = rest.split_once(' ') {
            if let Ok(ms) = delay.parse::<u64>() {
                return Line::Announce {
                    text: text.to_string(),
                    options: AnnounceOptions::polite().with_delay(Duration::from_millis(ms)),
                };
            }
        }
    }
    Line::Announce {
        text: line.to_string(),
        options: AnnounceOptions::polite(),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr so stdout only carries the announcements.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        config      = ?cli.config,
        profile     = %cli.profile,
        interval_ms = ?cli.interval_ms,
        "Configuration"
    );

    // ── Load profiles ─────────────────────────────────────────────────────────
    let mut profiles = ProfileManager::new();
    match &cli.config {
        Some(path) => profiles
            .load_from_file(path)
            .context("Failed to load profile configuration")?,
        None => warn!("No configuration file provided, using default profile"),
    }

    if profiles.is_loaded() && profiles.get_profile(&cli.profile).is_none() {
        let mut available: Vec<&str> = profiles.get_all_profiles().keys().map(String::as_str).collect();
        available.sort_unstable();
        warn!(profile = %cli.profile, ?available, "Unknown profile, falling back to default");
    }

    let mut profile = profiles.resolve(&cli.profile);
    if let Some(interval_ms) = cli.interval_ms {
        profile.min_interval_ms = interval_ms;
    }
    info!(
        "Using profile [{name}]  interval={interval}ms  register_delay={delay}ms",
        name = profile.name,
        interval = profile.min_interval_ms,
        delay = profile.register_delay_ms,
    );

    // ── Announce stdin ────────────────────────────────────────────────────────
    let (announcer, _task) = Announcer::spawn(ConsoleSink::new(std::io::stdout()), &profile);

    let mut completions = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_line(&line) {
            Line::Clear => announcer.clear().await?,
            Line::Announce { text, options } => match announcer.announce(text, options).await {
                // Only the completion is kept: without a live cancel handle,
                // a cleared announcement reports as abandoned.
                Ok(announcement) => completions.push(announcement.completion),
                Err(e) => warn!(error = %e, "announcement failed"),
            },
        }
    }

    // ── Wait for everything to settle ─────────────────────────────────────────
    let (mut announced, mut abandoned, mut failed) = (0usize, 0usize, 0usize);
    for completion in completions {
        match completion.wait().await {
            Some(Ok(Outcome::Announced)) => announced += 1,
            Some(Ok(_)) => {}
            Some(Err(_)) => failed += 1,
            None => abandoned += 1,
        }
    }
    info!(announced, abandoned, failed, "All announcements settled");

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
