use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use busyfeed_core::{extract_busy_times, parse_feed, validate_feed_url, QueryRange};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "busyfeed")]
#[command(about = "Parse calendar feeds and project busy intervals for scheduling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a feed file into normalized events (use "-" for stdin)
    Parse {
        file: String,

        /// Window start (YYYY-MM-DD), bounds recurrence expansion
        #[arg(long)]
        from: Option<String>,

        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Parse a feed file and project busy intervals for a window
    Busy {
        file: String,

        /// Window start (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Window end (YYYY-MM-DD)
        #[arg(long)]
        to: String,
    },
    /// Check whether a URL plausibly names a calendar feed endpoint
    CheckUrl { url: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, from, to } => cmd_parse(&file, from.as_deref(), to.as_deref()),
        Commands::Busy { file, from, to } => cmd_busy(&file, &from, &to),
        Commands::CheckUrl { url } => cmd_check_url(&url),
    }
}

fn cmd_parse(file: &str, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let window = QueryRange::from_args(from, to)?;
    let text = read_feed(file)?;

    let parsed = parse_feed(&text, &window);
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    Ok(())
}

fn cmd_busy(file: &str, from: &str, to: &str) -> Result<()> {
    let window = QueryRange::from_args(Some(from), Some(to))?;
    let from_dt = window.from.context("missing window start")?;
    let to_dt = window.to.context("missing window end")?;

    let text = read_feed(file)?;
    let parsed = parse_feed(&text, &window);
    for error in &parsed.errors {
        eprintln!("warning: {error}");
    }

    let intervals = extract_busy_times(&parsed.events, from_dt, to_dt);
    println!("{}", serde_json::to_string_pretty(&intervals)?);

    Ok(())
}

fn cmd_check_url(url: &str) -> Result<()> {
    let verdict = validate_feed_url(url);
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if !verdict.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn read_feed(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read feed from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read feed file '{path}'"))
    }
}
