use anyhow::Result;
use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod catalog;
mod client;
mod config;
mod error;
mod models;
mod recommendation;
mod repl;
mod session;
mod view;

#[cfg(test)]
mod fixtures;

use crate::catalog::{DebouncedLookup, ItunesCatalog};
use crate::client::GeminiClient;
use crate::config::load_config;
use crate::models::SongRef;
use crate::recommendation::{
    PromptInput, RecommendationClient, SYSTEM_INSTRUCTION, build_prompt, response_schema,
};
use crate::repl::Repl;
use crate::session::{MAX_SEED_ROWS, SessionMachine, VALIDATION_MESSAGE};
use crate::view::TerminalView;

#[derive(Parser)]
#[command(name = "vibematch")]
#[command(about = "AI music discovery: tell it your favorite songs, get five new ones")]
#[command(version)]
struct Args {
    /// Seed song as "title/artist"; repeat for more. Skips the interactive session.
    #[arg(short = 's', long = "song")]
    songs: Vec<String>,

    /// Only recommend songs by this artist
    #[arg(short = 'a', long = "artist")]
    artist: Option<String>,

    /// Override the Gemini model from the environment
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Print the prompt, system instruction and schema instead of calling the API
    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,

    /// Quiet mode - only log warnings and errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

/// Parse a `title/artist` argument
fn parse_song_arg(raw: &str) -> Result<SongRef> {
    let (title, artist) = raw
        .rsplit_once('/')
        .ok_or_else(|| anyhow::anyhow!("Song '{}' must look like \"title/artist\"", raw))?;
    Ok(SongRef::new(title.trim(), artist.trim()))
}

/// What `--dry-run` prints: the exact system instruction, prompt and schema a submit would send
fn dry_run_report(seeds: Vec<SongRef>, artist: Option<&str>) -> Result<String> {
    let filled: Vec<SongRef> = seeds.into_iter().filter(SongRef::is_filled).collect();
    if filled.is_empty() {
        return Err(anyhow::anyhow!(VALIDATION_MESSAGE));
    }
    let prompt = build_prompt(&PromptInput {
        seeds: &filled,
        liked: &[],
        skipped: &[],
        target_artist: artist,
    });
    Ok(format!(
        "=== SYSTEM INSTRUCTION ===\n{SYSTEM_INSTRUCTION}\n\n=== PROMPT ===\n{prompt}\n\n=== RESPONSE SCHEMA ===\n{}\n",
        serde_json::to_string_pretty(&response_schema())?
    ))
}

fn init_tracing(quiet: bool) {
    let default_filter = if quiet { "vibematch=warn" } else { "vibematch=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    // Load configuration from .env
    let mut config = load_config()?;
    if let Some(model) = args.model {
        config.model = model;
    }

    let seeds = args
        .songs
        .iter()
        .map(|raw| parse_song_arg(raw))
        .collect::<Result<Vec<_>>>()?;
    if seeds.len() > MAX_SEED_ROWS {
        return Err(anyhow::anyhow!(
            "At most {} seed songs are supported, got {}",
            MAX_SEED_ROWS,
            seeds.len()
        ));
    }

    if args.dry_run {
        print!("{}", dry_run_report(seeds, args.artist.as_deref())?);
        return Ok(());
    }

    let gemini = GeminiClient::new(&config);
    info!(model = gemini.model(), "using Gemini model");
    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; generation requests will fail");
    }

    let mut machine = SessionMachine::new(RecommendationClient::new(gemini));
    machine.subscribe(Box::new(TerminalView));

    if !seeds.is_empty() {
        // One-shot mode: fill the rows, submit once, print the outcome
        for (i, seed) in seeds.into_iter().enumerate() {
            if i >= machine.session().seed_songs().len() {
                machine.add_seed_row()?;
            }
            machine.set_seed(i, seed)?;
        }
        if let Some(artist) = &args.artist {
            machine.set_target_artist(artist)?;
        }
        machine.submit()?;
        return Ok(());
    }

    if let Some(artist) = &args.artist {
        machine.set_target_artist(artist)?;
    }

    let catalog = Arc::new(ItunesCatalog::new(&config));
    let lookup = DebouncedLookup::spawn(catalog, config.debounce);
    let mut repl = Repl::new(machine, lookup, config.debounce + config.request_timeout);
    repl.run(io::stdin().lock(), io::stdout())
}
