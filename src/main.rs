//! Application entry point for the voice-following teleprompter.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the script: `--script` file, else the persisted script, else the
//!    placeholder.
//! 4. Create the [`tokio`] runtime.
//! 5. Build a [`LineRecognizer`] over `--events` or stdin.
//! 6. Run a [`PromptSession`]; Ctrl-C sends `Stop`.
//! 7. Print every progress update, then a summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use voice_prompter::{
    config::AppConfig,
    progress::RenderedScript,
    recognition::{LineRecognizer, Recognizer},
    script::{Script, ScriptStore},
    session::{
        lock_state, new_shared_state, ProgressSnapshot, PromptSession, SessionCommand,
        SessionOutcome, SharedState,
    },
};

/// Upcoming words shown on each plain progress line.
const UPCOMING_WORDS: usize = 8;

/// Follow a script while it is read aloud.
///
/// Recognition results are read as lines: `interim: text`, `final: text`, or
/// untagged text (treated as final).
#[derive(Parser)]
#[command(name = "voice-prompter", version)]
struct Cli {
    /// Script to follow (defaults to the last script used).
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Read recognition lines from this file instead of stdin.
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print progress as JSON lines.
    #[arg(long)]
    json: bool,
}

// ---------------------------------------------------------------------------
// Progress output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProgressLine<'a> {
    #[serde(flatten)]
    snapshot: &'a ProgressSnapshot,
    text: &'a RenderedScript,
}

fn print_update(snapshot: &ProgressSnapshot, rendered: &RenderedScript, json: bool) {
    if json {
        let line = ProgressLine {
            snapshot,
            text: rendered,
        };
        match serde_json::to_string(&line) {
            Ok(line) => println!("{line}"),
            Err(e) => log::warn!("could not encode progress: {e}"),
        }
        return;
    }

    let upcoming: Vec<&str> = rendered
        .provisional
        .split_whitespace()
        .chain(rendered.pending.split_whitespace())
        .take(UPCOMING_WORDS)
        .collect();
    let warning = match snapshot.timeout_countdown {
        Some(secs) if snapshot.show_timeout_warning => format!("  (stopping in {secs}s)"),
        _ => String::new(),
    };
    println!(
        "[{}] {:>4}/{:<4} ▸ {}{warning}",
        snapshot.status.label(),
        snapshot.final_index,
        snapshot.interim_index,
        upcoming.join(" ")
    );
}

async fn print_updates(
    mut updates: watch::Receiver<ProgressSnapshot>,
    state: SharedState,
    json: bool,
) {
    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        let rendered = lock_state(&state).render();
        print_update(&snapshot, &rendered, json);
    }
}

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&PathBuf>) -> AppConfig {
    let loaded = match path {
        Some(path) => AppConfig::load_from(path),
        None => {
            if AppConfig::is_first_run() {
                if let Err(e) = AppConfig::default().save() {
                    log::warn!("Could not write default settings ({e})");
                }
            }
            AppConfig::load()
        }
    };
    loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    })
}

fn load_script(cli: &Cli, config: &AppConfig, store: &ScriptStore) -> Result<Script> {
    let Some(path) = cli.script.as_ref() else {
        return Ok(Script::new(
            store.load_or_placeholder(&config.script.placeholder),
        ));
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    if config.script.persist {
        if let Err(e) = store.save(&text) {
            log::warn!("Could not persist script ({e})");
        }
    }
    Ok(Script::new(text))
}

async fn open_recognizer(events: Option<&PathBuf>) -> Result<Box<dyn Recognizer>> {
    Ok(match events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening events {}", path.display()))?;
            Box::new(LineRecognizer::new(tokio::io::BufReader::new(file)))
        }
        None => Box::new(LineRecognizer::stdin()),
    })
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::info!("voice-prompter starting up");

    // 2. Configuration
    let config = load_config(cli.config.as_ref());

    // 3. Script
    let store = ScriptStore::new();
    let script = load_script(&cli, &config, &store)?;
    log::info!(
        "Loaded script: {} words in {} units",
        script.word_count(),
        script.units().len()
    );

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let state = new_shared_state(config, script);
    let json = cli.json;

    let result = rt.block_on(async {
        // 5. Recognition source
        let recognizer = open_recognizer(cli.events.as_ref()).await?;

        // 6. Session
        let session = PromptSession::new(Arc::clone(&state), Some(store));
        let printer = tokio::spawn(print_updates(session.subscribe(), Arc::clone(&state), json));

        let (command_tx, command_rx) = mpsc::channel(8);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = command_tx.send(SessionCommand::Stop).await;
            }
        });

        let outcome = session.run_with(recognizer.as_ref(), command_rx).await?;
        if let Err(e) = printer.await {
            log::warn!("progress printer failed: {e}");
        }
        Ok::<SessionOutcome, anyhow::Error>(outcome)
    });
    // A stdin read may still be parked on a blocking thread.
    rt.shutdown_background();
    let outcome = result?;

    // 7. Summary
    let st = lock_state(&state);
    let read = match st.progress.final_index() {
        Some(final_index) => st
            .script
            .units()
            .iter()
            .filter(|unit| unit.is_word() && !unit.key().is_empty() && unit.index <= final_index)
            .count(),
        None => 0,
    };
    let reason = match outcome {
        SessionOutcome::SourceClosed => "input ended",
        SessionOutcome::Stopped => "stopped",
        SessionOutcome::TimedOut => "no progress",
    };
    println!(
        "Session ended ({reason}): {read} of {} words read.",
        st.script.word_count()
    );
    Ok(())
}
