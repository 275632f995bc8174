// Entry point for the interactive resizer shell.
// The library in lib.rs holds everything else.

use std::io::Write;
use std::path::PathBuf;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use image_resizer_lib::commands::{self, Command, HELP};
use image_resizer_lib::{BatchCoordinator, BatchEvent, ResizerConfig};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)
        .with_writer(std::io::stderr) // Keep stdout for command output
        .compact();

    subscriber.init();

    info!("=== Image Resizer Starting ===");

    let batch = BatchCoordinator::new(ResizerConfig::default());
    tokio::spawn(log_events(batch.subscribe()));

    // Paths given on the command line are added up front.
    let initial: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if !initial.is_empty() {
        run(&batch, Command::Add(initial)).await;
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if command.needs_confirmation() && !confirm(&mut lines, &command).await? {
            println!("Cancelled");
            continue;
        }
        run(&batch, command).await;
    }

    info!("Application exiting");
    Ok(())
}

async fn run(batch: &BatchCoordinator, command: Command) {
    match commands::execute(batch, command).await {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{output}"),
        Err(e) => eprintln!("{e}"),
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("failed to flush stdout")
}

async fn confirm(lines: &mut InputLines, command: &Command) -> Result<bool> {
    let question = match command {
        Command::Remove(id) => format!("Remove {id}?"),
        _ => "Remove every image?".to_string(),
    };
    print!("{question} [y/N] ");
    std::io::stdout().flush().context("failed to flush stdout")?;

    let answer = lines.next_line().await.context("failed to read input")?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Mirrors batch events into the log as JSON.
async fn log_events(mut events: broadcast::Receiver<BatchEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => debug!("event {}", json),
                Err(e) => warn!("Failed to serialize event: {}", e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event log fell behind, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
