// ABOUTME: Interactive console for looking up English words.
// ABOUTME: Reads words from stdin and prints definitions and synonyms.

use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dictbot::prelude::*;

/// Every console request comes from the same user.
const CONSOLE_USER: &str = "console";

/// Filter from `RUST_LOG` when it parses, `info` otherwise. `--verbose`
/// raises everything to debug.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    if verbose {
        filter.add_directive(tracing::Level::DEBUG.into())
    } else {
        filter
    }
}

fn setup_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    // Logs go to stderr so replies on stdout stay readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .init();
}

async fn run_lookup_loop(bot: &DictBot<StdoutSink>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut turn: u64 = 0;

    println!("Dict Bot - Type 'quit' to exit.\n");

    loop {
        let line = match rl.readline("Please enter word: ") {
            Ok(line) => line,
            Err(_) => break,
        };

        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if !line.is_empty() {
            let _ = rl.add_history_entry(line);
        }

        turn += 1;
        let event = Event::Message {
            user_id: CONSOLE_USER.to_string(),
            reply_token: turn.to_string(),
            text: line.to_string(),
        };
        bot.respond(&[event]).await.context("Failed to print reply")?;
        println!();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let verbose = std::env::args().skip(1).any(|a| a == "-v" || a == "--verbose");
    setup_logging(verbose);

    let oxford = OxfordConfig::from_env().context("Failed to load Oxford credentials")?;
    let config = CoordinatorConfig::from_env().context("Failed to load coordinator config")?;
    info!(?oxford, ?config, "configuration loaded");

    let provider = Arc::new(OxfordClient::new(oxford));
    let coordinator = Arc::new(RequestCoordinator::new(provider, config)?);
    let bot = DictBot::new(coordinator.clone(), StdoutSink);

    let result = run_lookup_loop(&bot).await;
    coordinator.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        let filter = log_filter(false, None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        let filter = log_filter(false, Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_log_filter_verbose_enables_debug() {
        let filter = log_filter(true, Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
