// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all links reachable, 1 = unreachable links,
//    2 = analysis error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod analyzer; // src/analyzer/ - the page-analysis engine
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - runtime settings
mod error; // src/error.rs - request-level errors
mod fetch; // src/fetch.rs - target validation and page download
mod inspect; // src/inspect.rs - the full analysis pipeline
mod progress; // src/progress/ - progress events and the broadcast bus
mod server; // src/server/ - web front end
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use analyzer::AnalysisResult;
use cli::{Cli, Commands};
use config::Settings;
use inspect::Inspector;
use progress::{ProgressEvent, ProgressSink, Reporter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { url, json, budget } => {
            init_logging(cli.verbose, "page_inspector=warn")?;
            handle_analyze(&url, json, Settings::from_budget(&budget)).await
        }
        Commands::Serve {
            addr,
            subscriber_buffer,
            budget,
        } => {
            init_logging(cli.verbose, "page_inspector=info,tower_http=info")?;
            let settings = Settings::from_budget(&budget).with_subscriber_buffer(subscriber_buffer);
            server::run(addr, &settings).await?;
            Ok(0)
        }
    }
}

// RUST_LOG wins when set; otherwise `default` (or debug with --verbose)
fn init_logging(verbose: bool, default: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("page_inspector=debug,tower_http=debug"),
        Err(_) => EnvFilter::new(default),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

/// Prints progress lines to stderr as they happen, keeping stdout clean
/// for the result (and for --json).
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn publish(&self, event: ProgressEvent) {
        eprintln!("   [{}] {}", event.emitted_at.format("%H:%M:%S%.3f"), event.message);
    }
}

async fn handle_analyze(url: &str, json: bool, settings: Settings) -> Result<i32> {
    eprintln!("🔍 Analyzing page: {}", url);

    let inspector = Inspector::new(&settings)?;
    let reporter = Reporter::new(Arc::new(ConsoleSink));

    // Ctrl-C stops the analysis instead of killing the process mid-output
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling analysis");
            on_interrupt.cancel();
        }
    });

    let result = inspector.inspect(url, &reporter, &cancel).await;
    eprintln!();

    print_results(&result, json)?;

    Ok(exit_code(&result))
}

fn exit_code(result: &AnalysisResult) -> i32 {
    if !result.is_ok() {
        2
    } else if result.unreachable_link_count > 0 {
        1
    } else {
        0
    }
}

// Prints the result either as a table or JSON
fn print_results(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(result)?;
        println!("{}", json_output);
    } else {
        print_table(result);
    }
    Ok(())
}

fn print_table(result: &AnalysisResult) {
    if let Some(error) = &result.error {
        println!("❌ {}: {}", result.source_url, error);
        return;
    }

    println!("{:<24} {}", "URL", result.source_url);
    println!("{}", "=".repeat(72));
    println!("{:<24} {}", "Title", result.title);
    println!("{:<24} {}", "HTML version", result.markup_version);
    for (level, count) in &result.heading_counts {
        println!("{:<24} {}", format!("Headings h{}", level), count);
    }
    println!("{:<24} {}", "Login form", if result.has_login_form { "yes" } else { "no" });
    println!();

    println!("📊 Links:");
    println!("   🏠 Internal: {}", result.internal_link_count);
    println!("   🌐 External: {}", result.external_link_count);
    println!("   ❌ Unreachable: {}", result.unreachable_link_count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let ok = AnalysisResult::default();
        assert_eq!(exit_code(&ok), 0);

        let broken = AnalysisResult {
            external_link_count: 2,
            unreachable_link_count: 1,
            ..AnalysisResult::default()
        };
        assert_eq!(exit_code(&broken), 1);

        let failed = AnalysisResult::failed("http://x.example", "Not Found");
        assert_eq!(exit_code(&failed), 2);
    }
}
