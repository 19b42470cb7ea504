// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - analyze: run one page analysis in the terminal
// - serve:   run the web front end with the live progress stream
//
// Timing flags can also come from environment variables (clap's `env`
// feature), which is handy when the server runs in a container.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(
    name = "page-inspector",
    version,
    about = "Analyze a web page's structure and check its external links",
    long_about = "page-inspector fetches a single page, reports its title, doctype, heading counts \
                  and login form, classifies its links and probes external ones for reachability."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one page and print the result
    ///
    /// Example: page-inspector analyze https://example.com --json
    Analyze {
        /// Page URL (must be http or https)
        url: String,

        /// Output the result in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        budget: BudgetArgs,
    },

    /// Serve the web front end
    ///
    /// Example: page-inspector serve --addr 0.0.0.0:8080
    Serve {
        /// Address to listen on
        #[arg(long, env = "PAGE_INSPECTOR_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        /// Events buffered per progress subscriber before new ones are dropped
        #[arg(long, default_value_t = 64)]
        subscriber_buffer: usize,

        #[command(flatten)]
        budget: BudgetArgs,
    },
}

/// Time limits shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct BudgetArgs {
    /// Overall time budget for one page analysis, in seconds
    #[arg(long, env = "PAGE_INSPECTOR_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Timeout for fetching the page itself, in seconds
    #[arg(long, default_value_t = 10)]
    pub fetch_timeout_secs: u64,

    /// Timeout for each external link probe, in seconds
    #[arg(long, env = "PAGE_INSPECTOR_PROBE_TIMEOUT_SECS", default_value_t = 10)]
    pub probe_timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["page-inspector", "analyze", "https://example.com"]).unwrap();
        match cli.command {
            Commands::Analyze { url, json, budget } => {
                assert_eq!(url, "https://example.com");
                assert!(!json);
                assert_eq!(budget.timeout_secs, 30);
                assert_eq!(budget.probe_timeout_secs, 10);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_with_flags() {
        let cli = Cli::try_parse_from([
            "page-inspector",
            "-v",
            "serve",
            "--addr",
            "0.0.0.0:9000",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Serve { addr, budget, .. } => {
                assert_eq!(addr.port(), 9000);
                assert_eq!(budget.timeout_secs, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
