// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront - a conversational shop bot for Telegram.
//!
//! This is the binary entry point.

mod commands;
mod serve;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storefront_config::StorefrontConfig;
use storefront_engine::StatsPreset;

/// Storefront - a conversational shop bot for Telegram.
#[derive(Parser, Debug)]
#[command(name = "storefront", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bot (default).
    Serve,
    /// Schedule a message to a chat.
    Notify {
        /// Target chat ID.
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,
        /// Message text (HTML).
        #[arg(long)]
        text: String,
        /// Delivery time as "YYYY-MM-DD HH:MM" local time. Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// List scheduled notifications that were not sent yet.
    Pending,
    /// Print the sales report for a period.
    Stats {
        /// One of 7, 30 or month.
        #[arg(long, default_value = "7", value_parser = commands::parse_preset)]
        preset: StatsPreset,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => storefront_config::load_and_validate_path(path),
        None => storefront_config::load_and_validate(),
    };
    let config: StorefrontConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            storefront_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Notify { chat_id, text, at } => {
            commands::run_notify(&config, chat_id, &text, at.as_deref())
                .await
                .map(|line| println!("{line}"))
        }
        Commands::Pending => commands::run_pending(&config)
            .await
            .map(|listing| println!("{listing}")),
        Commands::Stats { preset } => commands::run_stats(&config, preset)
            .await
            .map(|report| println!("{report}")),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["storefront"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn notify_arguments_parse() {
        let cli = Cli::try_parse_from([
            "storefront",
            "notify",
            "--chat-id",
            "-42",
            "--text",
            "Sale today",
            "--at",
            "2026-03-08 09:00",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Notify { chat_id, text, at }) => {
                assert_eq!(chat_id, -42);
                assert_eq!(text, "Sale today");
                assert_eq!(at.as_deref(), Some("2026-03-08 09:00"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn stats_preset_is_validated() {
        let cli = Cli::try_parse_from(["storefront", "stats", "--preset", "month"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Stats {
                preset: StatsPreset::ThisMonth
            })
        ));
        assert!(Cli::try_parse_from(["storefront", "stats", "--preset", "year"]).is_err());
    }

    #[test]
    fn pending_takes_no_arguments() {
        let cli = Cli::try_parse_from(["storefront", "pending"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Pending)));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = storefront_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.shop.currency, "RSD");
    }
}
