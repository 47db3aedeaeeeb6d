//! mediafetch - download media through yt-dlp with unified progress.

mod commands;
mod display;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::download::DownloadArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "mediafetch", version, about = "Download media through yt-dlp")]
struct Cli {
    /// Log at debug level, including raw yt-dlp output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download a URL
    Download {
        /// Media page URL
        url: String,

        /// Format id or selector (e.g., 137, bestvideo+bestaudio)
        #[arg(short, long)]
        format: Option<String>,

        /// Output path template (yt-dlp syntax)
        #[arg(short, long, value_name = "TEMPLATE")]
        output: Option<PathBuf>,

        /// Download identifier (defaults to a timestamp)
        #[arg(long)]
        id: Option<String>,

        /// Print yt-dlp output above the progress bar
        #[arg(long)]
        show_output: bool,
    },

    /// Show title and available formats for a URL
    Info {
        /// Media page URL
        url: String,
    },

    /// Check which yt-dlp executable will be used
    Check,

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config { command } => commands::config::run(command, config_path),
        Commands::Download {
            url,
            format,
            output,
            id,
            show_output,
        } => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            let args = DownloadArgs {
                url,
                format,
                output,
                id,
                show_output,
            };
            commands::download::run(args, &runner)
        }
        Commands::Info { url } => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::info::run(&url, &runner)
        }
        Commands::Check => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::check::run(&runner)
        }
    }
}
