//! subprofiler CLI
//!
//! Profiles subreddits and writes one CSV per subreddit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use subprofiler::{
    error::{AppError, Result},
    models::{Config, TimeWindow},
    pipeline::{self, ProfileRequest},
    services::RedditClient,
    storage::LocalStorage,
    utils::CancelFlag,
};

/// subprofiler - where else do a subreddit's members hang out?
#[derive(Parser, Debug)]
#[command(name = "subprofiler", version, about = "Subreddit participant profiler")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "subprofiler.toml")]
    config: PathBuf,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile one or more subreddits
    Profile {
        /// Subreddit names, with or without the r/ prefix
        #[arg(required = true)]
        subreddits: Vec<String>,

        /// Lookback for the subreddit's top posts (hour, day, week, month, year, all)
        #[arg(long)]
        subreddit_window: Option<String>,

        /// Lookback for each redditor's history (hour, day, week, month, year, all)
        #[arg(long)]
        redditor_window: Option<String>,

        /// Add NSFW and subscriber columns
        #[arg(short, long)]
        verbose: bool,

        /// Output file name (single subreddit only; default: <subreddit>.csv)
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to write exports into
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging from the verbosity flags, falling back to `default_level`.
fn init_logging(cli: &Cli, default_level: &str) {
    let level = if cli.debug {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        default_level
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Raise `cancel` on the first Ctrl+C; exit on the second.
fn install_interrupt_handler(cancel: &CancelFlag) -> Result<()> {
    let cancel = cancel.clone();
    ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            log::error!("Interrupted twice, exiting now");
            std::process::exit(130);
        }
        log::warn!("Interrupt received; stopping after the current request...");
        cancel.cancel();
    })
    .map_err(|e| AppError::config(format!("Failed to set Ctrl+C handler: {e}")))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let default_level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&cli, &default_level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Profile {
            subreddits,
            subreddit_window,
            redditor_window,
            verbose,
            output,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.profile.output_dir = dir.to_string_lossy().into_owned();
            }
            config.validate()?;

            let mut request = ProfileRequest::from_config(&config, subreddits);
            if let Some(label) = subreddit_window {
                request.subreddit_window =
                    TimeWindow::coerce(&label, TimeWindow::SUBREDDIT_DEFAULT);
            }
            if let Some(label) = redditor_window {
                request.redditor_window =
                    TimeWindow::coerce(&label, TimeWindow::REDDITOR_DEFAULT);
            }
            request.verbose |= verbose;
            request.output = output;

            let cancel = CancelFlag::new();
            install_interrupt_handler(&cancel)?;

            let client = RedditClient::new(&config.reddit)?;
            let storage = LocalStorage::new(&config.profile.output_dir);

            log::info!(
                "Profiling {} subreddit(s) into {}: top posts of the last '{}', redditor history of the last '{}'",
                request.targets.len(),
                storage.root_dir().display(),
                request.subreddit_window,
                request.redditor_window
            );

            let exports = pipeline::run_profiles(&request, &client, &storage, cancel).await?;

            for export in &exports {
                log::info!(
                    "r/{}: {} subreddits -> {}{}",
                    export.subreddit,
                    export.rows,
                    export.path.display(),
                    if export.cancelled { " (partial)" } else { "" }
                );
            }
            log::info!("Analysis complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} access)",
                if config.reddit.credentials().is_some() {
                    "OAuth"
                } else {
                    "anonymous"
                }
            );
        }
    }

    Ok(())
}
