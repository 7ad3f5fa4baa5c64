// McNotify - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (fatal on invalid required fields)
// 3. Logging initialisation (debug mode support)
// 4. Sink selection (Discord, or stdout with --dry-run)
// 5. Wiring: tailer thread -> dispatcher -> queue -> delivery loop
// 6. Ctrl-C shutdown

use clap::Parser;
use mcnotify::app::delivery::{DeliveryWorker, NotificationSink, StdoutSink};
use mcnotify::app::dispatch::Dispatcher;
use mcnotify::app::tail::{LogTailer, TailerSettings};
use mcnotify::app::tail_state;
use mcnotify::platform::config::{self, AppConfig, PlatformPaths};
use mcnotify::platform::discord::{self, DiscordSink};
use mcnotify::util::constants;
use mcnotify::util::error::NotifierError;
use mcnotify::util::logging;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// McNotify - Minecraft server activity notifier.
///
/// Follows the server's latest.log and posts player join, leave and death
/// notifications to a Discord channel.
#[derive(Parser, Debug)]
#[command(name = "mcnotify", version, about)]
struct Cli {
    /// Config file (TOML, or JSON when the extension is .json). Defaults to
    /// ./config.toml, then config.toml in the platform config directory.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Tail state file (overrides `state_path` from the config).
    #[arg(short = 's', long = "state")]
    state: Option<PathBuf>,

    /// Print notifications to stdout instead of sending them to Discord.
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let paths = PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| paths.default_config_file());

    let (config, warnings) = match config::load_config(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );
    tracing::debug!(
        config_dir = %paths.config_dir.display(),
        data_dir = %paths.data_dir.display(),
        "Platform paths resolved"
    );
    tracing::info!(path = %config_path.display(), "Loaded config file");
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = constants::APP_VERSION,
        log = %config.log_path.display(),
        dry_run = cli.dry_run,
        "McNotify starting"
    );

    let state_path = cli
        .state
        .clone()
        .or_else(|| config.state_path.clone())
        .unwrap_or_else(|| tail_state::state_path(&paths.data_dir));

    // The token never reaches the logs; only its absence is reported.
    let token = if cli.dry_run {
        None
    } else {
        match discord::load_token(
            Path::new(constants::DOTENV_FILE_NAME),
            constants::DISCORD_TOKEN_ENV,
        ) {
            Some(t) => Some(t),
            None => {
                eprintln!(
                    "Error: {} is not set. Export the bot token, put it in .env, or use --dry-run.",
                    constants::DISCORD_TOKEN_ENV
                );
                std::process::exit(2);
            }
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start async runtime");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(token, &config, state_path)) {
        tracing::error!(error = %e, "McNotify stopped with an error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Pick the sink and serve with it.
async fn run(
    token: Option<String>,
    config: &AppConfig,
    state_path: PathBuf,
) -> Result<(), NotifierError> {
    match token {
        None => serve(StdoutSink, config, state_path).await,
        Some(token) => {
            let sink = DiscordSink::new(&token, config.channel_id)?;
            serve(sink, config, state_path).await
        }
    }
}

/// Run the pipeline until Ctrl-C or until the tailer thread ends.
async fn serve<S: NotificationSink>(
    sink: S,
    config: &AppConfig,
    state_path: PathBuf,
) -> Result<(), NotifierError> {
    let mut worker = DeliveryWorker::new(sink, config.templates.clone());
    worker.ready().await?;

    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let mut dispatcher = Dispatcher::new(config.debounce, tx);

    let mut tailer = LogTailer::new(TailerSettings {
        log_path: config.log_path.clone(),
        state_path,
        start_from_end: config.start_from_end,
        poll_interval: config.poll_interval,
    });
    let stop = tailer.stop_handle();

    // The tailer only starts once the sink is ready, so the initial backlog
    // is not dropped against a queue nobody drains yet. The starting offset
    // is fixed here, before the thread exists.
    tailer.start();
    let handle = std::thread::Builder::new()
        .name("log-tailer".to_string())
        .spawn(move || {
            tailer.run(|event| {
                dispatcher.dispatch(event);
            });
        })
        .map_err(|source| NotifierError::Io {
            path: config.log_path.clone(),
            operation: "spawn tailer thread for",
            source,
        })?;

    tokio::select! {
        stats = worker.run(rx) => {
            tracing::warn!(
                delivered = stats.delivered,
                failed = stats.failed,
                "Delivery queue closed unexpectedly"
            );
        }
        () = shutdown_signal() => {
            tracing::info!("Shutdown requested");
        }
    }

    stop.stop();
    match tokio::task::spawn_blocking(move || handle.join()).await {
        Ok(Ok(())) => {}
        _ => tracing::error!("Log tailer thread panicked"),
    }

    tracing::info!("McNotify stopped");
    Ok(())
}

/// Resolve on Ctrl-C. If the handler cannot be installed, never resolve so
/// the process keeps serving.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
