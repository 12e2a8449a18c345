mod cli;

use std::io::Write;

use clap::Parser;
use cli::{Cli, Commands};
use cloudledger::api;
use cloudledger::backend::{CloudStorageBackend, LedgerBackend, Range};
use cloudledger::config::Config;
use cloudledger::observability::init_tracing;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    init_tracing("info");

    let cli = Cli::parse();
    let mut config = Config::load_optional(cli.config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    match cli.command {
        Commands::Server(args) => {
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            api::run(config, shutdown).await?;
        }
        Commands::Latest => {
            let backend = CloudStorageBackend::from_config(&config)?;
            let sequence = backend.get_latest_ledger_sequence(&shutdown).await?;
            println!("{sequence}");
        }
        Commands::Get(args) => {
            let backend = CloudStorageBackend::from_config(&config)?;
            let ledger = backend.get_ledger(args.sequence, &shutdown).await?;
            match args.output {
                Some(path) => {
                    tokio::fs::write(&path, ledger.as_bytes()).await?;
                    info!(sequence = args.sequence, bytes = ledger.len(), path = %path.display(), "Wrote ledger");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(ledger.as_bytes())?;
                    stdout.flush()?;
                }
            }
        }
        Commands::Key(args) => {
            println!("{}", config.partition.object_key(args.sequence)?);
        }
        Commands::Prepare(args) => {
            let range = match args.to {
                Some(to) => Range::bounded(args.from, to),
                None => Range::unbounded(args.from),
            };
            let backend = CloudStorageBackend::from_config(&config)?;
            backend.prepare_range(range, &shutdown).await?;
            println!("{range} ready");
        }
    }

    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
