mod cli;
mod error;
mod metrics;
mod server;

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use modemex_api::{Modem, Registry};
use modemex_config::Config;

use crate::cli::{Cli, Command, ServeArgs};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        // Listing adapters needs no device configuration
        Command::Models => {
            for entry in Registry::global().entries() {
                println!("{}\t{}", entry.vendor, entry.model);
            }
            Ok(())
        }

        Command::Scrape => {
            let cfg = modemex_config::load_config(cli.global.config.as_deref())?;
            let modem = build_modem(&cfg)?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let counters = modem.read_counters(&cancel).await?;
            let exposition = metrics::Exposition::new(modem.info())?;
            print!("{}", exposition.render(&counters)?);
            Ok(())
        }

        Command::Serve(args) => {
            let mut cfg = modemex_config::load_config(cli.global.config.as_deref())?;
            if let Some(listen) = args.listen {
                cfg.listen = listen;
            }
            if let Some(port) = args.port {
                cfg.port = port;
            }

            let modem = build_modem(&cfg)?;
            server::serve(cfg.listen_addr(), modem).await?;
            Ok(())
        }
    }
}

/// Pick the adapter for the configured device and hand it its settings.
fn build_modem(cfg: &Config) -> Result<Arc<dyn Modem>, CliError> {
    let (vendor, model) = cfg.device()?;
    let registration = Registry::global().lookup(vendor, model)?;
    let modem = (registration.build)(cfg.to_modem_config()?)?;

    tracing::debug!(vendor, model, url = ?cfg.url, "adapter ready");
    Ok(Arc::from(modem))
}
