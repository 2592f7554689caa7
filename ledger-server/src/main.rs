use ledger_server::{LedgerConfig, LedgerServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
usage: ledger-server [--config <PATH>] [--help]

Serves account balances, holdings and orders on /api/v1.

  --config <PATH>   JSON configuration file (defaults apply when omitted)
  --help            Show this message

Environment overrides: HOST, PORT or HTTP_PORT, LEDGER_STORE (memory|postgres),
DATABASE_URL, RUST_LOG.";

#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Serve { config: Option<PathBuf> },
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, String> {
    let mut config = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Invocation::Help),
            "--config" => {
                let path = args.next().ok_or("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }

    Ok(Invocation::Serve { config })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(Invocation::Serve { config }) => config,
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledger_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &config_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            LedgerConfig::from_file(path)?
        }
        None => LedgerConfig::default(),
    };
    config.apply_env()?;

    let server = LedgerServer::from_config(config).await?;
    tracing::info!(
        backend = %server.config.store.backend,
        address = %server.config.bind_address(),
        "starting mini ledger"
    );

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_arguments_serves_with_defaults() {
        assert_eq!(
            parse_args(args(&[])),
            Ok(Invocation::Serve { config: None })
        );
    }

    #[test]
    fn test_config_path() {
        assert_eq!(
            parse_args(args(&["--config", "ledger.json"])),
            Ok(Invocation::Serve {
                config: Some(PathBuf::from("ledger.json"))
            })
        );
        assert!(parse_args(args(&["--config"])).is_err());
    }

    #[test]
    fn test_help_and_unknown_flags() {
        assert_eq!(parse_args(args(&["--help"])), Ok(Invocation::Help));
        assert_eq!(
            parse_args(args(&["--port", "80"])),
            Err("unknown argument: --port".to_string())
        );
    }
}
