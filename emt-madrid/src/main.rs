use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emt_madrid::domain::{Stop, StopId};
use emt_madrid::emt::{Credentials, EmtApiRepository, EmtConfig};
use emt_madrid::session::{EmtClient, fetch_stops};

#[derive(Parser)]
#[command(name = "emt-madrid")]
#[command(about = "Bus stop information and arrival times from EMT Madrid.")]
struct CommandLine {
    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a stop with the next arrivals of its lines
    Arrivals {
        stop_id: StopId,
        /// Only show these lines
        lines: Vec<String>,
    },
    /// Look up a range of stops and print them as JSON
    Stops {
        from: StopId,
        to: StopId,
        /// Lookups in flight at once
        #[arg(long, default_value_t = 10)]
        concurrency: usize,
    },
}

#[derive(Serialize)]
struct StopLookup<'a> {
    stop_id: StopId,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a Stop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(CommandLine::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CommandLine) -> Result<(), Box<dyn std::error::Error>> {
    let email = std::env::var("EMT_API_EMAIL").unwrap_or_default();
    let password = std::env::var("EMT_API_PASSWORD").unwrap_or_default();
    let credentials = Credentials::new(email, password)?;

    let mut config = EmtConfig::default().with_timeout(args.timeout);
    if let Ok(url) = std::env::var("EMT_API_BASE_URL") {
        config = config.with_base_url(url);
    }

    match args.command {
        Commands::Arrivals { stop_id, lines } => {
            let mut client = EmtClient::connect(credentials, stop_id, &config)?.with_lines(lines);
            let stop = client.get_arrivals().await?;
            println!("{stop}");
        }
        Commands::Stops {
            from,
            to,
            concurrency,
        } => {
            let config = config.with_max_concurrent(concurrency);
            let repository = EmtApiRepository::connect(credentials, &config)?;
            let results = fetch_stops(&repository, from..=to, concurrency).await;

            let lookups: Vec<StopLookup<'_>> = results
                .iter()
                .map(|(stop_id, result)| StopLookup {
                    stop_id: *stop_id,
                    stop: result.as_ref().ok(),
                    error: result.as_ref().err().map(ToString::to_string),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&lookups)?);
        }
    }

    Ok(())
}
