use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use yrweather::{
    ForecastFetcher, HttpFetcher, PersistentStore, Place, PlaceStatus, Presenter, SystemClock,
    WeatherConfig, WeatherError, WeatherService, logging,
};

#[derive(Parser)]
#[command(name = "yrweather")]
#[command(version, about = "Weather forecasts for places from yr.no", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "YRWEATHER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the forecast of a place, refreshing it if due
    Show {
        /// Place id, e.g. geonames_2911298
        geoid: String,
        /// Number of days, 0 for all available
        #[arg(short, long)]
        days: Option<u32>,
        /// Every time range instead of one per day
        #[arg(long)]
        detailed: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add a place from its yr.no page, e.g. https://www.yr.no/place/Germany/Hamburg/Hamburg/
    AddPlace { url: String },
    /// Register a place without downloading its forecast
    SeedPlace {
        geoid: String,
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,
        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,
        #[arg(long)]
        country: String,
        #[arg(long)]
        name: String,
        /// Feed path below the country, e.g. Hamburg/Hamburg
        #[arg(long)]
        link: String,
    },
    /// Refresh places whose download is due
    Refresh {
        #[arg(required = true)]
        geoids: Vec<String>,
        /// Repeat every SECONDS instead of running once
        #[arg(long, value_name = "SECONDS")]
        every: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        match err.downcast_ref::<WeatherError>() {
            Some(weather_err) => eprintln!("{}", weather_err.user_message()),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = WeatherConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;

    let store = Arc::new(
        PersistentStore::open(&config.store.location)
            .with_context(|| format!("Failed to open store at {}", config.store.location))?,
    );
    let documents = Arc::new(HttpFetcher::new(&config.feed)?);
    let fetcher = ForecastFetcher::new(store.clone(), store, documents, &config.feed);
    let service = WeatherService::new(fetcher, Arc::new(SystemClock));

    match cli.command {
        Commands::Show {
            geoid,
            days,
            detailed,
            json,
        } => {
            let presenter = Presenter::new(config.display.clone(), config.feed.base_url.clone());
            let days = days.unwrap_or(config.display.forecast_days);
            let report = service.report(&geoid, days, detailed, &presenter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Commands::AddPlace { url } => {
            let place = service.add_place(&url).await?;
            println!("Added {place}");
        }
        Commands::SeedPlace {
            geoid,
            latitude,
            longitude,
            country,
            name,
            link,
        } => {
            let place = Place {
                geoid,
                latitude,
                longitude,
                country,
                name,
                link,
                status: PlaceStatus::Original,
            };
            let registered = place.to_string();
            service.seed_place(place).await?;
            println!("Registered {registered}");
        }
        Commands::Refresh { geoids, every } => loop {
            for (geoid, outcome) in service.refresh(&geoids).await {
                match outcome {
                    Ok(fresh) if fresh.fetch_succeeded => info!(
                        %geoid,
                        attempted = fresh.attempted,
                        next_attempt = %fresh.schedule.next_download_attempt,
                        "Place is up to date"
                    ),
                    Ok(fresh) => warn!(
                        %geoid,
                        next_attempt = %fresh.schedule.next_download_attempt,
                        warning = fresh.warning.as_deref().unwrap_or_default(),
                        "Refresh failed"
                    ),
                    Err(err) => error!(%geoid, error = %err, "Refresh failed"),
                }
            }
            match every {
                Some(seconds) => tokio::time::sleep(Duration::from_secs(seconds.max(1))).await,
                None => break,
            }
        },
    }

    Ok(())
}
