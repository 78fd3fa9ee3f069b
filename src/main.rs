//! smard_forecast CLI: baseline evaluation, training and forecasting for an
//! hourly generation series.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gen_forecast::artifacts::{load_metadata, load_model, save_metadata, save_model};
use gen_forecast::data::DataLoader;
use gen_forecast::forecast::ForecastPoint;
use gen_forecast::models::{GradientBoostingRegressor, TrainedGradientBoosting};
use gen_forecast::training::evaluate_baseline;
use gen_forecast::{ForecastConfig, RecursiveForecaster, TrainingHarness, FORECAST_UNIT};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "smard_forecast")]
#[command(author, version)]
#[command(about = "Train and serve hourly electricity-generation forecasts")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file; built-in defaults are used when absent
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the hourly data CSV
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Override the model artifact path
    #[arg(long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Override the metadata artifact path
    #[arg(long, value_name = "PATH")]
    metadata: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the seasonal naive baseline on the final week
    Baseline,
    /// Fit the model, evaluate it on the holdout and write both artifacts
    Train,
    /// Forecast the hours after the end of the data
    Forecast {
        /// Horizon in hours (1..=744)
        #[arg(long, conflicts_with = "days")]
        horizon: Option<usize>,

        /// Horizon in days (1..=31)
        #[arg(long)]
        days: Option<usize>,

        /// Also write the forecast table as CSV
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },
    /// Report which artifacts exist and print the last run's metadata
    Status,
}

#[derive(Serialize)]
struct ForecastResponse<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<usize>,
    horizon: usize,
    model_version: Option<String>,
    unit: &'static str,
    points: &'a [ForecastPoint],
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    model_exists: bool,
    data_exists: bool,
    meta_exists: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Baseline => handle_baseline(&config),
        Commands::Train => handle_train(&config),
        Commands::Forecast { horizon, days, csv } => handle_forecast(&config, horizon, days, csv),
        Commands::Status => handle_status(&config),
    }
}

fn load_config(cli: &Cli) -> Result<ForecastConfig> {
    let mut config = match &cli.config {
        Some(path) => ForecastConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ForecastConfig::default(),
    };

    if let Some(path) = &cli.data {
        config.data_path = path.clone();
    }
    if let Some(path) = &cli.model {
        config.model_path = path.clone();
    }
    if let Some(path) = &cli.metadata {
        config.metadata_path = path.clone();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn handle_baseline(config: &ForecastConfig) -> Result<()> {
    let series = DataLoader::from_csv(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    let eval = evaluate_baseline(&series, config.holdout_hours, config.season_period)
        .context("Baseline evaluation failed")?;

    println!("Test window: {} -> {}", eval.test_start, eval.test_end);
    println!("Baseline MAE: {:.2}", eval.mae);
    Ok(())
}

fn handle_train(config: &ForecastConfig) -> Result<()> {
    let series = DataLoader::from_csv(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    info!(hours = series.len(), observed = series.observed_count(), "loaded series");

    let regressor = GradientBoostingRegressor::new(config.boosting.clone())?;
    let outcome = TrainingHarness::new(regressor)
        .with_holdout(config.holdout_hours)
        .with_season_period(config.season_period)
        .with_model_version(config.model_version.clone())
        .with_data_file(config.data_path.display().to_string())
        .run(&series)
        .context("Training failed")?;

    save_model(&outcome.model, &config.model_path)
        .with_context(|| format!("Failed to write {}", config.model_path.display()))?;
    save_metadata(&outcome.metadata, &config.metadata_path)
        .with_context(|| format!("Failed to write {}", config.metadata_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&outcome.metadata)?);
    Ok(())
}

fn handle_forecast(
    config: &ForecastConfig,
    horizon: Option<usize>,
    days: Option<usize>,
    csv: Option<PathBuf>,
) -> Result<()> {
    // Reject bad requests before touching data or model
    let horizon = match days {
        Some(days) => config.horizon_for_days(days)?,
        None => config.validate_horizon(horizon.unwrap_or(24))?,
    };

    let series = DataLoader::from_csv(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    let model: TrainedGradientBoosting = load_model(&config.model_path)?;
    model
        .validate()
        .with_context(|| format!("Stale model {}", config.model_path.display()))?;
    let metadata = load_metadata(&config.metadata_path)?;
    if let Some(metadata) = &metadata {
        metadata.validate_schema()?;
    }

    let table = RecursiveForecaster::new(&model)
        .with_season_period(config.season_period)
        .with_gap_policy(config.gap_policy)
        .forecast(&series, horizon)
        .context("Forecast failed")?;

    if let Some(path) = csv {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        table.write_csv(file)?;
        info!(path = %path.display(), "wrote forecast csv");
    }

    let response = ForecastResponse {
        days,
        horizon,
        model_version: metadata.map(|m| m.model_version),
        unit: FORECAST_UNIT,
        points: table.points(),
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn handle_status(config: &ForecastConfig) -> Result<()> {
    let status = StatusResponse {
        status: "ok",
        model_exists: config.model_path.exists(),
        data_exists: config.data_path.exists(),
        meta_exists: config.metadata_path.exists(),
    };
    println!("{}", serde_json::to_string_pretty(&status)?);

    match load_metadata(&config.metadata_path)? {
        Some(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
        None => println!("{{}}"),
    }
    Ok(())
}
