// Anomaly calibrator CLI: load a signal, inject anomalies, plot them.
//
// Build: `cargo run --release -- dataset --input data.csv`

use anomaly_calibrator::{load_signal, AnomalyCalibrator, CalibratorConfig, ForecastClient};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "anomaly-calibrator")]
#[command(about = "Synthesize labeled time-series anomalies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Local-mean half-width
    #[arg(long, global = true)]
    window: Option<usize>,

    /// Folder for generated images
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Inject a single anomaly and plot it against the original
    Inject {
        /// CSV with the base signal
        #[arg(short, long)]
        input: PathBuf,

        /// Index to perturb (random if omitted)
        #[arg(short, long)]
        position: Option<usize>,

        /// Fraction of the local mean to add (random if omitted)
        #[arg(short, long, allow_hyphen_values = true)]
        threshold: Option<f64>,
    },

    /// Build a batch of anomalous variants and overlay them
    Dataset {
        /// CSV with the base signal
        #[arg(short, long)]
        input: PathBuf,

        /// Rows to generate
        #[arg(short, long)]
        num_locations: Option<usize>,

        #[arg(long)]
        min_location: Option<f64>,

        #[arg(long)]
        max_location: Option<f64>,

        /// Shared threshold for every row (random if omitted)
        #[arg(short, long, allow_hyphen_values = true)]
        threshold: Option<f64>,
    },

    /// Check that the forecasting service credentials can be loaded
    ForecastKey {
        /// Dotenv file to read when NIXTLA_API_KEY is not set
        #[arg(long)]
        env_file: Option<PathBuf>,
    },
}

fn parse_log_level(level: &str) -> Result<Level> {
    level
        .parse::<Level>()
        .map_err(|_| anyhow!("Invalid log level '{}' (expected trace, debug, info, warn or error)", level))
}

fn init_tracing(level: &str) -> Result<()> {
    let level = parse_log_level(level)?;
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CalibratorConfig> {
    let mut config = match &cli.config {
        Some(path) => CalibratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {:?}", path))?,
        None => CalibratorConfig::default(),
    };
    config.apply_env_overrides()?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(window) = cli.window {
        config.window = window;
    }
    if let Some(dir) = &cli.output_dir {
        config.image_folder = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_signal(input: &Path, config: &CalibratorConfig) -> Result<ndarray::Array1<f64>> {
    let signal = load_signal(input, &config.value_column, config.datetime_column.as_deref())
        .with_context(|| format!("Failed to load signal from {:?}", input))?;
    info!("Loaded {} samples from column '{}'", signal.len(), config.value_column);
    Ok(signal)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    let mut config = load_config(&cli)?;

    match &cli.command {
        Commands::Inject { input, position, threshold } => {
            let signal = read_signal(input, &config)?;
            let mut calibrator = AnomalyCalibrator::new(signal, &config)?;
            calibrator.inject_anomaly(*position, *threshold)?;
            let path = calibrator.plot()?;
            println!("Wrote plot: {}", path.display());
        }

        Commands::Dataset { input, num_locations, min_location, max_location, threshold } => {
            if let Some(k) = num_locations { config.num_locations = *k; }
            if let Some(lo) = min_location { config.min_location = *lo; }
            if let Some(hi) = max_location { config.max_location = *hi; }
            if threshold.is_some() { config.threshold = *threshold; }
            config.validate()?;

            let signal = read_signal(input, &config)?;
            let mut calibrator = AnomalyCalibrator::new(signal, &config)?;
            let dataset = calibrator.build_default_dataset()?;
            println!(
                "Built {} anomalous variants (threshold {:.3}) at positions {:?}",
                dataset.n_rows(),
                dataset.threshold,
                dataset.positions
            );
            let path = calibrator.plot_dataset(&dataset)?;
            println!("Wrote plot: {}", path.display());
        }

        Commands::ForecastKey { env_file } => {
            let client = match env_file {
                Some(path) => ForecastClient::from_env_file(path)?,
                None => ForecastClient::from_env()?,
            };
            println!("Forecast client ready for {} ({:?})", client.base_url(), client);
        }
    }

    Ok(())
}
