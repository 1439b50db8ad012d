//! Gaze point estimation: replay a recorded tracking session and report where the user looked.

use anyhow::{Context, Result};
use clap::Parser;
use gaze_point_estimation::{
    app::{AppConfig, GazeApp},
    config::{Config, EXAMPLE_CONFIG},
    pipeline::MissingEyeFallback,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded tracking session (YAML)
    #[arg(short, long, required_unless_present = "print_config")]
    session: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Device class (phone, tablet, auto, custom); overrides the config file
    #[arg(long)]
    device: Option<String>,

    /// Display width in points for --device auto
    #[arg(long)]
    screen_width: Option<f64>,

    /// Smoothing window size; overrides the config file
    #[arg(short, long)]
    window: Option<usize>,

    /// Contribution of an eye that misses the display (last_sample, zero)
    #[arg(long)]
    fallback: Option<String>,

    /// Clear smoothing history whenever tracking starts
    #[arg(long)]
    reset_on_start: bool,

    /// Print every gaze point
    #[arg(short, long)]
    verbose: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Gaze Point Estimation");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    // Command line overrides
    if let Some(device) = args.device {
        config.display.device = device;
    }
    if let Some(width) = args.screen_width {
        config.display.screen_width_points = Some(width);
    }
    if let Some(window) = args.window {
        config.smoothing.window_size = window;
    }
    if let Some(fallback) = args.fallback {
        config.gaze.missing_eye_fallback = match fallback.as_str() {
            "zero" => MissingEyeFallback::Zero,
            "last_sample" | "last" => MissingEyeFallback::LastSample,
            other => anyhow::bail!("Unknown fallback: {other}"),
        };
    }
    if args.reset_on_start {
        config.session.reset_on_start = true;
    }
    config.validate().context("Invalid configuration")?;

    let session_path = args.session.context("--session is required")?;

    // Create and run application
    let mut app = GazeApp::new(AppConfig {
        session_path,
        config,
        verbose: args.verbose,
    })?;
    let reports = app.run()?;

    match reports.last() {
        Some(last) => info!(
            "Final gaze point ({:.1}, {:.1}), marker at {:?}",
            last.point.x, last.point.y, last.marker
        ),
        None => warn!("No gaze point was produced"),
    }

    Ok(())
}
