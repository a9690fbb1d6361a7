//! pinch-gesture - replay recorded hand landmark streams through the
//! gesture estimator.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pinch_gesture::gesture::{GestureConfig, GestureTracker};
use pinch_gesture::replay::{self, FrameSource, GestureSink, OutputFormat, TransitionLog, WriterSink};

#[derive(Parser, Debug)]
#[command(name = "pinch-gesture", about = "Pinch and pull gesture estimation from hand landmarks")]
struct Cli {
    /// JSON-lines landmark recording (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON file overriding any subset of the gesture tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output encoding
    #[arg(long, value_enum, default_value = "sexp")]
    format: OutputFormat,

    /// Only print frames where the grab or pull state changed
    #[arg(long)]
    transitions_only: bool,

    /// Smoothed pinch distance that starts a grab
    #[arg(long)]
    close_threshold: Option<f32>,

    /// Smoothed pinch distance that ends a grab
    #[arg(long)]
    open_threshold: Option<f32>,

    /// Consecutive frames required to commit a grab change
    #[arg(long)]
    debounce_frames: Option<u32>,

    /// Anchor position smoothing factor (0-1)
    #[arg(long)]
    position_smoothing: Option<f32>,

    /// Pinch distance smoothing factor (0-1)
    #[arg(long)]
    distance_smoothing: Option<f32>,

    /// Minimum hand separation for a pull
    #[arg(long)]
    min_pull_distance: Option<f32>,
}

impl Cli {
    /// Defaults, then the config file, then individual flags.
    fn gesture_config(&self) -> anyhow::Result<GestureConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open config {:?}", path))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("failed to parse config {:?}", path))?
            }
            None => GestureConfig::default(),
        };

        if let Some(v) = self.close_threshold {
            config.close_threshold = v;
        }
        if let Some(v) = self.open_threshold {
            config.open_threshold = v;
        }
        if let Some(v) = self.debounce_frames {
            config.debounce_frames = v;
        }
        if let Some(v) = self.position_smoothing {
            config.position_smoothing = v;
        }
        if let Some(v) = self.distance_smoothing {
            config.distance_smoothing = v;
        }
        if let Some(v) = self.min_pull_distance {
            config.min_pull_distance = v;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinch_gesture=info".into()),
        )
        .init();

    info!("pinch-gesture v{} starting", env!("CARGO_PKG_VERSION"));

    let config = cli.gesture_config()?;
    let mut tracker = GestureTracker::new(config).context("invalid gesture configuration")?;
    info!("config: {}", tracker.config().config_sexp());

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open input {:?}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout().lock();
    let mut writer = WriterSink::new(stdout, cli.format, cli.transitions_only);
    let mut log = TransitionLog::default();
    let mut sinks: [&mut dyn GestureSink; 2] = [&mut writer, &mut log];

    replay::run(FrameSource::new(reader), &mut tracker, &mut sinks)?;
    info!("final state: {}", tracker.status_sexp());
    Ok(())
}
