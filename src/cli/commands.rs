// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `explore` and `train`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, PathBuf, enums)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::{explore_use_case::DataConfig, train_use_case::TrainConfig};
use crate::data::encoder::ScalingFit;
use crate::data::loader::DEFAULT_DATASET_URL;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the dataset and render the descriptive charts
    Explore(DataArgs),

    /// Run the whole pipeline: charts, encoding, training, evaluation
    Train(TrainArgs),
}

/// Flags shared by every command
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Local customer CSV; when absent the dataset is downloaded
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Remote CSV location used when --csv is not given
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    pub url: String,

    /// Where downloaded files are cached
    #[arg(long, default_value = "data")]
    pub cache_dir: PathBuf,

    /// Where charts, metrics and JSON artifacts are written
    #[arg(long, default_value = "output")]
    pub out_dir: PathBuf,
}

/// How the min-max scalers are fitted
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ScalingArg {
    /// Fit on the training rows only
    TrainOnly,
    /// Fit on every row before splitting
    FullDataset,
}

impl From<ScalingArg> for ScalingFit {
    fn from(a: ScalingArg) -> Self {
        match a {
            ScalingArg::TrainOnly   => ScalingFit::TrainOnly,
            ScalingArg::FullDataset => ScalingFit::FullDataset,
        }
    }
}

/// All arguments for the `train` command
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Full passes over the training rows
    #[arg(long, default_value_t = 32)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Fraction of rows (taken from the end of the file) held out for testing
    #[arg(long, default_value_t = 0.1)]
    pub test_size: f64,

    /// Fraction of the training rows held out for per-epoch validation
    #[arg(long, default_value_t = 0.1)]
    pub validation_split: f64,

    /// Seeds weight init and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = ScalingArg::TrainOnly)]
    pub scaling: ScalingArg,

    /// Write only metrics and JSON, no SVG charts
    #[arg(long)]
    pub skip_charts: bool,
}

/// Boundary between Layer 1 and Layer 2:
/// the application layer never sees clap types.
impl From<DataArgs> for DataConfig {
    fn from(a: DataArgs) -> Self {
        DataConfig {
            csv_path:  a.csv,
            url:       a.url,
            cache_dir: a.cache_dir,
            out_dir:   a.out_dir,
        }
    }
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data:             a.data.into(),
            epochs:           a.epochs,
            batch_size:       a.batch_size,
            learning_rate:    a.lr,
            test_size:        a.test_size,
            validation_split: a.validation_split,
            seed:             a.seed,
            scaling:          a.scaling.into(),
            skip_charts:      a.skip_charts,
        }
    }
}
