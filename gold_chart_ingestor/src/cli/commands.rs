use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::request_params::{PriceMode, SeriesShape, ValidationPolicy};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to an optional endpoint config file (TOML); built-in
    /// defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Jual,
    Buyback,
}

impl From<ModeArg> for PriceMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Jual => PriceMode::Jual,
            ModeArg::Buyback => PriceMode::Buyback,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    /// One start timestamp plus consecutive daily prices
    Dense,
    /// Self-dated tuples with multiple value columns
    Points,
}

impl ShapeArg {
    pub fn into_shape(self, column_index: usize) -> SeriesShape {
        match self {
            ShapeArg::Dense => SeriesShape::DenseRun,
            ShapeArg::Points => SeriesShape::PointList { column_index },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Fail the parse on the first invalid price value
    Strict,
    /// Drop invalid values and keep going
    Skip,
}

impl From<PolicyArg> for ValidationPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Strict => ValidationPolicy::Strict,
            PolicyArg::Skip => ValidationPolicy::SkipInvalid,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Xlsx,
    Both,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the chart series and export it
    Fetch {
        /// Price side: jual (sell) or buyback
        #[arg(long, value_enum, default_value = "jual")]
        mode: ModeArg,

        /// Series name as the endpoint knows it
        #[arg(long, default_value = "GOLD")]
        series: String,

        /// Range in days (site presets: 7, 30, 90, 180, 365)
        #[arg(long, default_value_t = 365)]
        days: u32,

        /// Expected envelope shape
        #[arg(long, value_enum, default_value = "dense")]
        shape: ShapeArg,

        /// Value column for the points shape
        #[arg(long, default_value_t = 1)]
        column_index: usize,

        /// Handling of invalid price values
        #[arg(long, value_enum, default_value = "strict")]
        policy: PolicyArg,

        /// Which file formats to write
        #[arg(long, value_enum, default_value = "both")]
        format: FormatArg,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Override the price column header (default: harga, or
        /// harga_buyback for buyback fetches)
        #[arg(long)]
        price_header: Option<String>,

        /// Override the configured admin-ajax action name
        #[arg(long)]
        action: Option<String>,

        /// Echo the outbound form pairs and a snippet of the raw body
        #[arg(long)]
        debug: bool,
    },
}
