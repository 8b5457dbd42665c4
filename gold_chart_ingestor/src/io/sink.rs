use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::chart_series::ChartSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The requested serialization backend is not compiled into this
    /// build. Other formats keep working.
    #[snafu(display(
        "Export backend `{backend}` is not available in this build \
         (enable the `{backend}` cargo feature)"
    ))]
    MissingBackend {
        backend: &'static str,
        backtrace: Backtrace,
    },

    /// An error occurred while serializing rows to CSV.
    #[snafu(display("Failed to serialize CSV: {source}"))]
    Csv {
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// An error occurred while building the spreadsheet workbook.
    #[snafu(display("Failed to build workbook: {message}"))]
    Workbook {
        message: String,
        backtrace: Backtrace,
    },

    /// A generic I/O error.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait SeriesSink {
    /// The type of output returned after a successful write operation.
    ///
    /// A file sink returns the path it created; an in-memory sink might
    /// return the serialized bytes instead.
    type Output;

    /// Writes one normalized series to the destination.
    async fn write(&self, series: &ChartSeries) -> Result<Self::Output, SinkError>;
}
