use thiserror::Error;

use crate::config::ConfigError;
use crate::io::sink::SinkError;
use crate::providers::{ProviderError, ProviderInitError};

/// The unified error type for the `gold_chart_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the chart provider (transport,
    /// classification, or payload shape).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// An error during provider construction.
    #[error("Provider initialization error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// An error originating from an export sink.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
