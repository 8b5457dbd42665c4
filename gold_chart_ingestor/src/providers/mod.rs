//! Provider abstraction for chart data sources.
//!
//! This module defines the [`ChartProvider`] trait, a unified interface
//! for fetching a normalized price series from a chart endpoint. The one
//! concrete implementation is [`ubs_ajax::provider::UbsAjaxProvider`];
//! the trait keeps the fetch seam mockable and leaves room for sibling
//! endpoints that serve the same envelope shapes.

pub mod ubs_ajax;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{chart_series::ChartSeries, request_params::ChartRequestParams};
use crate::providers::ubs_ajax::response::SeriesFormatError;

/// Trait for fetching a normalized chart series from a data source.
#[async_trait]
pub trait ChartProvider {
    /// Fetches and normalizes the series described by `params`.
    ///
    /// # Returns
    ///
    /// * `Ok(ChartSeries)` - the reconstructed series, ascending by date.
    /// * `Err(ProviderError)` - transport, classification, or payload failure.
    async fn fetch_chart(&self, params: ChartRequestParams)
    -> Result<ChartSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A configured header value contains invalid characters.
    #[snafu(display("Invalid header value in endpoint config: {source}"))]
    InvalidHeader {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a [`ChartProvider`] implementation.
///
/// Every variant carries enough raw context (status, snippet, parameters)
/// for manual diagnosis; the upstream contract can change without notice.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// Transport-level failure that survived the bounded retry loop.
    #[snafu(display("Request failed after {attempts} attempt(s): {source}"))]
    Reqwest {
        attempts: u32,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The endpoint answered with a non-200 status. Never retried.
    #[snafu(display("HTTP {status} | CT={content_type}\nSnippet:\n{snippet}"))]
    Status {
        status: u16,
        content_type: String,
        snippet: String,
        backtrace: Backtrace,
    },

    /// The body is an HTML document where JSON was expected, the usual
    /// signature of an anti-automation block or a changed endpoint.
    #[snafu(display(
        "Response is an HTML document where JSON was expected \
         (likely blocked, or the endpoint format changed).\nSnippet:\n{snippet}"
    ))]
    HtmlBlocked {
        snippet: String,
        backtrace: Backtrace,
    },

    /// The body was classified as JSON but did not parse, and carries no
    /// HTML signature.
    #[snafu(display("Response did not parse as JSON: {source}\nSnippet:\n{snippet}"))]
    Json {
        snippet: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// JSON parsed, but the envelope violates the selected shape.
    #[snafu(display("Unsupported envelope: {source}"))]
    Series {
        source: SeriesFormatError,
        backtrace: Backtrace,
    },
}
