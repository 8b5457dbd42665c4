//! HTTP transport for the admin-ajax chart endpoint.

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::Value;
use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::config::EndpointConfig;
use crate::models::{
    chart_series::ChartSeries,
    request_params::{ChartRequestParams, SeriesShape},
};
use crate::providers::{
    ChartProvider, ClientBuildSnafu, HtmlBlockedSnafu, InvalidHeaderSnafu, JsonSnafu,
    ProviderError, ProviderInitError, ReqwestSnafu, SeriesSnafu, StatusSnafu,
};

use super::{params, response};

/// A raw HTTP exchange, before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Fetches chart data from the UBS Lifestyle admin-ajax action.
///
/// One instance holds one configured [`reqwest::Client`] with the fixed
/// browser-like header set and the per-request timeout; each fetch is an
/// independent, stateless POST.
pub struct UbsAjaxProvider {
    client: Client,
    config: EndpointConfig,
}

impl UbsAjaxProvider {
    /// Creates a provider from an endpoint configuration.
    pub fn new(config: EndpointConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::ORIGIN,
            header::HeaderValue::from_str(&config.origin).context(InvalidHeaderSnafu)?,
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&config.referer).context(InvalidHeaderSnafu)?,
        );
        headers.insert(
            "X-Requested-With",
            header::HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self { client, config })
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Performs the POST and returns the raw exchange.
    ///
    /// Transport-level failures are retried up to the configured attempt
    /// count with linear backoff. A non-200 status or an unparseable body
    /// is returned untouched for the caller to classify, never retried.
    pub async fn fetch_raw(
        &self,
        params: &ChartRequestParams,
    ) -> Result<RawResponse, ProviderError> {
        let form = params::build_form(&self.config, params);
        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            debug!(attempt, url = %self.config.ajax_url, "posting chart request");
            match self.client.post(&self.config.ajax_url).form(&form).send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let content_type = resp
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body = resp
                        .text()
                        .await
                        .context(ReqwestSnafu { attempts: attempt })?;
                    return Ok(RawResponse {
                        status,
                        content_type,
                        body,
                    });
                }
                Err(err) if attempt < max_attempts => {
                    let delay = self.config.retry.backoff(attempt);
                    warn!(attempt, error = %err, ?delay, "transport error, backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(err).context(ReqwestSnafu { attempts: attempt });
                }
            }
        }
    }

    /// Classifies and parses a raw exchange into the JSON envelope.
    pub fn envelope_from_raw(raw: &RawResponse) -> Result<Value, ProviderError> {
        if raw.status != 200 {
            return StatusSnafu {
                status: raw.status,
                content_type: raw.content_type.clone(),
                snippet: response::snippet(&raw.body).to_owned(),
            }
            .fail();
        }
        match response::classify_body(&raw.content_type, &raw.body) {
            response::BodyClass::Html => HtmlBlockedSnafu {
                snippet: response::snippet(&raw.body).to_owned(),
            }
            .fail(),
            // `Other` still gets a parse attempt: the endpoint has been
            // seen lying about its content type in both directions.
            response::BodyClass::Json | response::BodyClass::Other => {
                serde_json::from_str(raw.body.trim()).context(JsonSnafu {
                    snippet: response::snippet(&raw.body).to_owned(),
                })
            }
        }
    }

    /// Parses a raw exchange into the normalized series.
    ///
    /// Split out from [`fetch_series`](Self::fetch_series) so the CLI's
    /// debug mode and tests can work from a captured exchange without a
    /// second request.
    pub fn series_from_raw(
        raw: &RawResponse,
        params: &ChartRequestParams,
    ) -> Result<ChartSeries, ProviderError> {
        let envelope = Self::envelope_from_raw(raw)?;
        let points = match params.shape {
            SeriesShape::DenseRun => response::parse_dense_run(&envelope, params.policy),
            SeriesShape::PointList { column_index } => {
                response::parse_point_list(&envelope, column_index, params.policy)
            }
        }
        .context(SeriesSnafu)?;
        let name = response::series_name(&envelope)
            .unwrap_or(&params.series)
            .to_string();
        Ok(ChartSeries { name, points })
    }

    /// Fetch, classify, and parse in one call.
    pub async fn fetch_series(
        &self,
        params: &ChartRequestParams,
    ) -> Result<ChartSeries, ProviderError> {
        let raw = self.fetch_raw(params).await?;
        let series = Self::series_from_raw(&raw, params)?;
        info!(rows = series.points.len(), series = %series.name, "parsed chart series");
        Ok(series)
    }
}

#[async_trait]
impl ChartProvider for UbsAjaxProvider {
    async fn fetch_chart(
        &self,
        params: ChartRequestParams,
    ) -> Result<ChartSeries, ProviderError> {
        self.fetch_series(&params).await
    }
}
