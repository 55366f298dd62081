use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    config::BackendConfig,
    error::ForecastError,
    model::{Query, RawForecast},
};

use super::ForecastSource;

/// Forecast service reached over HTTP. One attempt per query, no retries.
#[derive(Debug, Clone)]
pub struct BackendSource {
    forecast_url: Url,
    health_url: Url,
    http: Client,
}

#[derive(Debug, Serialize)]
struct ForecastPayload<'a> {
    location: &'a str,
    date: String,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl BackendSource {
    pub fn new(forecast_url: Url, health_url: Url) -> Self {
        Self { forecast_url, health_url, http: Client::new() }
    }

    pub fn from_config(config: &BackendConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.forecast_url()?, config.health_url()?))
    }

    /// Ask the service whether it is up; returns its status line.
    pub async fn health(&self) -> Result<String, ForecastError> {
        let res = self.http.get(self.health_url.clone()).send().await?;
        let body = read_success(res).await?;
        let parsed: HealthResponse = serde_json::from_str(&body)?;
        Ok(parsed.status)
    }
}

/// Body of a 2xx response, or a `Backend` error carrying the status.
async fn read_success(res: Response) -> Result<String, ForecastError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ForecastError::Backend {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    Ok(res.text().await?)
}

#[async_trait]
impl ForecastSource for BackendSource {
    async fn produce(&self, query: &Query) -> Result<Option<RawForecast>, ForecastError> {
        let payload = ForecastPayload { location: &query.location, date: query.iso_instant() };

        tracing::debug!(url = %self.forecast_url, date = %payload.date, "requesting forecast");

        // `.json()` sets `Content-Type: application/json`.
        let res = self.http.post(self.forecast_url.clone()).json(&payload).send().await?;
        let body = read_success(res).await?;

        let parsed: Option<RawForecast> = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}
