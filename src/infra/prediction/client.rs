use async_trait::async_trait;
use reqwest::{Method, Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AnalyticsError, Result};
use crate::fetch::{BasicClient, HttpClient, fetch_json};
use crate::services::prediction_api::{Comparison, Forecast, PredictionApi};

#[derive(Serialize)]
struct PredictRequest<'a> {
    disease: &'a str,
    district: &'a str,
}

/// JSON-over-HTTP client for the forecasting service.
pub struct PredictionClient<C = BasicClient> {
    base_url: String,
    http: C,
}

impl PredictionClient<BasicClient> {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(base_url, BasicClient::new(timeout)?))
    }
}

impl<C: HttpClient> PredictionClient<C> {
    pub fn with_client(base_url: &str, http: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<Request> {
        let url = format!("{}/{}", self.base_url, path);
        let url = url
            .parse()
            .map_err(|e| AnalyticsError::external(format!("invalid service URL {url}: {e}")))?;
        Ok(Request::new(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, req: Request) -> Result<T> {
        let endpoint = req.url().path().to_string();
        let (status, body) = fetch_json(&self.http, req).await.inspect_err(|e| {
            warn!(endpoint = %endpoint, error = %e, "Prediction request failed");
        })?;
        debug!(endpoint = %endpoint, status = status.as_u16(), "Prediction service answered");
        interpret(status, body)
    }
}

/// Turns a decoded response into `T`, mapping every failure shape the
/// service uses onto [`AnalyticsError::ExternalServiceFailure`].
pub(crate) fn interpret<T: DeserializeOwned>(status: StatusCode, body: Value) -> Result<T> {
    if let Some(err) = body.get("error") {
        let message = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
        return Err(AnalyticsError::external(format!("{status}: {message}")));
    }
    if !status.is_success() {
        return Err(AnalyticsError::external(format!("service returned {status}")));
    }
    if body.get("success") == Some(&Value::Bool(false)) {
        return Err(AnalyticsError::external("service reported an unsuccessful run"));
    }

    serde_json::from_value(body)
        .map_err(|e| AnalyticsError::external(format!("unexpected response shape: {e}")))
}

#[async_trait]
impl<C: HttpClient> PredictionApi for PredictionClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn predict(&self, disease: &str, district: &str) -> Result<Forecast> {
        let mut req = self.request(Method::POST, "predict")?;
        let payload = serde_json::to_vec(&PredictRequest { disease, district })?;
        req.headers_mut().insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        *req.body_mut() = Some(payload.into());
        self.send(req).await
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn run_comparison(&self) -> Result<Comparison> {
        let req = self.request(Method::GET, "run_comparison")?;
        self.send(req).await
    }
}
