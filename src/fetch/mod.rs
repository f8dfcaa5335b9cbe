mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{AnalyticsError, Result};

/// Executes `req` and decodes the body as JSON whatever the status, so
/// callers can read error payloads from failed responses.
pub async fn fetch_json<C: HttpClient>(client: &C, req: reqwest::Request) -> Result<(StatusCode, Value)> {
    let url = req.url().clone();
    let resp = client.execute(req).await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;

    let body = serde_json::from_slice(&bytes).map_err(|e| {
        AnalyticsError::external(format!("{url} returned {status} with a non-JSON body: {e}"))
    })?;
    Ok((status, body))
}
