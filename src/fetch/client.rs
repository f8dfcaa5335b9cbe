use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends one prepared request. Implementations may decorate the request
/// (headers, timeouts) before it goes out.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
