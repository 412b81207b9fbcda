use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::UpstreamError;

/// Builds a client whose every request is bounded by `timeout`.
pub fn client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// POSTs `body` as JSON and decodes a JSON reply, classifying every failure
/// into an [`UpstreamError`].
pub async fn post_json<B, R>(client: &Client, url: &str, body: &B) -> Result<R, UpstreamError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client.post(url).json(body).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status { status, body });
    }

    let payload = response.json::<R>().await?;
    Ok(payload)
}
