//! xkcd JSON API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{ComicInfo, ComicSource, SourceError};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_millis(500);

/// Client for the xkcd `info.0.json` endpoints.
#[derive(Debug)]
pub struct XkcdClient {
    client: Client,
    base_url: String,
}

/// Wire shape of `GET {base}/{id}/info.0.json`.
#[derive(Debug, Deserialize)]
struct ComicResp {
    num: i64,
    img: String,
    safe_title: String,
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    alt: String,
}

impl XkcdClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        if base_url.is_empty() {
            return Err(SourceError::Transport("empty base url".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and decode one URL with retries: 404 is terminal NotFound,
    /// other 4xx end the attempt loop, 5xx and transport errors are retried
    /// with a growing backoff.
    async fn get_json(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ComicResp, SourceError> {
        let mut last_err = SourceError::Transport("no attempts made".to_string());

        for attempt in 0..MAX_ATTEMPTS {
            if cancel.is_cancelled() {
                return Err(SourceError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                res = self.attempt(url) => res,
            };

            match outcome {
                Ok(resp) => return Ok(resp),
                Err(SourceError::NotFound) => return Err(SourceError::NotFound),
                Err(SourceError::Status(code)) if code < 500 => {
                    return Err(SourceError::Status(code));
                }
                Err(e) => {
                    warn!("xkcd request failed (attempt {}): {}", attempt + 1, e);
                    last_err = e;
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                _ = tokio::time::sleep(BACKOFF_STEP * (attempt + 1)) => {}
            }
        }

        Err(last_err)
    }

    async fn attempt(&self, url: &str) -> Result<ComicResp, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound),
            status if !status.is_success() => Err(SourceError::Status(status.as_u16())),
            _ => response
                .json::<ComicResp>()
                .await
                .map_err(|e| SourceError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl ComicSource for XkcdClient {
    async fn last_id(&self, cancel: &CancellationToken) -> Result<i64, SourceError> {
        let url = format!("{}/info.0.json", self.base_url);
        let resp = self.get_json(&url, cancel).await?;
        Ok(resp.num)
    }

    async fn get(&self, id: i64, cancel: &CancellationToken) -> Result<ComicInfo, SourceError> {
        let url = format!("{}/{}/info.0.json", self.base_url, id);
        let resp = self.get_json(&url, cancel).await?;
        Ok(ComicInfo {
            id: resp.num,
            url: resp.img,
            title: resp.safe_title,
            description: format!("{} {}", resp.alt, resp.transcript),
        })
    }
}
