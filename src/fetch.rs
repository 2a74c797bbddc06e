use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;

pub const USER_AGENT: &str = concat!("lotorrent/", env!("CARGO_PKG_VERSION"));

/// Errors produced while fetching a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },
}

/// Retrieves the full body behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP GET fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        // Content-Length is not trusted for sizing the buffer
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.map_err(transport)?);
        }

        Ok(body)
    }
}
