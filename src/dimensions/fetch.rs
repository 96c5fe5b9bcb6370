use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("fetching is disabled")]
    Disabled,
}

/// Retrieves a page or image. One attempt per call; failures are reported, never retried.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request_err = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.bytes().await.map_err(request_err)?;
        Ok(body.to_vec())
    }
}

/// Stand-in used with `--skip-dimensions`; never touches the network.
pub struct Offline;

#[async_trait]
impl Fetcher for Offline {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn client() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5), "feed_enricher-test").unwrap()
    }

    /// Answers every connection with the given raw HTTP response.
    async fn serve(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn success_returns_body() {
        let base = serve("HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello").await;
        let body = client().fetch(&format!("{}/page", base)).await.unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn non_success_status_is_status_error() {
        let base =
            serve("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let url = format!("{}/x", base);

        let err = client().fetch(&url).await.unwrap_err();

        assert!(
            matches!(&err, FetchError::Status { status, .. } if *status == StatusCode::NOT_FOUND),
            "{err}"
        );
        assert_eq!(err.to_string(), format!("{} returned HTTP 404 Not Found", url));
    }

    #[tokio::test]
    async fn refused_connection_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}/x", addr);

        let err = client().fetch(&url).await.unwrap_err();

        assert!(matches!(&err, FetchError::Request { .. }), "{err}");
        assert!(err.to_string().starts_with(&format!("request to {} failed", url)));
    }

    #[tokio::test]
    async fn offline_is_disabled() {
        assert!(matches!(Offline.fetch("https://arva.example/").await, Err(FetchError::Disabled)));
    }
}
