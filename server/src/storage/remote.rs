//! Remote Image Fetching
//!
//! Downloads a profile picture hosted by an identity provider.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::redirect;
use thiserror::Error;

use super::ssrf;

/// Errors raised while downloading a remote image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL points at a loopback, private or reserved address.
    #[error("Refusing to fetch from a private address: {0}")]
    Blocked(String),

    /// Connection, TLS or timeout failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The remote answered with a non-success status.
    #[error("Remote returned HTTP {0}")]
    Status(u16),

    /// The body exceeds the size limit.
    #[error("Remote image too large (max: {max_size} bytes)")]
    TooLarge { max_size: usize },

    /// The body is empty.
    #[error("Remote image is empty")]
    Empty,
}

/// Source of images referenced by URL.
#[async_trait]
pub trait RemoteImageFetcher: Send + Sync {
    /// Download `url` in a single attempt.
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// `reqwest`-backed fetcher with a request timeout and a body size cap.
///
/// Every request is pinned to an address that passed [`ssrf::verify_resolved_ip`]
/// and redirects are not followed.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    timeout: Duration,
    max_size: usize,
}

impl HttpImageFetcher {
    #[must_use]
    pub const fn new(timeout: Duration, max_size: usize) -> Self {
        Self { timeout, max_size }
    }

    fn pinned_client(&self, pinned: &ssrf::PinnedHost) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .resolve(&pinned.host, pinned.addr)
            .redirect(redirect::Policy::none())
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))
    }
}

#[async_trait]
impl RemoteImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::Request(e.to_string()))?;
        let pinned = ssrf::verify_resolved_ip(&parsed).await?;

        let mut resp = self
            .pinned_client(&pinned)?
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let too_large = FetchError::TooLarge {
            max_size: self.max_size,
        };
        if resp
            .content_length()
            .is_some_and(|len| len > self.max_size as u64)
        {
            return Err(too_large);
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_size {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(FetchError::Empty);
        }

        tracing::debug!(url, size = body.len(), "Fetched remote image");
        Ok(body.freeze())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn loopback_listener_is_never_contacted() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 15\r\n\r\nINTERNAL-SECRET")
                    .await;
                return true;
            }
            false
        });

        let fetcher = HttpImageFetcher::new(Duration::from_secs(2), 1024);
        for url in [
            format!("http://{addr}/secret"),
            format!("http://localhost:{}/secret", addr.port()),
        ] {
            let err = fetcher.fetch(&url).await.unwrap_err();
            assert!(matches!(err, FetchError::Blocked(_)), "{url}: got {err:?}");
        }

        assert!(!server.is_finished());
        server.abort();
    }

    #[tokio::test]
    async fn metadata_address_is_blocked() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2), 1024);

        let err = fetcher
            .fetch("http://169.254.169.254/latest/meta-data/iam")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_url_is_a_request_error() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2), 1024);

        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)), "got {err:?}");
    }
}
