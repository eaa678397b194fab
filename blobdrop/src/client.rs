//! HTTP client abstraction for the blob PUT.
//!
//! [`BlobClient`] is the seam between the upload session and the network. [`ReqwestBlobClient`]
//! talks to the real service; tests point it at a `wiremock` server through the endpoint override.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;

use crate::errors::{Error, Result};

/// Header selecting the blob type on a Put Blob request.
pub const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
pub const BLOCK_BLOB: &str = "BlockBlob";

/// Status and body of a completed Put Blob call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResponse {
    pub status: StatusCode,
    /// Response text. The service puts its XML error document here on failure.
    pub body: String,
}

impl BlobResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Performs a single-shot block blob upload.
///
/// Any response that arrives, whatever its status, is `Ok`; `Err` means the request never
/// completed (connect, DNS, TLS, timeout).
#[async_trait]
pub trait BlobClient: Send + Sync {
    async fn put_block_blob(&self, url: &str, content_type: &str, body: Bytes) -> Result<BlobResponse>;
}

/// Production client using reqwest.
#[derive(Clone)]
pub struct ReqwestBlobClient {
    client: reqwest::Client,
}

impl ReqwestBlobClient {
    /// Create a client with an optional whole-request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BlobClient for ReqwestBlobClient {
    #[tracing::instrument(skip_all, fields(content_type = %content_type, size = body.len()))]
    async fn put_block_blob(&self, url: &str, content_type: &str, body: Bytes) -> Result<BlobResponse> {
        let response = self
            .client
            .put(url)
            .header(BLOB_TYPE_HEADER, BLOCK_BLOB)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the SAS token
                let e = e.without_url();
                tracing::warn!(error = %e, "Blob PUT failed before a response arrived");
                e
            })?;

        let status = response.status();
        // The blob is stored once a 2xx status arrives; only a failure body is worth reading
        let body = if status.is_success() {
            String::new()
        } else {
            response.text().await.map_err(reqwest::Error::without_url)?
        };

        tracing::debug!(status = status.as_u16(), response_len = body.len(), "Blob PUT completed");

        Ok(BlobResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::install_crypto_provider;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_block_blob_put() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cont/a%20b.png"))
            .and(query_param("sv", "1"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(header("content-type", "image/png"))
            .and(body_bytes(b"PNGDATA".to_vec()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestBlobClient::new(None).unwrap();
        let url = format!("{}/cont/a%20b.png?sv=1", server.uri());
        let response = client
            .put_block_blob(&url, "image/png", Bytes::from_static(b"PNGDATA"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn success_status_ignores_truncated_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        install_crypto_provider();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 4096];
            let mut read = 0;
            while !request[..read].ends_with(b"PNGDATA") {
                let n = socket.read(&mut request[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            // Promise more body than is sent, then hang up
            socket
                .write_all(b"HTTP/1.1 201 Created\r\nContent-Length: 100\r\n\r\nabc")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = ReqwestBlobClient::new(None).unwrap();
        let response = client
            .put_block_blob(
                &format!("http://{addr}/cont/f.png?sv=1"),
                "image/png",
                Bytes::from_static(b"PNGDATA"),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert!(response.is_success());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_returned_with_body() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("AuthenticationFailed"))
            .mount(&server)
            .await;

        let client = ReqwestBlobClient::new(None).unwrap();
        let response = client
            .put_block_blob(&format!("{}/cont/f", server.uri()), "text/plain", Bytes::new())
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body, "AuthenticationFailed");
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        install_crypto_provider();
        let client = ReqwestBlobClient::new(None).unwrap();
        let err = client
            .put_block_blob("http://127.0.0.1:1/cont/f", "text/plain", Bytes::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn timeout_is_transport_error() {
        install_crypto_provider();
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = ReqwestBlobClient::new(Some(Duration::from_millis(100))).unwrap();
        let err = client
            .put_block_blob(&format!("{}/cont/f", server.uri()), "text/plain", Bytes::new())
            .await
            .unwrap_err();

        match err {
            Error::Transport(e) => {
                assert!(e.is_timeout());
                assert!(e.url().is_none());
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
