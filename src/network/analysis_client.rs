use std::pin::Pin;

use bytes::Bytes;
use futures::Future;
use futures::task::{Context, Poll};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tower::Service;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AnalysisError, AppError};
use crate::pipeline::types::AnalysisResult;

/// A single analysis exchange, tagged with the selection it was issued for.
/// `bytes` shares the selection's buffer.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image_id: Uuid,
    pub bytes: Bytes,
}

/// Posts raw image bytes to `{base_url}/analyze`. No retries, and no timeout
/// beyond what the transport applies.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    endpoint: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder().build().map_err(AppError::HttpClient)?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn analyze(&self, bytes: impl Into<Bytes>) -> Result<AnalysisResult, AnalysisError> {
        let bytes = bytes.into();
        debug!("POST {} ({} bytes)", self.endpoint, bytes.len());
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Analysis endpoint answered {}", status);
            return Err(AnalysisError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let result: AnalysisResult = serde_json::from_slice(&body)?;
        info!(
            "Analysis returned {} tags, {} objects, {} captions, {} categories",
            result.tags.len(),
            result.objects.len(),
            result.captions().len(),
            result.categories.len()
        );
        Ok(result)
    }
}

impl Service<AnalysisRequest> for AnalysisClient {
    type Response = AnalysisResult;
    type Error = AnalysisError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: AnalysisRequest) -> Self::Future {
        let client = self.clone();
        Box::pin(async move {
            debug!("Dispatching analysis for image {}", req.image_id);
            client.analyze(req.bytes).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    struct CapturedRequest {
        head: String,
        body: Vec<u8>,
    }

    /// Serves exactly one HTTP exchange with a canned response.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let header_end = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break buf.len();
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            let _ = stream.shutdown().await;
            CapturedRequest {
                head,
                body: buf[header_end..].to_vec(),
            }
        });
        (format!("http://{}", addr), task)
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = AnalysisClient::new("http://example.test/api/").unwrap();
        assert_eq!(client.endpoint(), "http://example.test/api/analyze");
    }

    #[tokio::test]
    async fn test_posts_raw_bytes() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"tags":[{"name":"cat","confidence":0.93}],"objects":[],"description":{"captions":[{"text":"a cat","confidence":0.9}]},"categories":[]}"#,
        )
        .await;
        let client = AnalysisClient::new(&base_url).unwrap();
        let result = client.analyze(vec![0xFF, 0xD8, 0xFF, 0x00]).await.unwrap();
        assert_eq!(result.tags[0].name, "cat");
        assert_eq!(result.best_caption().unwrap().text, "a cat");

        let captured = server.await.unwrap();
        assert!(captured.head.starts_with("POST /analyze HTTP/1.1"));
        assert!(
            captured
                .head
                .to_ascii_lowercase()
                .contains("content-type: application/octet-stream")
        );
        assert_eq!(captured.body, vec![0xFF, 0xD8, 0xFF, 0x00]);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (base_url, server) =
            serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = AnalysisClient::new(&base_url).unwrap();
        let result = client.analyze(vec![1, 2, 3]).await;
        assert!(matches!(result, Err(AnalysisError::Http { status: 500 })));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", "not json").await;
        let client = AnalysisClient::new(&base_url).unwrap();
        let result = client.analyze(vec![1]).await;
        assert!(matches!(result, Err(AnalysisError::MalformedResponse(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_partial_body_is_accepted() {
        let (base_url, server) = serve_once("HTTP/1.1 200 OK", r#"{"categories":[]}"#).await;
        let client = AnalysisClient::new(&base_url).unwrap();
        let result = client.analyze(vec![1]).await.unwrap();
        assert_eq!(result, AnalysisResult::default());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = AnalysisClient::new(&format!("http://{}", addr)).unwrap();
        let result = client.analyze(vec![1]).await;
        assert!(matches!(result, Err(AnalysisError::Transport(_))));
    }

    #[tokio::test]
    async fn test_service_call() {
        let (base_url, server) =
            serve_once("HTTP/1.1 200 OK", r#"{"tags":[{"name":"sky","confidence":0.5}]}"#).await;
        let client = AnalysisClient::new(&base_url).unwrap();
        let request = AnalysisRequest {
            image_id: Uuid::new_v4(),
            bytes: Bytes::from_static(&[9, 9, 9]),
        };
        let result = client.oneshot(request).await.unwrap();
        assert_eq!(result.tags[0].name, "sky");
        assert_eq!(server.await.unwrap().body, vec![9, 9, 9]);
    }
}
