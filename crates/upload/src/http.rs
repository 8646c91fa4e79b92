//! JSON-over-HTTP transfer backend.
//!
//! Async client using `reqwest`. When a session store is attached, its
//! access token is sent as a Bearer token on every request.

use std::sync::Arc;
use std::time::Duration;

use lago_protocol::constants::{
    PATH_MULTIPART_ABORT, PATH_MULTIPART_COMPLETE, PATH_MULTIPART_INIT, PATH_MULTIPART_PART,
    PATH_UPLOAD_SINGLE,
};
use lago_protocol::{
    AbortMultipartRequest, ApiResponse, CompleteMultipartRequest, CompleteMultipartResponse,
    CompletedPart, InitMultipartRequest, InitMultipartResponse, SingleUploadResponse,
    UploadPartResponse,
};
use lago_session::{SessionStore, keys};
use lago_transfer::{PartResult, TransferRequest};
use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::backend::{BackendFuture, TransferBackend};
use crate::error::BackendError;

/// Upload service client.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    session: Option<Arc<dyn SessionStore>>,
}

impl HttpBackend {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// `timeout` bounds each individual request, not the whole upload.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            session: None,
        })
    }

    /// Authenticates requests with the token held by `store`.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Returns the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self
            .session
            .as_ref()
            .and_then(|s| s.get(keys::ACCESS_TOKEN))
        {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sends `req` and decodes the response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<ApiResponse<T>, BackendError> {
        let resp = self.authorize(req).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        trace!(bytes = body.len(), "response received");
        Ok(serde_json::from_slice(&body)?)
    }
}

impl TransferBackend for HttpBackend {
    fn upload_single<'a>(
        &'a self,
        request: &'a TransferRequest,
        data: Vec<u8>,
    ) -> BackendFuture<'a, SingleUploadResponse> {
        Box::pin(async move {
            let req = self
                .http
                .post(self.url(PATH_UPLOAD_SINGLE))
                .query(&[
                    ("type", request.classification.as_str()),
                    ("name", request.name.as_str()),
                ])
                .header(CONTENT_TYPE, request.mime_type.as_str())
                .body(data);
            let resp: SingleUploadResponse = self.send(req).await?.into_result()?;
            if resp.url.is_empty() {
                return Err(BackendError::Malformed("single upload returned no url".into()));
            }
            Ok(resp)
        })
    }

    fn init<'a>(&'a self, request: &'a TransferRequest) -> BackendFuture<'a, InitMultipartResponse> {
        Box::pin(async move {
            let body = InitMultipartRequest {
                file_name: request.name.clone(),
                mime_type: request.mime_type.clone(),
                classification: request.classification,
            };
            let req = self.http.post(self.url(PATH_MULTIPART_INIT)).json(&body);
            let resp: InitMultipartResponse = self.send(req).await?.into_result()?;
            if resp.upload_id.is_empty() || resp.object_key.is_empty() {
                return Err(BackendError::Malformed(
                    "init returned an empty uploadId or objectKey".into(),
                ));
            }
            Ok(resp)
        })
    }

    fn upload_part<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        part_number: u32,
        data: Vec<u8>,
    ) -> BackendFuture<'a, PartResult> {
        Box::pin(async move {
            let number = part_number.to_string();
            let req = self
                .http
                .put(self.url(PATH_MULTIPART_PART))
                .query(&[
                    ("uploadId", upload_id),
                    ("objectKey", object_key),
                    ("partNumber", number.as_str()),
                ])
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(data);
            let resp: UploadPartResponse = self.send(req).await?.into_result()?;
            if resp.etag.is_empty() {
                return Err(BackendError::Malformed(format!(
                    "part {part_number} acknowledged without an etag"
                )));
            }
            Ok(PartResult {
                part_number: resp.part_number,
                etag: resp.etag,
            })
        })
    }

    fn complete<'a>(
        &'a self,
        upload_id: &'a str,
        object_key: &'a str,
        parts: &'a [PartResult],
    ) -> BackendFuture<'a, CompleteMultipartResponse> {
        Box::pin(async move {
            let body = CompleteMultipartRequest {
                upload_id: upload_id.to_string(),
                object_key: object_key.to_string(),
                parts: parts.iter().map(CompletedPart::from).collect(),
            };
            let req = self.http.post(self.url(PATH_MULTIPART_COMPLETE)).json(&body);
            let resp: CompleteMultipartResponse = self.send(req).await?.into_result()?;
            if resp.url.is_empty() {
                return Err(BackendError::Malformed("complete returned no url".into()));
            }
            Ok(resp)
        })
    }

    fn abort<'a>(&'a self, upload_id: &'a str, object_key: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let body = AbortMultipartRequest {
                upload_id: upload_id.to_string(),
                object_key: object_key.to_string(),
            };
            let req = self.http.post(self.url(PATH_MULTIPART_ABORT)).json(&body);
            let resp: ApiResponse<serde_json::Value> = self.send(req).await?;
            Ok(resp.into_unit()?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lago_session::MemorySessionStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// A request as seen by the mock server.
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.head.lines().skip(1).find_map(|line| {
                let (k, v) = line.split_once(':')?;
                k.trim()
                    .eq_ignore_ascii_case(name)
                    .then(|| v.trim().to_string())
            })
        }

        fn json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    /// Starts a mock HTTP server that answers one request with `status`
    /// and `body`, and hands back what it received.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, oneshot::Receiver<Captured>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();
        let (tx, rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut raw = Vec::new();
                let mut buf = vec![0u8; 8192];
                let head_end = loop {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    raw.extend_from_slice(&buf[..n]);
                    if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };

                let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
                let len = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.trim()
                            .eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                while raw.len() < head_end + len {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..n]);
                }
                let _ = tx.send(Captured {
                    head,
                    body: raw[head_end..].to_vec(),
                });

                let resp = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, rx, handle)
    }

    fn backend(url: String) -> HttpBackend {
        HttpBackend::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_is_normalized() {
        let b = HttpBackend::new("https://api.lago.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(b.base_url(), "https://api.lago.test");
        assert_eq!(
            b.url(PATH_MULTIPART_INIT),
            "https://api.lago.test/upload/multipart/init"
        );
    }

    #[tokio::test]
    async fn single_upload_sends_raw_body_with_metadata() {
        let json = r#"{"success":true,"data":{"url":"https://cdn.test/a.png","objectKey":"image/a.png"}}"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let request = TransferRequest::new("a.png", "image/png", 4);
        let resp = backend(url)
            .upload_single(&request, vec![1, 2, 3, 4])
            .await
            .unwrap();

        assert_eq!(resp.url, "https://cdn.test/a.png");
        assert_eq!(resp.object_key.as_deref(), Some("image/a.png"));

        let seen = rx.await.unwrap();
        assert!(seen.request_line().starts_with("POST /upload/single?"));
        assert!(seen.request_line().contains("type=image"));
        assert!(seen.request_line().contains("name=a.png"));
        assert_eq!(seen.header("content-type").as_deref(), Some("image/png"));
        assert_eq!(seen.body, vec![1, 2, 3, 4]);

        handle.abort();
    }

    #[tokio::test]
    async fn init_posts_json_and_sends_bearer_token() {
        let json = r#"{"success":true,"data":{"uploadId":"up-9","objectKey":"video/v.mp4"}}"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let store = Arc::new(MemorySessionStore::with(keys::ACCESS_TOKEN, "tok-123"));
        let b = backend(url).with_session_store(store);
        let request = TransferRequest::new("v.mp4", "video/mp4", 20);
        let resp = b.init(&request).await.unwrap();

        assert_eq!(resp.upload_id, "up-9");
        assert_eq!(resp.object_key, "video/v.mp4");

        let seen = rx.await.unwrap();
        assert!(seen.request_line().starts_with("POST /upload/multipart/init "));
        assert_eq!(
            seen.header("authorization").as_deref(),
            Some("Bearer tok-123")
        );
        let body = seen.json();
        assert_eq!(body["fileName"], "v.mp4");
        assert_eq!(body["mimeType"], "video/mp4");
        assert_eq!(body["type"], "video");

        handle.abort();
    }

    #[tokio::test]
    async fn no_token_means_no_authorization_header() {
        let json = r#"{"success":true,"data":{"uploadId":"u","objectKey":"k"}}"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let b = backend(url).with_session_store(Arc::new(MemorySessionStore::new()));
        b.init(&TransferRequest::new("f.bin", "application/octet-stream", 1))
            .await
            .unwrap();

        assert!(rx.await.unwrap().header("authorization").is_none());
        handle.abort();
    }

    #[tokio::test]
    async fn part_upload_uses_query_identifiers() {
        let json = r#"{"success":true,"data":{"partNumber":2,"etag":"\"abc\""}}"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let part = backend(url)
            .upload_part("up-1", "video/v.mp4", 2, vec![9; 16])
            .await
            .unwrap();

        assert_eq!(part.part_number, 2);
        assert_eq!(part.etag, "\"abc\"");

        let seen = rx.await.unwrap();
        let line = seen.request_line();
        assert!(line.starts_with("PUT /upload/multipart/part?"));
        assert!(line.contains("uploadId=up-1"));
        assert!(line.contains("objectKey=video%2Fv.mp4"));
        assert!(line.contains("partNumber=2"));
        assert_eq!(seen.body.len(), 16);

        handle.abort();
    }

    #[tokio::test]
    async fn part_without_etag_is_malformed() {
        let json = r#"{"success":true,"data":{"partNumber":1,"etag":""}}"#;
        let (url, _rx, handle) = mock_server(200, json).await;

        let err = backend(url)
            .upload_part("up-1", "k", 1, vec![0])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));

        handle.abort();
    }

    #[tokio::test]
    async fn complete_echoes_parts_in_order() {
        let json = r#"{"success":true,"data":{"url":"https://cdn.test/v.mp4"}}"#;
        let (url, rx, handle) = mock_server(200, json).await;

        let parts = vec![
            PartResult {
                part_number: 1,
                etag: "e1".into(),
            },
            PartResult {
                part_number: 2,
                etag: "e2".into(),
            },
        ];
        let resp = backend(url).complete("up-1", "k", &parts).await.unwrap();
        assert_eq!(resp.url, "https://cdn.test/v.mp4");

        let body = rx.await.unwrap().json();
        assert_eq!(body["uploadId"], "up-1");
        assert_eq!(body["objectKey"], "k");
        assert_eq!(body["parts"][0]["partNumber"], 1);
        assert_eq!(body["parts"][0]["etag"], "e1");
        assert_eq!(body["parts"][1]["partNumber"], 2);

        handle.abort();
    }

    #[tokio::test]
    async fn abort_accepts_envelope_without_data() {
        let (url, rx, handle) = mock_server(200, r#"{"success":true}"#).await;

        backend(url).abort("up-1", "k").await.unwrap();

        let seen = rx.await.unwrap();
        assert!(seen.request_line().starts_with("POST /upload/multipart/abort "));
        assert_eq!(seen.json()["uploadId"], "up-1");

        handle.abort();
    }

    #[tokio::test]
    async fn rejected_envelope_becomes_api_error() {
        let json = r#"{"success":false,"message":"quota exceeded"}"#;
        let (url, _rx, handle) = mock_server(200, json).await;

        let err = backend(url)
            .init(&TransferRequest::new("v.mp4", "video/mp4", 20))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "request rejected: quota exceeded");

        handle.abort();
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let (url, _rx, handle) = mock_server(401, r#"{"message":"unauthorized"}"#).await;

        let err = backend(url).abort("up-1", "k").await.unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 401, .. }));

        handle.abort();
    }

    #[tokio::test]
    async fn garbage_body_is_json_error() {
        let (url, _rx, handle) = mock_server(200, "not json").await;

        let err = backend(url)
            .complete("up-1", "k", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Json(_)));

        handle.abort();
    }
}
