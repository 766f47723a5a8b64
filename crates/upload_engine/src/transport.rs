use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt;
use reqwest::cookie::Jar;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use upload_core::RawFile;

use crate::{FailureKind, TransportError, TransportSettings};

/// Size of the pieces the file body is streamed in; progress is reported
/// once per piece.
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Receives byte progress for one upload.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, loaded: u64, total: u64);
}

/// Everything a transport needs for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub endpoint: String,
    pub fields: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub field_name: String,
    pub file: RawFile,
    pub with_credentials: bool,
}

/// Performs one upload: zero or more progress reports, then exactly one
/// terminal outcome.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn upload(
        &self,
        request: UploadRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Value, TransportError>;
}

/// Multipart `POST` over reqwest.
///
/// Requests with `with_credentials` go through a client that shares one
/// cookie jar, so cookies set by the server are sent on later uploads.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    credentialed: reqwest::Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = Self::builder(&settings)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        let credentialed = Self::builder(&settings)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            credentialed,
            jar,
        })
    }

    /// Cookie jar used for credentialed requests, e.g. to seed a session cookie.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    fn builder(settings: &TransportSettings) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn upload(
        &self,
        request: UploadRequest,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Value, TransportError> {
        let endpoint = reqwest::Url::parse(&request.endpoint)
            .map_err(|err| TransportError::new(FailureKind::InvalidEndpoint, err.to_string()))?;

        let file = &request.file;
        let total = file.size();
        let body = progress_body(file.content().clone(), sink);
        let mut part = Part::stream_with_length(body, total).file_name(file.name().to_string());
        if let Some(mime) = file.mime_type() {
            part = part
                .mime_str(mime)
                .map_err(|err| TransportError::new(FailureKind::Io, err.to_string()))?;
        }

        let mut form = Form::new().part(request.field_name.clone(), part);
        for (key, value) in &request.fields {
            form = form.text(key.clone(), value.clone());
        }

        let client = if request.with_credentials {
            &self.credentialed
        } else {
            &self.client
        };
        let mut builder = client.post(endpoint).multipart(form);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = String::from_utf8_lossy(&body).trim().to_string();
            let message = if message.is_empty() {
                status.to_string()
            } else {
                message
            };
            return Err(TransportError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        Ok(parse_response(&body))
    }
}

/// Streams `content` in fixed-size pieces, reporting the running byte count
/// as each piece is handed to the connection.
fn progress_body(content: Bytes, sink: Arc<dyn ProgressSink>) -> reqwest::Body {
    let total = content.len() as u64;
    let pieces: Vec<Bytes> = (0..content.len())
        .step_by(UPLOAD_CHUNK_SIZE)
        .map(|start| content.slice(start..(start + UPLOAD_CHUNK_SIZE).min(content.len())))
        .collect();
    let mut loaded = 0u64;
    let body = stream::iter(pieces).map(move |piece| {
        loaded += piece.len() as u64;
        sink.progress(loaded, total);
        Ok::<_, std::io::Error>(piece)
    });
    reqwest::Body::wrap_stream(body)
}

/// JSON bodies are kept as JSON; anything else becomes a string. An empty
/// body is `null`.
fn parse_response(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return TransportError::new(FailureKind::InvalidEndpoint, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::parse_response;
    use serde_json::json;

    #[test]
    fn json_bodies_stay_json() {
        assert_eq!(parse_response(br#"{"id": 3}"#), json!({"id": 3}));
    }

    #[test]
    fn plain_bodies_become_strings() {
        assert_eq!(parse_response(b"ok"), json!("ok"));
        assert_eq!(parse_response(b""), serde_json::Value::Null);
    }
}
