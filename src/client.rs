//! The network exchange with the conversion service.
//!
//! ## One attempt, one outcome
//!
//! [`ConversionClient::convert`] never returns an error. Every way the
//! exchange can end (transport failure, a body that is not JSON, the service
//! saying `success: false`, or a real success) collapses into one
//! [`ConversionOutcome`] value that the session stores as its result.
//!
//! Once a JSON body has been received the response envelope is the only
//! source of truth. The HTTP status is logged but never reinterpreted: a
//! `500` carrying `{"success": true, ...}` is a success, and a `200` carrying
//! `{"success": false, ...}` is a failure.
//!
//! There are no retries. The user retries by converting again.

use crate::config::ClientConfig;
use crate::error::File2JsonError;
use crate::selection::{FileSource, SelectedFile};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Shown when the service could not be reached or answered with garbage.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Error connecting to the conversion service. Check that the API is reachable.";

/// Detail attached when the body parses as JSON but is not an envelope object.
pub const NOT_AN_OBJECT_DETAIL: &str = "response is not a JSON object";

/// Shown when the selected file could not be read from disk.
pub const FILE_READ_ERROR_MESSAGE: &str = "Error reading the selected file.";

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// The result of exactly one conversion attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// The service reported success; `payload` is its `data` field.
    Success { message: String, payload: Value },
    /// The attempt failed, either locally or as reported by the service.
    Failure {
        message: String,
        error_detail: Option<String>,
    },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    /// Headline message, whichever way the attempt went.
    pub fn message(&self) -> &str {
        match self {
            ConversionOutcome::Success { message, .. } => message,
            ConversionOutcome::Failure { message, .. } => message,
        }
    }

    /// The converted payload, only present on success.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ConversionOutcome::Success { payload, .. } => Some(payload),
            ConversionOutcome::Failure { .. } => None,
        }
    }

    /// Map a decoded response envelope to an outcome, trusting it verbatim.
    ///
    /// A body that is not a JSON object is a malformed response and reads as
    /// a connection failure. Inside an object, missing or mistyped fields
    /// degrade instead of failing: no `success` boolean means failure, no
    /// `message` means an empty message, no `data` means a `null` payload.
    pub fn from_envelope(envelope: Value) -> Self {
        if !envelope.is_object() {
            return Self::connection_failure(NOT_AN_OBJECT_DETAIL);
        }
        let success = envelope
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if success {
            let payload = match envelope {
                Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
                _ => Value::Null,
            };
            ConversionOutcome::Success { message, payload }
        } else {
            let error_detail = envelope
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string);
            ConversionOutcome::Failure {
                message,
                error_detail,
            }
        }
    }

    fn connection_failure(detail: impl ToString) -> Self {
        ConversionOutcome::Failure {
            message: CONNECTION_ERROR_MESSAGE.to_string(),
            error_detail: Some(detail.to_string()),
        }
    }
}

/// Anything that can turn a selected file into a [`ConversionOutcome`].
///
/// [`ConversionClient`] is the HTTP implementation; the session controller is
/// generic over this trait so it can be driven without a network.
pub trait Converter: Send + Sync {
    /// Perform one conversion attempt. Must not retry or queue.
    fn convert(&self, file: &SelectedFile) -> impl Future<Output = ConversionOutcome> + Send;
}

/// HTTP client for the conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ConversionClient {
    /// Build a client from a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, File2JsonError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| File2JsonError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_file(&self, file: &SelectedFile) -> ConversionOutcome {
        let (body, len) = match upload_body(file).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Could not read '{}': {}", file.name(), e);
                return ConversionOutcome::Failure {
                    message: FILE_READ_ERROR_MESSAGE.to_string(),
                    error_detail: Some(e.to_string()),
                };
            }
        };

        let part = Part::stream_with_length(body, len).file_name(file.name().to_string());
        let form = Form::new().part(FILE_FIELD, part);

        let start = Instant::now();
        let response = match self.http.post(&self.endpoint).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Request to {} failed: {}", self.endpoint, e);
                return ConversionOutcome::connection_failure(e);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!("Reading response body failed: {}", e);
                return ConversionOutcome::connection_failure(e);
            }
        };
        debug!(
            "Service answered HTTP {} with {} bytes in {}ms",
            status,
            body.len(),
            start.elapsed().as_millis()
        );

        match serde_json::from_slice::<Value>(&body) {
            Ok(envelope) => ConversionOutcome::from_envelope(envelope),
            Err(e) => {
                warn!("Response (HTTP {}) is not valid JSON: {}", status, e);
                ConversionOutcome::connection_failure(e)
            }
        }
    }
}

/// The request body for `file` and its length in bytes.
///
/// In-memory sources share their buffer with the body; files on disk are
/// streamed. The length of a file is taken when it is opened, not when it
/// was selected.
async fn upload_body(file: &SelectedFile) -> std::io::Result<(Body, u64)> {
    match file.source() {
        FileSource::Memory(bytes) => Ok((Body::from(bytes.clone()), bytes.len() as u64)),
        FileSource::Path(path) => {
            let handle = tokio::fs::File::open(path).await?;
            let len = handle.metadata().await?.len();
            Ok((Body::from(handle), len))
        }
    }
}

impl Converter for ConversionClient {
    async fn convert(&self, file: &SelectedFile) -> ConversionOutcome {
        info!(
            "Uploading '{}' ({} bytes) to {}",
            file.name(),
            file.size(),
            self.endpoint
        );
        let outcome = self.post_file(file).await;
        match &outcome {
            ConversionOutcome::Success { message, .. } => info!("Conversion succeeded: {message}"),
            ConversionOutcome::Failure { message, .. } => info!("Conversion failed: {message}"),
        }
        outcome
    }
}
