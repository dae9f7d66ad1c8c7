//! Shared utilities for batch provider adapters
//!
//! HTTP client construction, status code mapping and line-delimited result
//! decoding used by every protocol family.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

use crate::core::providers::unified_provider::ProviderError;

// ============================================================================
// HTTP Client Builder
// ============================================================================

/// Shared HTTP client builder with common configuration
pub struct HttpClientBuilder {
    provider: &'static str,
    timeout: Duration,
    connect_timeout: Duration,
    default_headers: HashMap<String, String>,
}

impl HttpClientBuilder {
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
            default_headers: HashMap::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn default_headers(mut self, headers: &HashMap<String, String>) -> Self {
        for (key, value) in headers {
            self.default_headers.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn build(self) -> Result<Client, ProviderError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.default_headers {
            let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                ProviderError::configuration(self.provider, format!("Invalid header name: {}", key))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                ProviderError::configuration(
                    self.provider,
                    format!("Invalid header value for {}", key),
                )
            })?;
            headers.insert(header_name, header_value);
        }

        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                ProviderError::configuration(
                    self.provider,
                    format!("Failed to build HTTP client: {}", e),
                )
            })
    }
}

// ============================================================================
// Response handling
// ============================================================================

/// Map a transport error onto the unified error for `provider`
pub fn transport_error(provider: &'static str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, err.to_string())
    } else {
        ProviderError::network(provider, format!("Network error: {}", err))
    }
}

/// Pass successful responses through; turn everything else into a `ProviderError`
pub async fn check_response(
    provider: &'static str,
    response: Response,
) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    Err(map_http_error(provider, status.as_u16(), &body))
}

/// Decode a JSON body
pub async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> Result<T, ProviderError> {
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    serde_json::from_str(&text)
        .map_err(|e| ProviderError::response_parsing(provider, format!("Failed to parse JSON: {}", e)))
}

/// Map an HTTP status and body to the unified error
pub fn map_http_error(provider: &'static str, status: u16, body: &str) -> ProviderError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        400 | 422 => ProviderError::invalid_request(provider, format!("Bad request: {}", message)),
        401 | 403 => ProviderError::authentication(provider, message),
        404 => ProviderError::not_found(provider, message),
        408 => ProviderError::timeout(provider, message),
        429 => ProviderError::rate_limit(provider, extract_retry_after(body)),
        502..=504 | 529 => ProviderError::provider_unavailable(provider, message),
        _ => ProviderError::api_error(provider, status, message),
    }
}

/// `error.message` from either provider's error envelope
fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("error")
        .and_then(|error| error.get("message"))
        .or_else(|| json.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Extract retry-after value
fn extract_retry_after(body: &str) -> Option<u64> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("retry_after")
        .or_else(|| json.get("error").and_then(|e| e.get("retry_after")))
        .and_then(|r| r.as_u64())
}

// ============================================================================
// Line-delimited results
// ============================================================================

/// Parse one JSONL document. Blank lines are ignored; malformed lines are
/// logged and skipped.
pub fn parse_json_lines<T: DeserializeOwned>(provider: &'static str, text: &str) -> Vec<T> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(record) = parse_json_line(provider, index + 1, line) {
            records.push(record);
        }
    }
    records
}

/// Parse a JSONL byte stream incrementally, line by line
pub async fn parse_json_line_stream<T, S>(
    provider: &'static str,
    mut stream: S,
) -> Result<Vec<T>, ProviderError>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    let mut records = Vec::new();
    let mut buffer: Vec<u8> = Vec::new();
    let mut line_number = 0usize;
    // Prefix of `buffer` already searched for a newline
    let mut scanned = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transport_error(provider, e))?;
        buffer.extend_from_slice(&chunk);

        let mut start = 0usize;
        while let Some(offset) = buffer[scanned..].iter().position(|b| *b == b'\n') {
            let end = scanned + offset;
            line_number += 1;
            if let Some(record) =
                parse_json_line(provider, line_number, &String::from_utf8_lossy(&buffer[start..end]))
            {
                records.push(record);
            }
            start = end + 1;
            scanned = start;
        }

        buffer.drain(..start);
        scanned = buffer.len();
    }

    if !buffer.is_empty() {
        line_number += 1;
        if let Some(record) = parse_json_line(provider, line_number, &String::from_utf8_lossy(&buffer)) {
            records.push(record);
        }
    }

    Ok(records)
}

fn parse_json_line<T: DeserializeOwned>(
    provider: &'static str,
    line_number: usize,
    line: &str,
) -> Option<T> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(provider, line = line_number, error = %e, "Skipping malformed batch result line");
            None
        }
    }
}

/// Render JSONL from already serialized records
pub fn to_json_lines<T: serde::Serialize>(
    provider: &'static str,
    records: &[T],
) -> Result<String, ProviderError> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| ProviderError::serialization(provider, e.to_string()))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
