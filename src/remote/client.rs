//! `Transcribe` / `Proofread` traits and the `ApiClient` implementation.
//!
//! All connection details come from [`ApiConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors that can occur during a remote call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key configured — the service rejects unauthenticated calls.
    #[error("API key is missing. Please set api_key in settings.toml.")]
    MissingCredential,

    /// The service answered with a non-2xx status.
    #[error("API returned status: {0}")]
    Status(u16),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The response body could not be parsed as expected JSON.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// The 2xx response carried no usable text.
    #[error("No proofread text returned from API")]
    EmptyResponse,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transcribe / Proofread traits
// ---------------------------------------------------------------------------

/// Async trait for audio transcription backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Transcribe>`.
#[async_trait]
pub trait Transcribe: Send + Sync {
    /// Transcribe a finished WAV payload into text.
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ApiError>;
}

/// Async trait for text proofreading backends.
#[async_trait]
pub trait Proofread: Send + Sync {
    /// Return the corrected form of `text`.
    async fn proofread(&self, text: &str) -> Result<String, ApiError>;
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ProofreadResponse {
    #[serde(rename = "proofreadText")]
    proofread_text: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP client for the remote transcription / proofreading service.
///
/// `POST {base}/api/transcribe` — multipart form, field `file` (`audio.wav`).
/// `POST {base}/api/proofread`  — JSON body `{ "text": … }`.
/// Both carry `Authorization: Bearer …` and fail fast on non-2xx.
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    ///
    /// The per-request timeout comes from `config.timeout_secs`; a default
    /// client is the last-resort fallback if the builder fails.
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// The configured bearer credential, or `MissingCredential`.
    fn api_key(&self) -> Result<&str, ApiError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ApiError::MissingCredential),
        }
    }
}

#[async_trait]
impl Transcribe for ApiClient {
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ApiError> {
        let key = self.api_key()?;
        let url = format!("{}/api/transcribe", self.config.base_url);

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(body.text)
    }
}

#[async_trait]
impl Proofread for ApiClient {
    async fn proofread(&self, text: &str) -> Result<String, ApiError> {
        let key = self.api_key()?;
        let url = format!("{}/api/proofread", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body: ProofreadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        match body.proofread_text {
            Some(corrected) if !corrected.is_empty() => Ok(corrected),
            _ => Err(ApiError::EmptyResponse),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost:3000".into(),
            api_key: api_key.map(|s| s.to_string()),
            timeout_secs: 10,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = ApiClient::from_config(&make_config(None));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let client = ApiClient::from_config(&make_config(None));
        assert!(matches!(
            client.transcribe(vec![0; 4]).await,
            Err(ApiError::MissingCredential)
        ));
        assert!(matches!(
            client.proofread("text").await,
            Err(ApiError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn empty_api_key_counts_as_missing() {
        let client = ApiClient::from_config(&make_config(Some("")));
        assert!(matches!(
            client.proofread("text").await,
            Err(ApiError::MissingCredential)
        ));
    }

    #[test]
    fn client_is_object_safe() {
        let client = ApiClient::from_config(&make_config(Some("sk-test")));
        let _t: Box<dyn Transcribe> = Box::new(client);
        let client = ApiClient::from_config(&make_config(Some("sk-test")));
        let _p: Box<dyn Proofread> = Box::new(client);
    }

    #[test]
    fn transcribe_response_parses_text_field() {
        let body: TranscribeResponse = serde_json::from_str(r#"{ "text": "hello" }"#).unwrap();
        assert_eq!(body.text, "hello");
    }

    #[test]
    fn proofread_response_tolerates_missing_field() {
        let body: ProofreadResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.proofread_text.is_none());

        let body: ProofreadResponse =
            serde_json::from_str(r#"{ "proofreadText": "hello world" }"#).unwrap();
        assert_eq!(body.proofread_text.as_deref(), Some("hello world"));
    }

    #[test]
    fn status_error_carries_the_code() {
        assert_eq!(ApiError::Status(500).to_string(), "API returned status: 500");
    }
}
