//! REST speech synthesis client.
//!
//! Talks to a Polly-style `/v1/speech` endpoint: a JSON request describing
//! the text and voice, raw audio bytes back. Authentication is a bearer
//! token when configured; anything richer is the gateway's concern.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SynthesisError, SynthesisRequest, Synthesizer};

/// Request body for the speech endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SpeechRequestBody<'a> {
    output_format: &'a str,
    text: &'a str,
    voice_id: &'a str,
    language_code: &'a str,
    engine: &'a str,
}

/// Error payload returned by the speech service
#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    message: String,
}

/// HTTP client for a Polly-compatible speech endpoint
pub struct SpeechClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl SpeechClient {
    /// Create a client for the regional default endpoint
    pub fn for_region(region: &str) -> Self {
        Self::with_endpoint(format!("https://polly.{}.amazonaws.com", region))
    }

    /// Create a client for an explicit endpoint (no trailing slash)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token for authentication
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl Synthesizer for SpeechClient {
    fn name(&self) -> &str {
        "speech-rest"
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        let url = format!("{}/v1/speech", self.endpoint);
        let body = SpeechRequestBody {
            output_format: crate::domain::AUDIO_EXTENSION,
            text: &request.text,
            voice_id: &request.voice_id,
            language_code: &request.language_code,
            engine: request.engine.as_str(),
        };

        let mut http_request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ServiceError>().await {
                Ok(err) if !err.message.is_empty() => err.message,
                _ => status.to_string(),
            };
            return Err(SynthesisError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let audio = response.bytes().await?;
        debug!(
            voice = %request.voice_id,
            engine = %request.engine,
            bytes = audio.len(),
            "synthesis response received"
        );
        Ok(audio.to_vec())
    }
}
