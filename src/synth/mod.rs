//! Speech synthesis collaborator interface.
//!
//! The pipeline only knows the [`Synthesizer`] trait: text plus voice
//! parameters in, raw audio bytes out. The wire protocol and authentication
//! live behind the trait (see [`http::SpeechClient`] for the REST
//! implementation).

pub mod http;
pub mod limiter;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::EngineTier;

pub use http::SpeechClient;
pub use limiter::RateLimiter;

/// Errors from the synthesis service; always fatal to the run
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("speech service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("speech service returned {status}: {message}")]
    Service { status: u16, message: String },
}

/// One synthesis request
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Text to synthesize
    pub text: String,

    /// Language code of the text
    pub language_code: String,

    /// Voice to synthesize with
    pub voice_id: String,

    /// Engine quality tier
    pub engine: EngineTier,
}

/// Trait for external speech synthesis backends
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Synthesize the request into raw audio bytes
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError>;
}
