//! mynah - Batch text-to-speech synthesis pipeline
//!
//! Reads a headerless tabular file whose first column is the text to
//! synthesize, fetches missing audio from an external speech service under
//! a global rate cap, and writes the table back out with a generated audio
//! filename appended to every row.
//!
//! # Architecture
//!
//! The run is a fan-out/fan-in pipeline:
//! - A source task streams validated records off the input table
//! - A duplicate-tracker actor serializes seen-key bookkeeping
//! - One worker task per record reuses a cached artifact or performs a
//!   rate-limited synthesis call
//! - A sink task serializes output rows and persists the table atomically
//!   once every worker has finished
//!
//! Audio artifacts are content-addressed by the SHA-256 digest of the
//! synthesis key, so a warm cache makes reruns free: nothing already on
//! disk is ever requested again.
//!
//! # Modules
//!
//! - `cache`: content-addressed artifact store
//! - `cli`: command-line interface
//! - `config`: environment-derived service settings
//! - `domain`: records, content addresses, voice parameters
//! - `pipeline`: duplicate tracker, workers, orchestration
//! - `synth`: speech service client and rate limiter
//! - `table`: tabular source and sink
//!
//! # Usage
//!
//! ```bash
//! mynah -i phrases.csv -o phrases_with_audio.csv -a audio/ \
//!     -l en-US -v Joanna --neural
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod synth;
pub mod table;

// Re-export main types at crate root for convenience
pub use cache::{BlobStore, CacheError, DirBlobStore};
pub use domain::{ContentAddress, EngineTier, OutputRecord, Record, VoiceProfile};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, SeenOutcome, SeenTracker};
pub use synth::{RateLimiter, SpeechClient, SynthesisError, SynthesisRequest, Synthesizer};
pub use table::{SinkError, SourceError};
