//! Data structures shared across the pipeline.
//!
//! Records flow from the source to the workers, output records from the
//! workers to the sink. Content addresses tie a record's key to the audio
//! artifact on disk.

pub mod address;
pub mod record;
pub mod voice;

pub use address::{ContentAddress, AUDIO_EXTENSION};
pub use record::{OutputRecord, Record};
pub use voice::{EngineTier, VoiceProfile};
