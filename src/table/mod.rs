//! Tabular input and output.
//!
//! The source streams validated records off a blocking reader task; the
//! sink serializes output records onto a blocking writer task. Both bridge
//! into the async pipeline through mpsc channels.

pub mod sink;
pub mod source;

pub use sink::{spawn_sink, SinkError};
pub use source::{spawn_source, SourceError};
