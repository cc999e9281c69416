//! Audio worker.
//!
//! Produces a deterministic synthetic waveform for each request; no real
//! speech processing happens here.

pub mod handler;
pub mod synth;

pub use handler::AudioHandler;
pub use synth::{synthesize, MIN_DATA_BYTES, WAV_HEADER_BYTES};
