//! Segment synthesis
//!
//! The backend contract (`TtsBackend`), the adapter that turns one segment
//! into one decoded audio artifact (`SegmentRenderer`), and the Edge
//! read-aloud backend implementation.

mod adapter;
mod edge;

pub use adapter::{ratio_to_percent, SegmentRenderer};
pub use edge::EdgeTtsBackend;

use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// One unit from a backend response stream.
#[derive(Debug, Clone)]
pub enum TtsChunk {
    /// Synthesized audio bytes: little-endian 16-bit mono PCM.
    Audio(Bytes),
    /// Non-audio payload (boundary metadata, timing marks). Discarded by
    /// the adapter.
    Metadata(String),
}

/// One synthesis request in backend wire terms.
///
/// `rate` and `volume` are signed percent offsets ("+10%", "-5%") as
/// produced by [`ratio_to_percent`].
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    pub rate: String,
    pub volume: String,
}

/// Chunk stream for one synthesis request.
pub type TtsStream = BoxStream<'static, Result<TtsChunk, SynthesisError>>;

/// Failures while synthesizing one segment.
///
/// These propagate unmodified out of the adapter; retry policy, if any,
/// belongs to whoever drives the whole build.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("tts transport error: {0}")]
    Transport(String),

    #[error("backend closed the stream before the turn ended")]
    TruncatedStream,

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Contract for a speech synthesis backend.
#[async_trait::async_trait]
pub trait TtsBackend: Send + Sync {
    /// Begin synthesis for one request and return its chunk stream.
    async fn stream(&self, request: SpeechRequest) -> Result<TtsStream, SynthesisError>;
}
