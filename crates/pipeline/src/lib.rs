//! Streaming segment-to-audio build pipeline
//!
//! This crate turns an ordered stream of narration segments into one audio
//! file:
//! - Synthesis adapter rendering each segment to a WAV artifact
//! - Bounded worker pool fanning synthesis out across concurrent tasks
//! - Ordered assembly pipeline preserving production order in the output
//! - Muxer invoking the external concatenation tool
//!
//! Segment production is sequential and possibly slow, synthesis dominates
//! latency and benefits from concurrency, and the final file must follow
//! production order regardless of completion order. The ordering manifest
//! is written at production time, which is what lets workers complete out
//! of order without reordering the output.

pub mod audio;
pub mod builder;
pub mod muxer;
pub mod pool;
pub mod synth;

pub use builder::AudioBuilder;
pub use muxer::{concat_audio, MuxOutcome};
pub use pool::{QueueMessage, WorkItem, WorkerPool};
pub use synth::{
    ratio_to_percent, EdgeTtsBackend, SegmentRenderer, SpeechRequest, SynthesisError, TtsBackend,
    TtsChunk, TtsStream,
};

use std::path::PathBuf;
use thiserror::Error;

use autopod_core::SegmentError;

/// Errors that abort a build.
///
/// Non-fatal conditions (an unrecognized segment kind, a non-zero exit
/// from the concatenation tool) are logged instead of surfacing here.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A segment failed its parameter contract, before any synthesis work
    /// was queued for it.
    #[error("segment at slot {slot} failed validation: {source}")]
    Validation {
        slot: u32,
        #[source]
        source: SegmentError,
    },

    /// The backend or the artifact write failed for one slot.
    #[error("synthesis failed for {}: {source}", .path.display())]
    Synthesis {
        path: PathBuf,
        #[source]
        source: SynthesisError,
    },

    /// The upstream segment source failed mid-stream. Whatever manifest
    /// entries and artifacts exist already are left for diagnosis.
    #[error("segment source failed: {0}")]
    Upstream(String),

    /// Every worker exited while segments were still being produced.
    #[error("work queue closed before the segment stream was drained")]
    QueueClosed,

    /// A worker task panicked or was aborted.
    #[error("worker task failed: {0}")]
    WorkerJoin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BuildError> for autopod_core::Error {
    fn from(err: BuildError) -> Self {
        autopod_core::Error::Pipeline(err.to_string())
    }
}
