//! Core types for the autopod narration pipeline
//!
//! This crate provides the foundational types used across all other crates:
//! - The segment model (speech, silence)
//! - Error types

pub mod error;
pub mod segment;

pub use error::{Error, Result, SegmentError};
pub use segment::Segment;
