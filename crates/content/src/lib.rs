//! Content providers feeding the build pipeline
//!
//! A provider turns some source of text into the segment stream the
//! pipeline consumes. This crate ships the plain-text provider and the
//! content-addressed cache contract that more expensive providers (LLM
//! annotation, PDF refinement) build on.

pub mod cache;
pub mod plain_text;

pub use cache::{FileCache, TextCache};
pub use plain_text::plain_text_segments;

use thiserror::Error;

/// Errors from content providers.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ContentError> for autopod_core::Error {
    fn from(err: ContentError) -> Self {
        autopod_core::Error::Content(err.to_string())
    }
}
