//! Plain-text narration source
//!
//! Reads a UTF-8 text file line by line: non-blank lines become speech in
//! the given voice, blank lines become a paragraph pause.

use std::path::PathBuf;

use async_stream::try_stream;
use futures::Stream;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

use autopod_core::Segment;

use crate::ContentError;

/// Pause inserted for blank lines, in seconds.
const PARAGRAPH_PAUSE_SECS: f64 = 1.0;

/// Stream a text file as narration segments.
pub fn plain_text_segments(
    path: PathBuf,
    voice: String,
) -> impl Stream<Item = Result<Segment, ContentError>> {
    try_stream! {
        let file = File::open(&path).await?;
        let mut lines = BufReader::new(file).lines();
        while let Some(line) = lines.next_line().await? {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                yield Segment::silence(PARAGRAPH_PAUSE_SECS);
            } else {
                yield Segment::speech(trimmed, voice.clone());
            }
        }
    }
}
