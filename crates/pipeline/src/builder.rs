//! Ordered assembly pipeline
//!
//! Pulls segments one at a time from the upstream source, assigns each a
//! slot index, commits the slot's path to the ordering manifest at
//! production time, and hands the work item to the bounded pool. The
//! manifest is written before the item can possibly complete, so the
//! final concatenation follows production order no matter how workers
//! interleave. Once the source is exhausted the pool is drained and the
//! muxer merges the manifest into one file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use autopod_config::Settings;
use autopod_core::Segment;

use crate::muxer;
use crate::pool::{WorkItem, WorkerPool};
use crate::synth::{SegmentRenderer, TtsBackend};
use crate::BuildError;

/// Orchestrates one build from a segment stream to a merged audio file.
///
/// One instance owns one temp directory for the duration of a build;
/// concurrent builds must use distinct temp directories.
pub struct AudioBuilder {
    settings: Settings,
    backend: Arc<dyn TtsBackend>,
    cancel: CancellationToken,
}

impl AudioBuilder {
    pub fn new(settings: Settings, backend: Arc<dyn TtsBackend>) -> Self {
        Self {
            settings,
            backend,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops segment intake when cancelled. In-flight work is
    /// still drained and everything produced so far is merged, so a
    /// cancelled build keeps its completed audio.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the build and return the merged output path.
    ///
    /// Temporary artifacts, the manifest, and tool logs are left in the
    /// temp directory afterwards for inspection. Fatal errors also leave
    /// everything written so far in place.
    pub async fn build<S, E>(&self, segments: S) -> Result<PathBuf, BuildError>
    where
        S: Stream<Item = Result<Segment, E>> + Send,
        E: std::fmt::Display,
    {
        let build = &self.settings.build;
        if build.clear_temp_dir && build.temp_dir.exists() {
            fs::remove_dir_all(&build.temp_dir)?;
        }
        fs::create_dir_all(&build.temp_dir)?;
        // Absolute paths: the manifest is consumed by an external tool
        // with its own working directory.
        let temp_dir = fs::canonicalize(&build.temp_dir)?;

        let manifest_path = temp_dir.join("paths.txt");
        let script_path = temp_dir.join("script.txt");
        let output_path = temp_dir.join("out.wav");

        let mut manifest = BufWriter::new(File::create(&manifest_path)?);
        let mut script = BufWriter::new(File::create(&script_path)?);

        let renderer = Arc::new(SegmentRenderer::new(
            Arc::clone(&self.backend),
            self.settings.trim.clone(),
            self.settings.tts.sample_rate,
        ));
        let pool = WorkerPool::spawn(
            renderer,
            build.max_concurrent_generations,
            build.queue_capacity,
        );
        tracing::debug!(
            workers = build.max_concurrent_generations,
            queue = build.queue_capacity,
            temp_dir = %temp_dir.display(),
            "streaming segments"
        );

        let mut slot: u32 = 0;
        let mut segments = std::pin::pin!(segments);
        let streamed: Result<(), BuildError> = loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!(slots = slot, "cancelled, stopping segment intake");
                    break Ok(());
                }
                next = segments.next() => next,
            };
            let segment = match next {
                Some(Ok(segment)) => segment,
                Some(Err(err)) => break Err(BuildError::Upstream(err.to_string())),
                None => break Ok(()),
            };

            if matches!(segment, Segment::Unknown) {
                tracing::warn!(slot, "skipping unrecognized segment from the source");
                continue;
            }
            if let Err(source) = segment.validate() {
                break Err(BuildError::Validation { slot, source });
            }

            let slot_path = temp_dir.join(format!("{slot:04}.wav"));
            tracing::debug!(slot, kind = segment.kind(), path = %slot_path.display(), "segment produced");

            // Committed per line so an aborted build still leaves a
            // readable manifest next to its partial artifacts.
            writeln!(manifest, "file '{}'", slot_path.display())?;
            manifest.flush()?;
            writeln!(script, "{} {:?}", slot_path.display(), segment)?;
            script.flush()?;
            slot += 1;

            // Backpressure: this suspends while the queue is at capacity,
            // coupling segment production to synthesis throughput.
            if let Err(err) = pool.submit(WorkItem { slot_path, segment }).await {
                break Err(err);
            }
        };

        tracing::debug!(slots = slot, "draining workers");
        let drained = pool.drain().await;

        // Prefer the worker error that closed the queue over the
        // producer's view of the closure.
        match (streamed, drained) {
            (Err(BuildError::QueueClosed), Err(err)) => return Err(err),
            (Err(err), _) => return Err(err),
            (Ok(()), Err(err)) => return Err(err),
            (Ok(()), Ok(())) => {}
        }

        manifest.flush()?;
        drop(manifest);
        script.flush()?;
        drop(script);

        tracing::debug!(slots = slot, "merging");
        let outcome =
            muxer::concat_audio(&build.ffmpeg_bin, &manifest_path, &output_path, &temp_dir).await?;
        if !outcome.success() {
            tracing::warn!(
                status = ?outcome.status,
                log = %outcome.log_path.display(),
                "concat tool exited with non-zero status"
            );
        }

        tracing::info!(slots = slot, output = %output_path.display(), "build finished");
        Ok(output_path)
    }
}
