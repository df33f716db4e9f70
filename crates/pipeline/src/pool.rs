//! Bounded worker pool
//!
//! A fixed number of consumers drain one shared bounded queue of work
//! items, each invoking the synthesis adapter. The bounded queue is the
//! backpressure mechanism: when it is full, the producer's submit
//! suspends until a worker frees a slot.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use autopod_core::Segment;

use crate::synth::SegmentRenderer;
use crate::BuildError;

/// One unit of synthesis work: a slot artifact path and its segment.
///
/// Produced once by the assembly pipeline, consumed exactly once by
/// exactly one worker.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub slot_path: PathBuf,
    pub segment: Segment,
}

/// Queue protocol between the producer and the workers.
#[derive(Debug)]
pub enum QueueMessage {
    Job(WorkItem),
    /// Drain sentinel; each worker exits after observing one.
    Shutdown,
}

/// Fixed-size pool of consumers over one shared bounded queue.
pub struct WorkerPool {
    sender: mpsc::Sender<QueueMessage>,
    handles: Vec<JoinHandle<Result<(), BuildError>>>,
}

impl WorkerPool {
    /// Spawn `worker_count` consumers sharing a queue of `queue_capacity`.
    pub fn spawn(
        renderer: Arc<SegmentRenderer>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let handles = (0..worker_count)
            .map(|worker| {
                let renderer = Arc::clone(&renderer);
                let receiver = Arc::clone(&receiver);
                tokio::spawn(worker_loop(worker, renderer, receiver))
            })
            .collect();
        Self { sender, handles }
    }

    /// Enqueue one work item, suspending while the queue is at capacity.
    pub async fn submit(&self, item: WorkItem) -> Result<(), BuildError> {
        self.sender
            .send(QueueMessage::Job(item))
            .await
            .map_err(|_| BuildError::QueueClosed)
    }

    /// Push one shutdown sentinel per worker, then wait until every
    /// consumer has finished handling the items it already picked up.
    /// The first worker error is returned.
    pub async fn drain(self) -> Result<(), BuildError> {
        for _ in 0..self.handles.len() {
            // A closed channel means the workers are already gone; the
            // join below surfaces whatever stopped them.
            if self.sender.send(QueueMessage::Shutdown).await.is_err() {
                break;
            }
        }
        drop(self.sender);

        let mut first_error = None;
        for handle in self.handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(BuildError::WorkerJoin(join_err.to_string()));
                    }
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }
}

async fn worker_loop(
    worker: usize,
    renderer: Arc<SegmentRenderer>,
    receiver: Arc<Mutex<mpsc::Receiver<QueueMessage>>>,
) -> Result<(), BuildError> {
    loop {
        // Hold the lock only for the dequeue so the other consumers can
        // make progress while this one synthesizes.
        let message = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        match message {
            Some(QueueMessage::Job(item)) => {
                if matches!(item.segment, Segment::Unknown) {
                    // A malformed item must not take the worker down.
                    tracing::warn!(
                        worker,
                        path = %item.slot_path.display(),
                        "ignoring unrecognized segment on the queue"
                    );
                    continue;
                }
                tracing::debug!(
                    worker,
                    path = %item.slot_path.display(),
                    kind = item.segment.kind(),
                    "rendering segment"
                );
                renderer
                    .render(&item.slot_path, &item.segment)
                    .await
                    .map_err(|source| BuildError::Synthesis {
                        path: item.slot_path.clone(),
                        source,
                    })?;
            }
            Some(QueueMessage::Shutdown) | None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopod_config::TrimConfig;
    use crate::synth::{SpeechRequest, SynthesisError, TtsBackend, TtsStream};

    /// Backend that must never be reached.
    struct PanicBackend;

    #[async_trait::async_trait]
    impl TtsBackend for PanicBackend {
        async fn stream(&self, request: SpeechRequest) -> Result<TtsStream, SynthesisError> {
            panic!("backend called for {:?}", request.text);
        }
    }

    fn renderer() -> Arc<SegmentRenderer> {
        Arc::new(SegmentRenderer::new(
            Arc::new(PanicBackend),
            TrimConfig::default(),
            24_000,
        ))
    }

    #[tokio::test]
    async fn test_drain_with_no_work() {
        let pool = WorkerPool::spawn(renderer(), 3, 8);
        assert_eq!(pool.worker_count(), 3);
        pool.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_item_does_not_crash_workers() {
        let dir = tempfile::tempdir().unwrap();
        let pool = WorkerPool::spawn(renderer(), 2, 8);
        pool.submit(WorkItem {
            slot_path: dir.path().join("0000.wav"),
            segment: Segment::Unknown,
        })
        .await
        .unwrap();
        // Workers skip the item and drain cleanly; the backend is never
        // touched.
        pool.drain().await.unwrap();
    }

    #[tokio::test]
    async fn test_silence_items_render_without_backend() {
        let dir = tempfile::tempdir().unwrap();
        let pool = WorkerPool::spawn(renderer(), 2, 8);
        for slot in 0..4u32 {
            pool.submit(WorkItem {
                slot_path: dir.path().join(format!("{slot:04}.wav")),
                segment: Segment::silence(0.1),
            })
            .await
            .unwrap();
        }
        pool.drain().await.unwrap();
        for slot in 0..4u32 {
            assert!(dir.path().join(format!("{slot:04}.wav")).exists());
        }
    }
}
