//! Classifier worker pool
//!
//! A fixed set of threads share one bounded channel of captured pieces. Each
//! worker classifies outside the lock, then takes the single shared lock for
//! deliver-check-assemble. Dropping the sender is the shutdown signal; the
//! join handles are the barrier.

use std::io;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use hashbrown::HashMap;
use image::RgbaImage;
use tracing::{debug, warn};

use super::PipelineError;
use crate::classify::EventClassifier;
use crate::reconcile::{Delivery, FragmentKey, Reconciler};
use crate::timeline::{MatchId, MatchTimeline};

/// One screenshot queued for classification
pub(crate) struct WorkItem {
    pub match_id: MatchId,
    pub key: FragmentKey,
    pub image: RgbaImage,
}

/// State every worker mutates, behind one lock
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub reconciler: Reconciler,
    /// Matches that reached completeness; `None` if they held no events
    pub completed: HashMap<MatchId, Option<MatchTimeline>>,
    pub lost_pieces: usize,
}

impl Shared {
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler,
            ..Self::default()
        }
    }
}

/// Lock the shared state, recovering from a panicked worker
pub(crate) fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) struct WorkerPool {
    sender: Option<Sender<WorkItem>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` threads (at least one) on a queue of `capacity` (at least one)
    pub fn spawn(
        workers: usize,
        capacity: usize,
        classifier: Arc<dyn EventClassifier>,
        shared: Arc<Mutex<Shared>>,
    ) -> io::Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded::<WorkItem>(capacity.max(1));
        let mut pool = Self {
            sender: Some(sender),
            handles: Vec::with_capacity(workers.max(1)),
        };

        for index in 0..workers.max(1) {
            let receiver = receiver.clone();
            let classifier = Arc::clone(&classifier);
            let shared = Arc::clone(&shared);
            // On spawn failure `pool` drops, closing the queue for the threads already running
            let handle = thread::Builder::new()
                .name(format!("classify-{index}"))
                .spawn(move || run_worker(receiver, classifier.as_ref(), &shared))?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    /// Queue a piece, blocking while the queue is full
    pub fn submit(&self, item: WorkItem) -> Result<(), PipelineError> {
        let sender = self.sender.as_ref().ok_or(PipelineError::WorkersGone)?;
        sender.send(item).map_err(|_| PipelineError::WorkersGone)
    }

    /// Close the queue and wait for every worker to drain it
    pub fn finish(mut self) -> Result<(), PipelineError> {
        self.sender = None;
        let mut panicked = false;
        for handle in mem::take(&mut self.handles) {
            panicked |= handle.join().is_err();
        }
        if panicked {
            Err(PipelineError::WorkerPanicked)
        } else {
            Ok(())
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender = None;
        for handle in mem::take(&mut self.handles) {
            let _ = handle.join();
        }
    }
}

fn run_worker(
    receiver: Receiver<WorkItem>,
    classifier: &dyn EventClassifier,
    shared: &Mutex<Shared>,
) {
    for item in receiver.iter() {
        let result = classifier.classify(&item.image);
        let mut state = lock(shared);
        match result {
            Ok(events) => {
                let delivery = state.reconciler.deliver(&item.match_id, item.key, events);
                if let Delivery::Completed(timeline) = delivery {
                    debug!(match_id = %item.match_id, "match complete");
                    state.completed.insert(item.match_id, timeline);
                }
            }
            Err(err) => {
                warn!(match_id = %item.match_id, piece = item.key.piece_index, "{err}");
                state.lost_pieces += 1;
                state.reconciler.record_lost(&item.match_id, item.key.piece_index);
            }
        }
    }
}
