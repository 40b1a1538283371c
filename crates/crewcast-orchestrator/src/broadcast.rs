use crewcast_core::{EventFilter, TaskEvent};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

struct Subscriber {
    id: u64,
    filter: EventFilter,
    tx: mpsc::Sender<TaskEvent>,
}

/// Fans task state transitions out to subscribers.
///
/// Publication is fire-and-forget: each subscriber has a bounded buffer, and
/// a subscriber that falls behind (buffer full) or disconnects is dropped so
/// it can never block the executor pool or other subscribers. Events for a
/// single task arrive in transition order because the pool publishes each
/// task's transitions from one place, in sequence. Dropped subscribers must
/// re-subscribe and may miss a contiguous run of events; durable history
/// lives in the task store, not here.
pub struct StatusBroadcaster {
    subscribers: RwLock<Vec<Subscriber>>,
    buffer: usize,
    next_id: AtomicU64,
}

impl StatusBroadcaster {
    /// Creates a broadcaster with the given per-subscriber buffer size.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            buffer: buffer.max(1),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a subscriber and returns its event stream.
    ///
    /// The stream yields every published event matching `filter` until the
    /// subscriber is dropped for falling behind or the stream is dropped by
    /// the caller.
    pub fn subscribe(&self, filter: EventFilter) -> ReceiverStream<TaskEvent> {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push(Subscriber { id, filter, tx });
        debug!(subscriber = id, "Subscriber added");
        ReceiverStream::new(rx)
    }

    /// Publishes an event to every matching subscriber. Never blocks.
    pub fn publish(&self, event: &TaskEvent) {
        let mut dropped = Vec::new();
        {
            let subscribers = self.subscribers.read();
            for sub in subscribers.iter() {
                if !sub.filter.matches(event) {
                    continue;
                }
                match sub.tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            subscriber = sub.id,
                            task_id = %event.task_id,
                            "Subscriber buffer full, dropping subscriber"
                        );
                        dropped.push(sub.id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dropped.push(sub.id);
                    }
                }
            }
        }
        if !dropped.is_empty() {
            self.subscribers
                .write()
                .retain(|sub| !dropped.contains(&sub.id));
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
