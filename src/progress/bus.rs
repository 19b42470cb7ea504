// src/progress/bus.rs
// =============================================================================
// A publish/subscribe bus that fans progress events out to live observers.
//
// How it works:
// 1. Each subscriber gets its own bounded mpsc channel
// 2. publish() walks the registry and uses try_send, so it never waits
// 3. A full buffer drops the event for that subscriber only
// 4. A closed receiver is pruned from the registry on the next publish
//
// There is no history: a subscriber only sees events published after it
// subscribed.
//
// Rust concepts:
// - Arc / Weak: shared ownership, and a back-reference that doesn't keep
//   the bus alive
// - Drop: a subscription unregisters itself when it goes out of scope
// - Streams: a subscription can be turned into a lazy async sequence
// =============================================================================

use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use super::{ProgressEvent, ProgressSink};

/// Opaque handle identifying one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

// Registry entry: the sending half plus a flag shared with the subscription
struct Slot {
    tx: mpsc::Sender<ProgressEvent>,
    open: Arc<AtomicBool>,
}

impl Slot {
    fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

pub struct ProgressBus {
    capacity: usize,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, Slot>>,
}

impl ProgressBus {
    /// Creates a bus where every subscriber buffers up to `capacity` events.
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
        })
    }

    /// Registers a new observer. Only events published from now on are delivered.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);
        let open = Arc::new(AtomicBool::new(true));

        self.registry().insert(
            id,
            Slot {
                tx,
                open: Arc::clone(&open),
            },
        );
        debug!(subscriber = id.0, "progress subscriber added");

        Subscription {
            id,
            rx,
            open,
            bus: Arc::downgrade(self),
        }
    }

    /// Removes a subscriber. Returns false if it was already gone.
    ///
    /// Safe to call any number of times; nothing is delivered afterwards.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        match self.registry().remove(&id) {
            Some(slot) => {
                slot.close();
                debug!(subscriber = id.0, "progress subscriber removed");
                true
            }
            None => false,
        }
    }

    /// Hands `event` to every subscriber without waiting on any of them.
    pub fn publish(&self, event: ProgressEvent) {
        self.registry().retain(|id, slot| match slot.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(subscriber = id.0, "subscriber buffer full, event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => {
                slot.close();
                debug!(subscriber = id.0, "subscriber gone, pruned");
                false
            }
        });
    }

    /// Closes every subscriber, e.g. on shutdown.
    pub fn close_all(&self) {
        let mut subscribers = self.registry();
        for (_, slot) in subscribers.drain() {
            slot.close();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    // A panic while holding the lock can't leave the map half-updated,
    // so a poisoned lock is still usable.
    fn registry(&self) -> MutexGuard<'_, HashMap<SubscriberId, Slot>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressSink for ProgressBus {
    fn publish(&self, event: ProgressEvent) {
        ProgressBus::publish(self, event);
    }
}

/// The receiving side of one subscriber, owned by the connection that created it.
///
/// Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<ProgressEvent>,
    open: Arc<AtomicBool>,
    bus: Weak<ProgressBus>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event. `None` once the subscriber has been removed.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        if !self.is_open() {
            return None;
        }
        let event = self.rx.recv().await?;
        // unsubscribe may have happened while we were waiting
        self.is_open().then_some(event)
    }

    /// Turns the subscription into a one-shot live stream of events.
    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            let event = sub.recv().await?;
            Some((event, sub))
        })
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}
