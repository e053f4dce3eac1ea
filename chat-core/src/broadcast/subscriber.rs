use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::message::events::ChatEvent;
use crate::domain::user::models::Username;

/// Opaque identifier for one subscriber connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Generate a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a subscriber slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    /// Being wired up; publishers skip it.
    Connecting,
    /// Receiving events.
    Active,
    /// Queue released; no further delivery.
    Closed,
}

/// What happened to one subscriber during a publish.
pub(crate) enum Enqueue {
    Delivered,
    DroppedOldest,
    Skipped(SubscriberState),
}

struct SlotInner {
    state: SubscriberState,
    queue: VecDeque<ChatEvent>,
    dropped: u64,
}

/// Shared state of one subscriber: a bounded event queue plus lifecycle.
///
/// Publishers and the receiving handle touch the queue from different tasks,
/// so it sits behind a mutex; the critical sections are push and pop only,
/// never consumption, which keeps publishers from ever waiting on a slow
/// subscriber.
pub(crate) struct SubscriberSlot {
    username: Username,
    capacity: usize,
    inner: Mutex<SlotInner>,
    notify: Notify,
}

impl SubscriberSlot {
    pub(crate) fn new(username: Username, capacity: usize) -> Self {
        Self {
            username,
            capacity,
            inner: Mutex::new(SlotInner {
                state: SubscriberState::Connecting,
                queue: VecDeque::new(),
                dropped: 0,
            }),
            notify: Notify::new(),
        }
    }

    pub(crate) fn username(&self) -> &Username {
        &self.username
    }

    pub(crate) fn state(&self) -> SubscriberState {
        self.inner.lock().unwrap().state
    }

    /// Transition Connecting -> Active; no effect on a Closed slot.
    pub(crate) fn activate(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == SubscriberState::Connecting {
            inner.state = SubscriberState::Active;
        }
    }

    /// Mark the slot Closed and release its queue. Idempotent.
    pub(crate) fn close(&self) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != SubscriberState::Closed {
                inner.state = SubscriberState::Closed;
                inner.queue.clear();
            }
        }
        // Wake a pending recv so it can observe the closure.
        self.notify.notify_one();
    }

    /// Offer an event to this slot.
    ///
    /// Only Active slots accept events. A full queue drops its oldest
    /// pending event to make room; the publisher itself never waits.
    pub(crate) fn enqueue(&self, event: ChatEvent) -> Enqueue {
        let outcome = {
            let mut inner = self.inner.lock().unwrap();
            match inner.state {
                SubscriberState::Active => {
                    let mut outcome = Enqueue::Delivered;
                    if inner.queue.len() >= self.capacity {
                        inner.queue.pop_front();
                        inner.dropped += 1;
                        outcome = Enqueue::DroppedOldest;
                    }
                    inner.queue.push_back(event);
                    outcome
                }
                state => Enqueue::Skipped(state),
            }
        };

        if matches!(outcome, Enqueue::Delivered | Enqueue::DroppedOldest) {
            self.notify.notify_one();
        }
        outcome
    }
}

/// Receiving end of one subscription, returned by the hub.
///
/// Dropping the handle closes the slot, so an abandoned connection stops
/// accumulating events even if nobody called unsubscribe for it; the hub
/// sweeps the dead slot out of its registry on the next publish.
pub struct SubscriberHandle {
    connection_id: ConnectionId,
    slot: Arc<SubscriberSlot>,
}

impl SubscriberHandle {
    pub(crate) fn new(connection_id: ConnectionId, slot: Arc<SubscriberSlot>) -> Self {
        Self { connection_id, slot }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn username(&self) -> &Username {
        self.slot.username()
    }

    pub fn state(&self) -> SubscriberState {
        self.slot.state()
    }

    /// Number of events waiting to be received.
    pub fn len(&self) -> usize {
        self.slot.inner.lock().unwrap().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many pending events were discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.slot.inner.lock().unwrap().dropped
    }

    /// Receive the next event, waiting if the queue is empty.
    ///
    /// Returns `None` once the subscription is closed, whether by
    /// `close`, by the hub's unsubscribe, or by replacement.
    pub async fn recv(&mut self) -> Option<ChatEvent> {
        loop {
            {
                let mut inner = self.slot.inner.lock().unwrap();
                if inner.state == SubscriberState::Closed {
                    return None;
                }
                if let Some(event) = inner.queue.pop_front() {
                    return Some(event);
                }
            }
            self.slot.notify.notified().await;
        }
    }

    /// Close the subscription. Pending events are discarded.
    pub fn close(&self) {
        self.slot.close();
    }
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        self.slot.close();
    }
}
