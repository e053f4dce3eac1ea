use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::subscriber::ConnectionId;
use super::subscriber::Enqueue;
use super::subscriber::SubscriberHandle;
use super::subscriber::SubscriberSlot;
use super::subscriber::SubscriberState;
use crate::domain::message::events::ChatEvent;
use crate::domain::user::models::Username;

/// Fan-out hub for chat events.
///
/// Keeps one slot per live subscriber, each with its own bounded outbound
/// queue. Publishing enqueues onto every Active slot; a full queue drops
/// that subscriber's oldest pending event instead of making the publisher
/// wait. Delivery is best effort within a single process.
pub struct BroadcastHub {
    /// Map of connection_id -> subscriber slot
    subscribers: RwLock<HashMap<ConnectionId, Arc<SubscriberSlot>>>,
    capacity: usize,
}

impl BroadcastHub {
    /// Default bound for each subscriber's pending-event queue.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

    /// Create a new hub whose subscriber queues hold up to `queue_capacity`
    /// pending events. A capacity of zero is treated as one.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            capacity: queue_capacity.max(1),
        }
    }

    /// Register a subscriber and hand back its receiving end.
    ///
    /// The slot is inserted while still Connecting and only activated under
    /// the registry lock, so a concurrent publish never observes it half
    /// wired. Reusing a connection id closes and replaces the previous slot.
    pub async fn subscribe(
        &self,
        connection_id: ConnectionId,
        username: Username,
    ) -> SubscriberHandle {
        let slot = Arc::new(SubscriberSlot::new(username, self.capacity));

        let mut subscribers = self.subscribers.write().await;
        if let Some(previous) = subscribers.insert(connection_id, Arc::clone(&slot)) {
            previous.close();
            tracing::warn!(
                "Subscriber replaced: {} (user: {})",
                connection_id,
                previous.username()
            );
        }
        slot.activate();
        drop(subscribers);

        tracing::info!(
            "Subscriber added: {} (user: {})",
            connection_id,
            slot.username()
        );

        SubscriberHandle::new(connection_id, slot)
    }

    /// Remove a subscriber and release its queue. Idempotent.
    ///
    /// # Returns
    /// The username that was attached, so callers can fold the departure
    /// into presence; None if the connection was not registered.
    pub async fn unsubscribe(&self, connection_id: ConnectionId) -> Option<Username> {
        let removed = self.subscribers.write().await.remove(&connection_id);

        match removed {
            Some(slot) => {
                slot.close();
                tracing::info!(
                    "Subscriber removed: {} (user: {})",
                    connection_id,
                    slot.username()
                );
                Some(slot.username().clone())
            }
            None => None,
        }
    }

    /// Deliver an event to every currently Active subscriber.
    ///
    /// Holding the registry write lock for the whole pass totally orders
    /// concurrent publishes: every subscriber observes events in the same
    /// order, and a subscriber added afterwards never sees this event.
    /// Slots found Closed (a dropped handle nobody unsubscribed) are swept
    /// out of the registry in the same pass.
    ///
    /// # Returns
    /// How many subscribers the event was enqueued for.
    pub async fn publish(&self, event: ChatEvent) -> usize {
        let mut delivered = 0usize;
        let mut dropped = 0usize;

        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|connection_id, slot| match slot.enqueue(event.clone()) {
            Enqueue::Delivered => {
                delivered += 1;
                true
            }
            Enqueue::DroppedOldest => {
                delivered += 1;
                dropped += 1;
                tracing::warn!(
                    "Queue full for subscriber {} (user: {}), dropped oldest event",
                    connection_id,
                    slot.username()
                );
                true
            }
            Enqueue::Skipped(SubscriberState::Closed) => false,
            Enqueue::Skipped(_) => true,
        });
        drop(subscribers);

        tracing::debug!(
            "Published {} event: delivered={}, dropped={}",
            event.event_type(),
            delivered,
            dropped
        );

        delivered
    }

    /// Distinct usernames across Active subscribers, sorted.
    pub async fn online_users(&self) -> Vec<String> {
        let subscribers = self.subscribers.read().await;
        let mut users: Vec<String> = subscribers
            .values()
            .filter(|slot| slot.state() == SubscriberState::Active)
            .map(|slot| slot.username().as_str().to_string())
            .collect();
        users.sort();
        users.dedup();
        users
    }

    /// Number of Active subscriber slots.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .await
            .values()
            .filter(|slot| slot.state() == SubscriberState::Active)
            .count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUEUE_CAPACITY)
    }
}
