//! Live event broadcaster
//!
//! Fans every published event out to all currently registered subscribers.
//!
//! # Design
//!
//! Each subscriber owns its own unbounded queue. A publish pushes a clone of
//! the event onto every queue, which never blocks, so a subscriber that stops
//! reading only grows its own backlog and never holds up the publisher or the
//! other subscribers. The registry is guarded by a mutex: the set of
//! subscribers that receive an event is fixed while that mutex is held.
//!
//! A bounded `tokio::sync::broadcast` channel would drop events for lagging
//! receivers, which breaks the exactly-once guarantee.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::subscription::Subscription;
use crate::types::Event;

/// Identifier of a registered subscriber channel
pub type SubscriberId = u64;

/// Registered subscriber channels
#[derive(Debug, Default)]
pub(crate) struct Registry {
    next_id: SubscriberId,
    channels: Vec<(SubscriberId, mpsc::UnboundedSender<Event>)>,
}

impl Registry {
    /// Remove a channel; returns whether it was still registered
    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.channels.len();
        self.channels.retain(|(channel_id, _)| *channel_id != id);
        let removed = self.channels.len() < before;
        if removed {
            debug!(
                subscriber_id = id,
                subscribers = self.channels.len(),
                "LiveBroadcaster: unsubscribed"
            );
        }
        removed
    }
}

/// Multicast channel delivering new events to every live subscriber
#[derive(Debug, Default)]
pub struct LiveBroadcaster {
    registry: Arc<Mutex<Registry>>,
}

impl LiveBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh, independent subscriber channel
    ///
    /// The subscription receives every event published from now on, in
    /// publish order, until it is dropped or unsubscribed.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.channels.push((id, tx));
        let subscribers = registry.channels.len();
        drop(registry);

        debug!(subscriber_id = id, subscribers, "LiveBroadcaster::subscribe");
        Subscription::new(id, rx, Arc::downgrade(&self.registry))
    }

    /// Deliver `event` to every registered subscriber
    ///
    /// Returns the number of subscribers that received it. Channels whose
    /// receiving side is gone are pruned along the way.
    pub fn publish(&self, event: &Event) -> usize {
        let mut registry = self.registry.lock();
        let before = registry.channels.len();
        registry
            .channels
            .retain(|(_, tx)| tx.send(event.clone()).is_ok());
        let delivered = registry.channels.len();

        if delivered < before {
            trace!(pruned = before - delivered, "LiveBroadcaster::publish: pruned closed channels");
        }
        delivered
    }

    /// Release a subscriber channel
    ///
    /// Safe to call at any time, including while a publish is in flight.
    /// Returns `false` if the id was not (or no longer) registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.registry.lock().remove(id)
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().channels.len()
    }
}
