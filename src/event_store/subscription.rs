//! Subscription handles
//!
//! - [`Subscription`]: live feed of events appended after subscribing.
//! - [`EventStream`]: combined read, a replayed backlog followed by the live
//!   feed, as one gapless sequence.
//!
//! Both implement [`futures::Stream`] for async consumers and also offer
//! blocking and non-blocking receives for plain threads. Neither ends on its
//! own: they yield `None` only once the owning store has been dropped.

use std::fmt;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

use super::broadcaster::{Registry, SubscriberId};
use crate::types::Event;

/// Outcome of a non-blocking receive that produced no event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TryRecvError {
    /// Nothing queued right now
    #[error("no event available")]
    Empty,
    /// The channel was released, by an unsubscribe or by dropping the store,
    /// and the queue has been drained
    #[error("subscription closed")]
    Closed,
}

impl From<mpsc::error::TryRecvError> for TryRecvError {
    fn from(e: mpsc::error::TryRecvError) -> Self {
        match e {
            mpsc::error::TryRecvError::Empty => TryRecvError::Empty,
            mpsc::error::TryRecvError::Disconnected => TryRecvError::Closed,
        }
    }
}

/// Live subscription to newly appended events
///
/// Dropping the subscription unregisters it.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::UnboundedReceiver<Event>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        rx: mpsc::UnboundedReceiver<Event>,
        registry: Weak<Mutex<Registry>>,
    ) -> Self {
        Self { id, rx, registry }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Block the current thread until the next event arrives
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Event> {
        self.rx.blocking_recv()
    }

    /// Take the next queued event without waiting
    pub fn try_recv(&mut self) -> Result<Event, TryRecvError> {
        Ok(self.rx.try_recv()?)
    }

    /// Number of events delivered but not yet received
    pub fn queued(&self) -> usize {
        self.rx.len()
    }

    /// Stop receiving events
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub(crate) fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(self.id);
        }
    }
}

impl Stream for Subscription {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.get_mut().poll_recv(cx)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("queued", &self.rx.len())
            .finish()
    }
}

type EventFilter = Box<dyn Fn(&Event) -> bool + Send + Sync>;

/// Combined replay + live sequence
///
/// Yields the backlog captured at the cut point, then every event delivered on
/// the live subscription registered at that same cut point. An optional filter
/// is applied to both phases without changing relative order.
pub struct EventStream {
    backlog: std::vec::IntoIter<Event>,
    live: Subscription,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub(crate) fn new(backlog: Vec<Event>, live: Subscription) -> Self {
        Self {
            backlog: backlog.into_iter(),
            live,
            filter: None,
        }
    }

    /// Narrow the stream to events matching `predicate`
    ///
    /// Applies to everything not yet yielded. Calling it again requires both
    /// predicates to match.
    pub fn with_filter<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let combined: EventFilter = match self.filter.take() {
            Some(previous) => Box::new(move |e: &Event| previous(e) && predicate(e)),
            None => Box::new(predicate),
        };
        self.filter = Some(combined);
        self
    }

    /// Id of the underlying live subscription
    pub fn subscriber_id(&self) -> SubscriberId {
        self.live.id()
    }

    /// Replayed events not yet yielded, before filtering
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Wait for the next event
    pub async fn next_event(&mut self) -> Option<Event> {
        futures::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Block the current thread until the next event is available
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_next(&mut self) -> Option<Event> {
        if let Some(event) = self.next_from_backlog() {
            return Some(event);
        }
        loop {
            let event = self.live.blocking_recv()?;
            if self.accepts(&event) {
                return Some(event);
            }
        }
    }

    /// Take the next available event without waiting
    pub fn try_next(&mut self) -> Result<Event, TryRecvError> {
        if let Some(event) = self.next_from_backlog() {
            return Ok(event);
        }
        loop {
            let event = self.live.try_recv()?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Stop receiving live events
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn accepts(&self, event: &Event) -> bool {
        self.filter.as_ref().map_or(true, |f| f(event))
    }

    fn next_from_backlog(&mut self) -> Option<Event> {
        while let Some(event) = self.backlog.next() {
            if self.accepts(&event) {
                return Some(event);
            }
        }
        None
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        let this = self.get_mut();
        if let Some(event) = this.next_from_backlog() {
            return Poll::Ready(Some(event));
        }
        loop {
            match futures::ready!(this.live.poll_recv(cx)) {
                Some(event) if this.accepts(&event) => return Poll::Ready(Some(event)),
                Some(_) => continue,
                None => return Poll::Ready(None),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("backlog", &self.backlog.len())
            .field("live", &self.live)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
