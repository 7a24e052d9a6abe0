//! Publish/subscribe substrate the adapters emit through.
//!
//! [`EventBus`] is the narrow seam between an adapter and its delivery
//! strategy. [`LocalBus`] is the default: synchronous fan-out to every
//! matching subscriber, on the publishing thread, in registration order.
//!
//! Snapshot-on-publish semantics:
//!   - A subscriber removed *during* a publish still receives that event.
//!   - A subscriber added *during* a publish only sees later events.
//!
//! The subscriber list lock is never held while callbacks run, so a
//! callback may subscribe or unsubscribe without deadlocking. Panics in a
//! callback propagate to the caller that published.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::filter::Predicate;

/// Closure type for subscribers.
pub type Listener<E> = dyn Fn(&E) + Send + Sync;

/// A boxed subscriber callback.
pub type BoxedListener<E> = Box<Listener<E>>;

/// A boxed, thread-safe event filter.
pub type BoxedPredicate<E> = Box<dyn Predicate<E> + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// The raw numeric id.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A multicast event channel with per-subscriber filters.
///
/// Implementations must deliver events to each subscriber in publish order.
/// Nothing is replayed: a subscriber only sees events published after it
/// subscribed.
pub trait EventBus<E> {
    /// Deliver `event` to every subscriber whose filter accepts it.
    fn publish(&self, event: E);

    /// Register `listener`, optionally guarded by `filter`.
    fn subscribe(
        &self,
        filter: Option<BoxedPredicate<E>>,
        listener: BoxedListener<E>,
    ) -> SubscriptionId;

    /// Remove a subscriber. Returns `false` if `id` was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Number of currently registered subscribers.
    fn subscriber_count(&self) -> usize;
}

struct Subscriber<E> {
    id: SubscriptionId,
    filter: Option<BoxedPredicate<E>>,
    listener: BoxedListener<E>,
}

impl<E> Subscriber<E> {
    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |f| f.test(event))
    }
}

/// Synchronous, same-thread [`EventBus`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use change_kit::bus::{EventBus, LocalBus};
///
/// let bus: LocalBus<u32> = LocalBus::new();
/// let seen = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&seen);
/// let id = bus.subscribe(None, Box::new(move |_| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// bus.publish(1);
/// bus.unsubscribe(id);
/// bus.publish(2);
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct LocalBus<E> {
    subscribers: Mutex<Vec<Arc<Subscriber<E>>>>,
    next_id: AtomicU64,
}

impl<E> LocalBus<E> {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<E> Default for LocalBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for LocalBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBus")
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}

impl<E> EventBus<E> for LocalBus<E> {
    fn publish(&self, event: E) {
        let snapshot: Vec<Arc<Subscriber<E>>> = self.subscribers.lock().clone();
        tracing::trace!(subscribers = snapshot.len(), "publishing change event");

        for subscriber in snapshot {
            if subscriber.accepts(&event) {
                (subscriber.listener)(&event);
            }
        }
    }

    fn subscribe(
        &self,
        filter: Option<BoxedPredicate<E>>,
        listener: BoxedListener<E>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let filtered = filter.is_some();
        self.subscribers.lock().push(Arc::new(Subscriber {
            id,
            filter,
            listener,
        }));
        tracing::debug!(%id, filtered, "subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;
        drop(subscribers);

        tracing::debug!(%id, removed, "unsubscribed");
        removed
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
