use crate::bus::{EventBus, SubscriptionId};
use crate::filter::Predicate;
use crate::message::ChangeMessage;

/// Core trait that all change adapters implement.
///
/// An adapter owns one container and one event bus. Every successful
/// mutation publishes exactly one [`ChangeMessage`] carrying independent
/// before/after snapshots of the container. Rejected mutations publish
/// nothing.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use change_kit::prelude::*;
///
/// let mut list: ListAdapter<i32> = ListAdapter::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// list.subscribe_filtered(by_change_type(ChangeType::Add), move |msg| {
///     sink.lock().unwrap().push(msg.new_data().clone());
/// });
///
/// list.add(5);
/// list.add(7);
/// assert_eq!(*seen.lock().unwrap(), vec![vec![5], vec![5, 7]]);
/// ```
pub trait ChangeAdapter {
    /// Immutable copy of the container contents.
    type Snapshot;

    /// Payload describing which element(s) a mutation touched.
    type Metadata;

    /// The bus messages are published on.
    type Bus: EventBus<ChangeMessage<Self::Snapshot, Self::Metadata>>;

    /// The bus this adapter publishes to.
    fn bus(&self) -> &Self::Bus;

    /// An independent copy of the current contents.
    fn snapshot(&self) -> Self::Snapshot;

    /// Receive every message this adapter publishes from now on.
    fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ChangeMessage<Self::Snapshot, Self::Metadata>) + Send + Sync + 'static,
    {
        self.bus().subscribe(None, Box::new(listener))
    }

    /// Receive only the messages `filter` accepts.
    fn subscribe_filtered<P, F>(&self, filter: P, listener: F) -> SubscriptionId
    where
        P: Predicate<ChangeMessage<Self::Snapshot, Self::Metadata>> + Send + Sync + 'static,
        F: Fn(&ChangeMessage<Self::Snapshot, Self::Metadata>) + Send + Sync + 'static,
    {
        self.bus().subscribe(Some(Box::new(filter)), Box::new(listener))
    }

    /// Stop delivering to `id`. Returns `false` if it was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus().unsubscribe(id)
    }
}
