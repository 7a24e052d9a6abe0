use crate::adapter::ChangeAdapter;
use crate::bus::{EventBus, LocalBus};
use crate::message::{ChangeMessage, ChangeType, NoMetadata};

/// Message published by [`SingleAdapter`].
pub type SingleMessage<D> = ChangeMessage<D, NoMetadata>;

/// A change-notifying wrapper around one value.
///
/// Every [`update`](SingleAdapter::update) publishes an `Update` message
/// with the previous and the new value and no metadata.
///
/// Not internally synchronized: share it across threads behind your own
/// lock.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use change_kit::prelude::*;
///
/// let mut temperature = SingleAdapter::new(20);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// temperature.subscribe(move |msg| {
///     sink.lock().unwrap().push((*msg.old_data(), *msg.new_data()));
/// });
///
/// assert!(temperature.update(22));
/// assert_eq!(temperature.get(), 22);
/// assert_eq!(*seen.lock().unwrap(), vec![(20, 22)]);
/// ```
#[derive(Debug)]
pub struct SingleAdapter<D, B = LocalBus<SingleMessage<D>>> {
    value: D,
    bus: B,
}

impl<D: Clone> SingleAdapter<D> {
    /// Wrap `initial` without publishing anything.
    #[must_use]
    pub fn new(initial: D) -> Self {
        Self::with_bus(initial, LocalBus::new())
    }
}

impl<D: Clone + Default> Default for SingleAdapter<D> {
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<D: Clone, B: EventBus<SingleMessage<D>>> SingleAdapter<D, B> {
    /// Wrap `initial`, publishing through `bus`.
    pub fn with_bus(initial: D, bus: B) -> Self {
        Self {
            value: initial,
            bus,
        }
    }

    /// Replace the value and publish an `Update` message.
    ///
    /// Always returns `true`: replacing a value has no precondition.
    pub fn update(&mut self, data: D) -> bool {
        let old = core::mem::replace(&mut self.value, data);
        self.bus
            .publish(ChangeMessage::new(old, self.value.clone(), ChangeType::Update));
        true
    }

    /// A copy of the current value.
    #[must_use]
    pub fn get(&self) -> D {
        self.value.clone()
    }
}

impl<D: Clone, B: EventBus<SingleMessage<D>>> ChangeAdapter for SingleAdapter<D, B> {
    type Snapshot = D;
    type Metadata = NoMetadata;
    type Bus = B;

    fn bus(&self) -> &B {
        &self.bus
    }

    fn snapshot(&self) -> D {
        self.get()
    }
}
