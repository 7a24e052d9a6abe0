use std::collections::BTreeSet;

use crate::adapter::ChangeAdapter;
use crate::bus::{EventBus, LocalBus};
use crate::message::{ChangeMessage, ChangeType, MetadataShape, Shaped};

/// Metadata attached to [`SetAdapter`] messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "D: Ord + serde::Deserialize<'de>"))
)]
pub enum SetChange<D> {
    /// The single element added or removed.
    Item(D),
    /// The elements added or removed by a batch operation.
    Batch(BTreeSet<D>),
    /// The `(old, new)` pair exchanged by an update.
    Swap(D, D),
}

impl<D> Shaped for SetChange<D> {
    fn shape(&self) -> MetadataShape {
        match self {
            Self::Item(_) => MetadataShape::Item,
            Self::Batch(_) => MetadataShape::Batch,
            Self::Swap(..) => MetadataShape::Swap,
        }
    }
}

/// Message published by [`SetAdapter`].
pub type SetMessage<D> = ChangeMessage<BTreeSet<D>, SetChange<D>>;

/// A change-notifying set of unique elements.
///
/// Adding an existing member, removing a missing one, or any batch
/// containing such an element is rejected as a whole: `false` is returned
/// and nothing is published.
///
/// Not internally synchronized: share it across threads behind your own
/// lock.
///
/// # Example
///
/// ```
/// use change_kit::prelude::*;
///
/// let mut set = SetAdapter::from_items([1, 2]);
///
/// // 2 is already a member, so it cannot take 1's place.
/// assert!(!set.update(&1, 2));
/// assert!(set.update(&1, 3));
/// assert_eq!(set.get_all().into_iter().collect::<Vec<_>>(), vec![2, 3]);
/// ```
#[derive(Debug)]
pub struct SetAdapter<D: Ord, B = LocalBus<SetMessage<D>>> {
    items: BTreeSet<D>,
    bus: B,
}

impl<D: Ord + Clone> SetAdapter<D> {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(LocalBus::new())
    }

    /// Create a set holding `items`, without publishing anything.
    pub fn from_items(items: impl IntoIterator<Item = D>) -> Self {
        let mut adapter = Self::new();
        adapter.items.extend(items);
        adapter
    }
}

impl<D: Ord + Clone> Default for SetAdapter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Ord + Clone, B: EventBus<SetMessage<D>>> SetAdapter<D, B> {
    /// Create an empty set publishing through `bus`.
    pub fn with_bus(bus: B) -> Self {
        Self {
            items: BTreeSet::new(),
            bus,
        }
    }

    /// Insert `item` and publish `Add` with `Item(item)`.
    ///
    /// Rejected if `item` is already a member.
    pub fn add(&mut self, item: D) -> bool {
        if self.items.contains(&item) {
            tracing::debug!("rejected add: item already present");
            return false;
        }

        let old = self.items.clone();
        self.items.insert(item.clone());
        self.publish(old, ChangeType::Add, SetChange::Item(item));
        true
    }

    /// Insert every element of `items` and publish one `Add` with the batch.
    ///
    /// Rejected, with no change, if any element is already a member.
    pub fn add_all(&mut self, items: impl IntoIterator<Item = D>) -> bool {
        let batch: BTreeSet<D> = items.into_iter().collect();
        if !self.items.is_disjoint(&batch) {
            tracing::debug!(
                requested = batch.len(),
                "rejected add_all: item already present"
            );
            return false;
        }

        let old = self.items.clone();
        self.items.extend(batch.iter().cloned());
        self.publish(old, ChangeType::Add, SetChange::Batch(batch));
        true
    }

    /// Remove `item` and publish `Remove` with `Item(item)`.
    ///
    /// Rejected if `item` is not a member.
    pub fn remove(&mut self, item: &D) -> bool {
        if !self.items.contains(item) {
            tracing::debug!("rejected remove: item not present");
            return false;
        }

        let old = self.items.clone();
        self.items.remove(item);
        self.publish(old, ChangeType::Remove, SetChange::Item(item.clone()));
        true
    }

    /// Remove every element of `items` and publish one `Remove` with the batch.
    ///
    /// Rejected, with no change, if any element is not a member.
    pub fn remove_all(&mut self, items: impl IntoIterator<Item = D>) -> bool {
        let batch: BTreeSet<D> = items.into_iter().collect();
        if !batch.is_subset(&self.items) {
            tracing::debug!(
                requested = batch.len(),
                "rejected remove_all: item not present"
            );
            return false;
        }

        let old = self.items.clone();
        self.items.retain(|x| !batch.contains(x));
        self.publish(old, ChangeType::Remove, SetChange::Batch(batch));
        true
    }

    /// Replace `old_item` with `new_item` and publish `Update` with
    /// `Swap(old_item, new_item)`.
    ///
    /// Rejected if `old_item` is not a member, or if `new_item` is a
    /// different element that is already a member. Swapping a member with
    /// itself is accepted and leaves the contents unchanged.
    pub fn update(&mut self, old_item: &D, new_item: D) -> bool {
        if !self.items.contains(old_item) {
            tracing::debug!("rejected update: old item not present");
            return false;
        }
        if new_item != *old_item && self.items.contains(&new_item) {
            tracing::debug!("rejected update: new item already present");
            return false;
        }

        let old = self.items.clone();
        self.items.remove(old_item);
        self.items.insert(new_item.clone());
        self.publish(
            old,
            ChangeType::Update,
            SetChange::Swap(old_item.clone(), new_item),
        );
        true
    }

    /// Whether `item` is a member.
    #[must_use]
    pub fn contains(&self, item: &D) -> bool {
        self.items.contains(item)
    }

    /// An independent copy of the whole set.
    #[must_use]
    pub fn get_all(&self) -> BTreeSet<D> {
        self.items.clone()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn publish(&self, old: BTreeSet<D>, change_type: ChangeType, change: SetChange<D>) {
        self.bus.publish(ChangeMessage::with_metadata(
            old,
            self.items.clone(),
            change_type,
            change,
        ));
    }
}

impl<D: Ord + Clone, B: EventBus<SetMessage<D>>> ChangeAdapter for SetAdapter<D, B> {
    type Snapshot = BTreeSet<D>;
    type Metadata = SetChange<D>;
    type Bus = B;

    fn bus(&self) -> &B {
        &self.bus
    }

    fn snapshot(&self) -> BTreeSet<D> {
        self.get_all()
    }
}
