use crate::adapter::ChangeAdapter;
use crate::bus::{EventBus, LocalBus};
use crate::error::AdapterError;
use crate::message::{ChangeMessage, ChangeType, MetadataShape, Shaped};

/// Metadata attached to [`ListAdapter`] messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListChange<D> {
    /// The single element added, removed or written by an update.
    Item(D),
    /// The elements touched by a batch operation, in operation order.
    Batch(Vec<D>),
}

impl<D> Shaped for ListChange<D> {
    fn shape(&self) -> MetadataShape {
        match self {
            Self::Item(_) => MetadataShape::Item,
            Self::Batch(_) => MetadataShape::Batch,
        }
    }
}

/// Message published by [`ListAdapter`].
pub type ListMessage<D> = ChangeMessage<Vec<D>, ListChange<D>>;

/// A change-notifying ordered sequence.
///
/// Insertion order is significant and duplicates are allowed. Value-based
/// removals take the first matching occurrence only.
///
/// Positional mutations with an out-of-range index are rejected (`false`,
/// nothing published). [`get`](ListAdapter::get) with an out-of-range index
/// returns [`AdapterError::IndexOutOfBounds`].
///
/// Not internally synchronized: share it across threads behind your own
/// lock.
///
/// # Example
///
/// ```
/// use change_kit::prelude::*;
///
/// let mut list = ListAdapter::new();
/// list.add("a");
/// list.add_at(0, "b");
/// assert_eq!(list.get_all(), vec!["b", "a"]);
///
/// // Index 3 is past the end: rejected, nothing published.
/// assert!(!list.add_at(3, "c"));
/// ```
#[derive(Debug)]
pub struct ListAdapter<D, B = LocalBus<ListMessage<D>>> {
    items: Vec<D>,
    bus: B,
}

impl<D: Clone> ListAdapter<D> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(LocalBus::new())
    }

    /// Create a list holding `items`, without publishing anything.
    pub fn from_items(items: impl IntoIterator<Item = D>) -> Self {
        let mut adapter = Self::new();
        adapter.items.extend(items);
        adapter
    }
}

impl<D: Clone> Default for ListAdapter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Clone, B: EventBus<ListMessage<D>>> ListAdapter<D, B> {
    /// Create an empty list publishing through `bus`.
    pub fn with_bus(bus: B) -> Self {
        Self {
            items: Vec::new(),
            bus,
        }
    }

    /// Append `item` and publish `Add` with `Item(item)`.
    pub fn add(&mut self, item: D) -> bool {
        let old = self.items.clone();
        self.items.push(item.clone());
        self.publish(old, ChangeType::Add, ListChange::Item(item));
        true
    }

    /// Insert `item` before position `index` (`index == len` appends).
    ///
    /// Rejected if `index > len`.
    pub fn add_at(&mut self, index: usize, item: D) -> bool {
        let len = self.items.len();
        if index > len {
            tracing::debug!(index, len, "rejected add_at: index out of range");
            return false;
        }

        let old = self.items.clone();
        self.items.insert(index, item.clone());
        self.publish(old, ChangeType::Add, ListChange::Item(item));
        true
    }

    /// Append every element of `items` and publish one `Add` with the batch.
    pub fn add_all(&mut self, items: impl IntoIterator<Item = D>) -> bool {
        let batch: Vec<D> = items.into_iter().collect();
        let old = self.items.clone();
        self.items.extend(batch.iter().cloned());
        self.publish(old, ChangeType::Add, ListChange::Batch(batch));
        true
    }

    /// Remove the element at `index` and publish `Remove` with the removed item.
    ///
    /// Rejected if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> bool {
        let len = self.items.len();
        if index >= len {
            tracing::debug!(index, len, "rejected remove_at: index out of range");
            return false;
        }

        let old = self.items.clone();
        let removed = self.items.remove(index);
        self.publish(old, ChangeType::Remove, ListChange::Item(removed));
        true
    }

    /// Remove the elements at every position in `indices` as one batch.
    ///
    /// Positions refer to the list before any removal. Rejected, with no
    /// change, if any index is out of range or appears twice. The published
    /// batch lists the removed elements in the order `indices` named them.
    pub fn remove_indices(&mut self, indices: &[usize]) -> bool {
        let len = self.items.len();
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();

        if let Some(&index) = sorted.iter().find(|&&i| i >= len) {
            tracing::debug!(index, len, "rejected remove_indices: index out of range");
            return false;
        }
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            tracing::debug!(index = pair[0], "rejected remove_indices: duplicate index");
            return false;
        }

        let old = self.items.clone();
        let removed: Vec<D> = indices.iter().map(|&i| self.items[i].clone()).collect();
        for &index in sorted.iter().rev() {
            self.items.remove(index);
        }
        self.publish(old, ChangeType::Remove, ListChange::Batch(removed));
        true
    }

    /// Replace the element at `index` and publish `Update` with the new item.
    ///
    /// Rejected if `index >= len`.
    pub fn update(&mut self, index: usize, item: D) -> bool {
        let len = self.items.len();
        if index >= len {
            tracing::debug!(index, len, "rejected update: index out of range");
            return false;
        }

        let old = self.items.clone();
        self.items[index] = item.clone();
        self.publish(old, ChangeType::Update, ListChange::Item(item));
        true
    }

    /// A copy of the element at `index`.
    pub fn get(&self, index: usize) -> Result<D, AdapterError> {
        self.items
            .get(index)
            .cloned()
            .ok_or(AdapterError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
    }

    /// An independent copy of the whole list.
    #[must_use]
    pub fn get_all(&self) -> Vec<D> {
        self.items.clone()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn publish(&self, old: Vec<D>, change_type: ChangeType, change: ListChange<D>) {
        self.bus.publish(ChangeMessage::with_metadata(
            old,
            self.items.clone(),
            change_type,
            change,
        ));
    }
}

impl<D: Clone + PartialEq, B: EventBus<ListMessage<D>>> ListAdapter<D, B> {
    /// Remove the first occurrence of `item` and publish `Remove` with it.
    ///
    /// Rejected if `item` is not in the list.
    pub fn remove(&mut self, item: &D) -> bool {
        let Some(index) = self.items.iter().position(|x| x == item) else {
            tracing::debug!("rejected remove: item not present");
            return false;
        };

        let old = self.items.clone();
        let removed = self.items.remove(index);
        self.publish(old, ChangeType::Remove, ListChange::Item(removed));
        true
    }

    /// Remove one occurrence of each element of `items` as one batch.
    ///
    /// Each element removes the first remaining match, so a value listed
    /// twice removes two occurrences. Rejected, with no change, unless every
    /// element can be matched.
    pub fn remove_all(&mut self, items: &[D]) -> bool {
        let mut remaining = self.items.clone();
        for item in items {
            match remaining.iter().position(|x| x == item) {
                Some(index) => {
                    remaining.remove(index);
                }
                None => {
                    tracing::debug!(
                        requested = items.len(),
                        "rejected remove_all: item not present"
                    );
                    return false;
                }
            }
        }

        let old = core::mem::replace(&mut self.items, remaining);
        self.publish(old, ChangeType::Remove, ListChange::Batch(items.to_vec()));
        true
    }

    /// Whether `item` occurs in the list.
    #[must_use]
    pub fn contains(&self, item: &D) -> bool {
        self.items.contains(item)
    }
}

impl<D: Clone, B: EventBus<ListMessage<D>>> ChangeAdapter for ListAdapter<D, B> {
    type Snapshot = Vec<D>;
    type Metadata = ListChange<D>;
    type Bus = B;

    fn bus(&self) -> &B {
        &self.bus
    }

    fn snapshot(&self) -> Vec<D> {
        self.get_all()
    }
}
