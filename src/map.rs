//! Change-notifying key-value map with internal locking.
//!
//! [`MapAdapter`] is the only adapter that is safe to share between threads
//! without external synchronization. Every operation takes a single
//! reader/writer lock: reads in shared mode, mutations in exclusive mode.
//! The existence check, the mutation and the snapshot capture all happen
//! under one exclusive acquisition, so check-then-act is atomic.
//!
//! By default the message is also published while the exclusive lock is
//! held ([`PublishMode::WhileLocked`]). Subscribers therefore observe
//! messages in exactly the order the mutations were applied, but a
//! subscriber that blocks stalls every other reader and writer of the map,
//! and a subscriber that calls back into the same map deadlocks.
//! [`PublishMode::AfterUnlock`] releases the lock first; callbacks may then
//! read the map, but under concurrent writers messages can reach subscribers
//! out of mutation order.

use core::fmt;
use std::collections::{BTreeMap, BTreeSet};

use parking_lot::{RwLock, RwLockWriteGuard};

use crate::adapter::ChangeAdapter;
use crate::bus::{EventBus, LocalBus};
use crate::message::{ChangeMessage, ChangeType, MetadataShape, Shaped};

/// Metadata attached to [`MapAdapter`] messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "K: Ord + serde::Deserialize<'de>, D: serde::Deserialize<'de>"))
)]
pub enum MapChange<K, D> {
    /// The key and the value it now holds (or held, for a removal).
    Entry(K, D),
    /// The entries touched by a batch operation.
    Entries(BTreeMap<K, D>),
}

impl<K, D> Shaped for MapChange<K, D> {
    fn shape(&self) -> MetadataShape {
        match self {
            Self::Entry(..) => MetadataShape::Entry,
            Self::Entries(_) => MetadataShape::Entries,
        }
    }
}

/// Message published by [`MapAdapter`].
pub type MapMessage<K, D> = ChangeMessage<BTreeMap<K, D>, MapChange<K, D>>;

/// When a [`MapAdapter`] publishes relative to releasing its write lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PublishMode {
    /// Publish before releasing the lock. Delivery order always matches
    /// mutation order.
    #[default]
    WhileLocked,
    /// Release the lock, then publish. Callbacks may read the map.
    AfterUnlock,
}

/// Configuration for [`MapAdapter`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapAdapterConfig {
    /// Publish ordering relative to the write lock.
    pub publish_mode: PublishMode,
}

/// Builder for a [`MapAdapter`] with initial entries, custom configuration
/// or a custom bus.
pub struct MapAdapterBuilder<K, D, B = LocalBus<MapMessage<K, D>>> {
    entries: BTreeMap<K, D>,
    config: MapAdapterConfig,
    bus: B,
}

impl<K: Ord + Clone, D: Clone, B: EventBus<MapMessage<K, D>>> MapAdapterBuilder<K, D, B> {
    /// Seed the map with `entries`. Nothing is published for them.
    pub fn entries(mut self, entries: impl IntoIterator<Item = (K, D)>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MapAdapterConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the publish mode.
    pub fn publish_mode(mut self, mode: PublishMode) -> Self {
        self.config.publish_mode = mode;
        self
    }

    /// Publish through `bus` instead.
    pub fn bus<B2: EventBus<MapMessage<K, D>>>(self, bus: B2) -> MapAdapterBuilder<K, D, B2> {
        MapAdapterBuilder {
            entries: self.entries,
            config: self.config,
            bus,
        }
    }

    /// Build the `MapAdapter`.
    pub fn build(self) -> MapAdapter<K, D, B> {
        MapAdapter {
            entries: RwLock::new(self.entries),
            bus: self.bus,
            config: self.config,
        }
    }
}

/// A change-notifying map with unique keys.
///
/// Adding an existing key, or removing or updating a missing one, is
/// rejected: `false` is returned and nothing is published. Batch operations
/// check every key before touching anything.
///
/// # Example
///
/// ```
/// use change_kit::prelude::*;
///
/// let map = MapAdapter::new();
/// assert!(map.add(1, "a"));
/// assert!(!map.add(1, "b"));
/// assert!(map.update(1, "b"));
/// assert_eq!(map.get(&1), Some("b"));
/// assert_eq!(map.get(&2), None);
/// ```
pub struct MapAdapter<K, D, B = LocalBus<MapMessage<K, D>>> {
    entries: RwLock<BTreeMap<K, D>>,
    bus: B,
    config: MapAdapterConfig,
}

impl<K: Ord + Clone, D: Clone> MapAdapter<K, D> {
    /// Create an empty map with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a map holding `entries`, without publishing anything.
    pub fn from_entries(entries: impl IntoIterator<Item = (K, D)>) -> Self {
        Self::builder().entries(entries).build()
    }

    /// Start building a map with custom settings.
    #[must_use]
    pub fn builder() -> MapAdapterBuilder<K, D> {
        MapAdapterBuilder {
            entries: BTreeMap::new(),
            config: MapAdapterConfig::default(),
            bus: LocalBus::new(),
        }
    }
}

impl<K: Ord + Clone, D: Clone> Default for MapAdapter<K, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, D: Clone, B: EventBus<MapMessage<K, D>>> MapAdapter<K, D, B> {
    /// Insert `data` under `key` and publish `Add` with `Entry(key, data)`.
    ///
    /// Rejected if `key` is already present.
    pub fn add(&self, key: K, data: D) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            tracing::debug!("rejected add: key already present");
            return false;
        }

        let old = entries.clone();
        entries.insert(key.clone(), data.clone());
        self.commit(entries, old, ChangeType::Add, MapChange::Entry(key, data));
        true
    }

    /// Insert every entry and publish one `Add` with the batch.
    ///
    /// Rejected, with no change, if any key is already present.
    pub fn add_all(&self, batch: impl IntoIterator<Item = (K, D)>) -> bool {
        let batch: BTreeMap<K, D> = batch.into_iter().collect();
        let mut entries = self.entries.write();
        if batch.keys().any(|k| entries.contains_key(k)) {
            tracing::debug!(
                requested = batch.len(),
                "rejected add_all: key already present"
            );
            return false;
        }

        let old = entries.clone();
        entries.extend(batch.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.commit(entries, old, ChangeType::Add, MapChange::Entries(batch));
        true
    }

    /// Remove `key` and publish `Remove` with `Entry(key, removed_value)`.
    ///
    /// Rejected if `key` is absent.
    pub fn remove(&self, key: &K) -> bool {
        let mut entries = self.entries.write();
        let Some(removed) = entries.get(key).cloned() else {
            tracing::debug!("rejected remove: key not present");
            return false;
        };

        let old = entries.clone();
        entries.remove(key);
        self.commit(
            entries,
            old,
            ChangeType::Remove,
            MapChange::Entry(key.clone(), removed),
        );
        true
    }

    /// Remove every key and publish one `Remove` with the removed entries.
    ///
    /// Rejected, with no change, if any key is absent.
    pub fn remove_all(&self, keys: impl IntoIterator<Item = K>) -> bool {
        let keys: BTreeSet<K> = keys.into_iter().collect();
        let mut entries = self.entries.write();
        if !keys.iter().all(|k| entries.contains_key(k)) {
            tracing::debug!(
                requested = keys.len(),
                "rejected remove_all: key not present"
            );
            return false;
        }

        let old = entries.clone();
        let removed: BTreeMap<K, D> = keys
            .into_iter()
            .filter_map(|k| entries.remove(&k).map(|v| (k, v)))
            .collect();
        self.commit(entries, old, ChangeType::Remove, MapChange::Entries(removed));
        true
    }

    /// Replace the value under `key` and publish `Update` with
    /// `Entry(key, data)`.
    ///
    /// Rejected if `key` is absent.
    pub fn update(&self, key: K, data: D) -> bool {
        let mut entries = self.entries.write();
        if !entries.contains_key(&key) {
            tracing::debug!("rejected update: key not present");
            return false;
        }

        let old = entries.clone();
        entries.insert(key.clone(), data.clone());
        self.commit(entries, old, ChangeType::Update, MapChange::Entry(key, data));
        true
    }

    /// Replace every entry's value and publish one `Update` with the batch.
    ///
    /// Rejected, with no change, if any key is absent.
    pub fn update_all(&self, batch: impl IntoIterator<Item = (K, D)>) -> bool {
        let batch: BTreeMap<K, D> = batch.into_iter().collect();
        let mut entries = self.entries.write();
        if !batch.keys().all(|k| entries.contains_key(k)) {
            tracing::debug!(
                requested = batch.len(),
                "rejected update_all: key not present"
            );
            return false;
        }

        let old = entries.clone();
        entries.extend(batch.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.commit(entries, old, ChangeType::Update, MapChange::Entries(batch));
        true
    }

    /// A copy of the value under `key`, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<D> {
        self.entries.read().get(key).cloned()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// An independent copy of the whole map.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<K, D> {
        self.entries.read().clone()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &MapAdapterConfig {
        &self.config
    }

    /// Capture the post-mutation snapshot and publish, releasing `entries`
    /// before or after according to the publish mode.
    fn commit(
        &self,
        entries: RwLockWriteGuard<'_, BTreeMap<K, D>>,
        old: BTreeMap<K, D>,
        change_type: ChangeType,
        change: MapChange<K, D>,
    ) {
        let message = ChangeMessage::with_metadata(old, entries.clone(), change_type, change);
        match self.config.publish_mode {
            PublishMode::WhileLocked => {
                self.bus.publish(message);
                drop(entries);
            }
            PublishMode::AfterUnlock => {
                drop(entries);
                self.bus.publish(message);
            }
        }
    }
}

impl<K: Ord + Clone, D: Clone, B: EventBus<MapMessage<K, D>>> ChangeAdapter
    for MapAdapter<K, D, B>
{
    type Snapshot = BTreeMap<K, D>;
    type Metadata = MapChange<K, D>;
    type Bus = B;

    fn bus(&self) -> &B {
        &self.bus
    }

    fn snapshot(&self) -> BTreeMap<K, D> {
        self.get_all()
    }
}

impl<K: fmt::Debug, D: fmt::Debug, B> fmt::Debug for MapAdapter<K, D, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapAdapter")
            .field("entries", &*self.entries.read())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
