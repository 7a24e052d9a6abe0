//! Composable predicates for selecting change messages.
//!
//! A [`Predicate`] decides whether a subscriber sees an event. The two
//! building blocks are [`by_change_type`] and [`by_metadata_shape`]; they
//! combine with [`PredicateExt::and`], [`PredicateExt::or`] and
//! [`PredicateExt::not`].
//!
//! ```
//! use change_kit::prelude::*;
//!
//! let filter = by_change_type(ChangeType::Add).and(by_metadata_shape(MetadataShape::Batch));
//!
//! let single = ChangeMessage::with_metadata(vec![], vec![1], ChangeType::Add, ListChange::Item(1));
//! let batch = ChangeMessage::with_metadata(
//!     vec![],
//!     vec![1, 2],
//!     ChangeType::Add,
//!     ListChange::Batch(vec![1, 2]),
//! );
//!
//! assert!(!filter.test(&single));
//! assert!(filter.test(&batch));
//! ```

use crate::message::{ChangeMessage, ChangeType, MetadataShape, Shaped};

/// A test applied to every event before it reaches a subscriber.
///
/// Any `Fn(&E) -> bool` closure is a predicate.
pub trait Predicate<E> {
    /// Returns `true` if the event should be delivered.
    fn test(&self, event: &E) -> bool;
}

impl<E, F> Predicate<E> for F
where
    F: Fn(&E) -> bool,
{
    fn test(&self, event: &E) -> bool {
        self(event)
    }
}

/// Accepts messages whose [`ChangeType`] equals the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTypeFilter {
    change_type: ChangeType,
}

impl ChangeTypeFilter {
    /// Create a filter for `change_type`.
    #[must_use]
    pub fn new(change_type: ChangeType) -> Self {
        Self { change_type }
    }

    /// The change type this filter accepts.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }
}

impl<S, M> Predicate<ChangeMessage<S, M>> for ChangeTypeFilter {
    fn test(&self, event: &ChangeMessage<S, M>) -> bool {
        event.change_type() == self.change_type
    }
}

/// Accepts messages carrying metadata of the configured [`MetadataShape`].
///
/// Messages without metadata are always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataFilter {
    shape: MetadataShape,
}

impl MetadataFilter {
    /// Create a filter for `shape`.
    #[must_use]
    pub fn new(shape: MetadataShape) -> Self {
        Self { shape }
    }

    /// The metadata shape this filter accepts.
    #[must_use]
    pub fn shape(&self) -> MetadataShape {
        self.shape
    }
}

impl<S, M: Shaped> Predicate<ChangeMessage<S, M>> for MetadataFilter {
    fn test(&self, event: &ChangeMessage<S, M>) -> bool {
        event.metadata_shape() == Some(self.shape)
    }
}

/// Shorthand for [`ChangeTypeFilter::new`].
#[must_use]
pub fn by_change_type(change_type: ChangeType) -> ChangeTypeFilter {
    ChangeTypeFilter::new(change_type)
}

/// Shorthand for [`MetadataFilter::new`].
#[must_use]
pub fn by_metadata_shape(shape: MetadataShape) -> MetadataFilter {
    MetadataFilter::new(shape)
}

/// Wrap a closure so it gains the [`PredicateExt`] combinators.
pub fn from_fn<F>(f: F) -> FnFilter<F> {
    FnFilter(f)
}

/// A closure-backed predicate, see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnFilter<F>(F);

impl<E, F> Predicate<E> for FnFilter<F>
where
    F: Fn(&E) -> bool,
{
    fn test(&self, event: &E) -> bool {
        (self.0)(event)
    }
}

/// Accepts when both inner predicates accept.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<E, A: Predicate<E>, B: Predicate<E>> Predicate<E> for And<A, B> {
    fn test(&self, event: &E) -> bool {
        self.0.test(event) && self.1.test(event)
    }
}

/// Accepts when either inner predicate accepts.
#[derive(Debug, Clone, Copy)]
pub struct Or<A, B>(A, B);

impl<E, A: Predicate<E>, B: Predicate<E>> Predicate<E> for Or<A, B> {
    fn test(&self, event: &E) -> bool {
        self.0.test(event) || self.1.test(event)
    }
}

/// Inverts the inner predicate.
#[derive(Debug, Clone, Copy)]
pub struct Not<A>(A);

impl<E, A: Predicate<E>> Predicate<E> for Not<A> {
    fn test(&self, event: &E) -> bool {
        !self.0.test(event)
    }
}

/// Combinators for the filter types in this module.
pub trait PredicateExt: Sized {
    /// Both `self` and `other` must accept.
    fn and<P>(self, other: P) -> And<Self, P> {
        And(self, other)
    }

    /// Either `self` or `other` must accept.
    fn or<P>(self, other: P) -> Or<Self, P> {
        Or(self, other)
    }

    /// Accept exactly what `self` rejects.
    fn not(self) -> Not<Self> {
        Not(self)
    }
}

impl PredicateExt for ChangeTypeFilter {}
impl PredicateExt for MetadataFilter {}
impl<F> PredicateExt for FnFilter<F> {}
impl<A, B> PredicateExt for And<A, B> {}
impl<A, B> PredicateExt for Or<A, B> {}
impl<A> PredicateExt for Not<A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListChange;
    use crate::map::MapChange;
    use crate::set::SetChange;
    use std::collections::{BTreeMap, BTreeSet};

    type ListMsg = ChangeMessage<Vec<i32>, ListChange<i32>>;

    fn list_msg(change_type: ChangeType, meta: Option<ListChange<i32>>) -> ListMsg {
        match meta {
            Some(meta) => ChangeMessage::with_metadata(vec![0], vec![1], change_type, meta),
            None => ChangeMessage::new(vec![0], vec![1], change_type),
        }
    }

    #[test]
    fn change_type_filter_matches_only_its_type() {
        let add = by_change_type(ChangeType::Add);
        assert!(add.test(&list_msg(ChangeType::Add, None)));
        assert!(!add.test(&list_msg(ChangeType::Remove, None)));
        assert!(!add.test(&list_msg(ChangeType::Update, None)));
    }

    #[test]
    fn change_type_filter_ignores_metadata() {
        let update = by_change_type(ChangeType::Update);
        assert!(update.test(&list_msg(ChangeType::Update, Some(ListChange::Item(1)))));
        assert!(update.test(&list_msg(ChangeType::Update, None)));
    }

    #[test]
    fn metadata_filter_matches_shape() {
        let item = by_metadata_shape(MetadataShape::Item);
        let batch = by_metadata_shape(MetadataShape::Batch);
        let msg = list_msg(ChangeType::Update, Some(ListChange::Item(1)));

        assert!(item.test(&msg));
        assert!(!batch.test(&msg));
    }

    #[test]
    fn metadata_filter_rejects_missing_metadata() {
        let msg = list_msg(ChangeType::Update, None);
        assert!(!by_metadata_shape(MetadataShape::Item).test(&msg));
        assert!(!by_metadata_shape(MetadataShape::Batch).test(&msg));
    }

    #[test]
    fn metadata_filter_rejects_plain_messages() {
        let plain: ChangeMessage<i32> = ChangeMessage::new(0, 1, ChangeType::Update);
        for shape in [
            MetadataShape::Item,
            MetadataShape::Batch,
            MetadataShape::Swap,
            MetadataShape::Entry,
            MetadataShape::Entries,
        ] {
            assert!(!by_metadata_shape(shape).test(&plain));
        }
    }

    #[test]
    fn metadata_filter_covers_set_and_map_shapes() {
        let swap = ChangeMessage::with_metadata(
            BTreeSet::from([1]),
            BTreeSet::from([2]),
            ChangeType::Update,
            SetChange::Swap(1, 2),
        );
        assert!(by_metadata_shape(MetadataShape::Swap).test(&swap));
        assert!(!by_metadata_shape(MetadataShape::Item).test(&swap));

        let entry = ChangeMessage::with_metadata(
            BTreeMap::new(),
            BTreeMap::from([(1, "a")]),
            ChangeType::Add,
            MapChange::Entry(1, "a"),
        );
        assert!(by_metadata_shape(MetadataShape::Entry).test(&entry));
        assert!(!by_metadata_shape(MetadataShape::Entries).test(&entry));
    }

    #[test]
    fn combinators_compose() {
        let added_item = by_change_type(ChangeType::Add).and(by_metadata_shape(MetadataShape::Item));
        assert!(added_item.test(&list_msg(ChangeType::Add, Some(ListChange::Item(1)))));
        assert!(!added_item.test(&list_msg(ChangeType::Add, Some(ListChange::Batch(vec![1])))));
        assert!(!added_item.test(&list_msg(ChangeType::Remove, Some(ListChange::Item(1)))));

        let add_or_remove = by_change_type(ChangeType::Add).or(by_change_type(ChangeType::Remove));
        assert!(add_or_remove.test(&list_msg(ChangeType::Remove, None)));
        assert!(!add_or_remove.test(&list_msg(ChangeType::Update, None)));

        let not_update = by_change_type(ChangeType::Update).not();
        assert!(not_update.test(&list_msg(ChangeType::Add, None)));
        assert!(!not_update.test(&list_msg(ChangeType::Update, None)));
    }

    #[test]
    fn closures_are_predicates() {
        let grew = |msg: &ListMsg| msg.new_data().len() > msg.old_data().len();
        let msg = ChangeMessage::with_metadata(vec![], vec![1], ChangeType::Add, ListChange::Item(1));
        assert!(grew.test(&msg));

        let grew_by_add = from_fn(grew).and(by_change_type(ChangeType::Add));
        assert!(grew_by_add.test(&msg));
    }
}
