use core::fmt;

/// The kind of mutation a [`ChangeMessage`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeType {
    /// One or more elements were inserted.
    Add,
    /// One or more elements were removed.
    Remove,
    /// One or more elements were replaced in place.
    Update,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("ADD"),
            Self::Remove => f.write_str("REMOVE"),
            Self::Update => f.write_str("UPDATE"),
        }
    }
}

/// The runtime shape of a metadata payload.
///
/// Every metadata type maps its variants onto one of these tags, which is
/// what [`by_metadata_shape`](crate::filter::by_metadata_shape) matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetadataShape {
    /// A single element.
    Item,
    /// A snapshot of several elements changed together.
    Batch,
    /// An ordered `(old, new)` pair of elements.
    Swap,
    /// A single key-value pair.
    Entry,
    /// A snapshot of several key-value pairs changed together.
    Entries,
}

/// Metadata payloads that can report their [`MetadataShape`].
pub trait Shaped {
    /// The shape tag of this payload.
    fn shape(&self) -> MetadataShape;
}

/// Metadata type for messages that never carry metadata.
///
/// It has no values, so a `ChangeMessage<S, NoMetadata>` always has
/// `metadata() == None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoMetadata {}

impl Shaped for NoMetadata {
    fn shape(&self) -> MetadataShape {
        match *self {}
    }
}

/// An immutable record of one successful mutation.
///
/// `old_data` and `new_data` are independent snapshots of the container
/// taken immediately before and after the mutation. `metadata` describes
/// which element(s) changed; messages built with [`ChangeMessage::new`]
/// carry none.
///
/// # Example
///
/// ```
/// use change_kit::prelude::*;
///
/// let msg: ChangeMessage<i32> = ChangeMessage::new(0, 1, ChangeType::Update);
/// assert_eq!(*msg.old_data(), 0);
/// assert_eq!(*msg.new_data(), 1);
/// assert!(!msg.has_metadata());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeMessage<S, M = NoMetadata> {
    old_data: S,
    new_data: S,
    change_type: ChangeType,
    metadata: Option<M>,
}

impl<S, M> ChangeMessage<S, M> {
    /// Create a message without metadata.
    #[must_use]
    pub fn new(old_data: S, new_data: S, change_type: ChangeType) -> Self {
        Self {
            old_data,
            new_data,
            change_type,
            metadata: None,
        }
    }

    /// Create a message carrying a metadata payload.
    #[must_use]
    pub fn with_metadata(old_data: S, new_data: S, change_type: ChangeType, metadata: M) -> Self {
        Self {
            old_data,
            new_data,
            change_type,
            metadata: Some(metadata),
        }
    }

    /// Snapshot of the container before the mutation.
    #[must_use]
    pub fn old_data(&self) -> &S {
        &self.old_data
    }

    /// Snapshot of the container after the mutation.
    #[must_use]
    pub fn new_data(&self) -> &S {
        &self.new_data
    }

    /// The kind of mutation.
    #[must_use]
    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// The delta payload, if any.
    #[must_use]
    pub fn metadata(&self) -> Option<&M> {
        self.metadata.as_ref()
    }

    /// Whether a metadata payload is attached.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Consume the message, returning `(old_data, new_data, change_type, metadata)`.
    pub fn into_parts(self) -> (S, S, ChangeType, Option<M>) {
        (self.old_data, self.new_data, self.change_type, self.metadata)
    }
}

impl<S, M: Shaped> ChangeMessage<S, M> {
    /// Shape of the attached metadata, or `None` for a plain message.
    #[must_use]
    pub fn metadata_shape(&self) -> Option<MetadataShape> {
        self.metadata.as_ref().map(Shaped::shape)
    }
}

impl<S: fmt::Debug, M: fmt::Debug> fmt::Display for ChangeMessage<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[oldData={:?}, newData={:?}, changeType={}",
            self.old_data, self.new_data, self.change_type
        )?;
        if let Some(metadata) = &self.metadata {
            write!(f, ", metadata={metadata:?}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListChange;

    #[test]
    fn plain_message_has_no_metadata() {
        let msg: ChangeMessage<i32> = ChangeMessage::new(0, 1, ChangeType::Add);
        assert_eq!(*msg.old_data(), 0);
        assert_eq!(*msg.new_data(), 1);
        assert_eq!(msg.change_type(), ChangeType::Add);
        assert!(msg.metadata().is_none());
        assert_eq!(msg.metadata_shape(), None);
    }

    #[test]
    fn metadata_is_exposed_with_its_shape() {
        let msg = ChangeMessage::with_metadata(0, 1, ChangeType::Update, ListChange::Item(1));
        assert_eq!(msg.metadata(), Some(&ListChange::Item(1)));
        assert_eq!(msg.metadata_shape(), Some(MetadataShape::Item));
    }

    #[test]
    fn plain_and_meta_messages_differ() {
        let plain: ChangeMessage<i32, ListChange<i32>> = ChangeMessage::new(0, 1, ChangeType::Remove);
        let meta = ChangeMessage::with_metadata(0, 1, ChangeType::Remove, ListChange::Item(0));
        assert_ne!(plain, meta);
    }

    #[test]
    fn display_includes_metadata_only_when_present() {
        let plain: ChangeMessage<i32> = ChangeMessage::new(0, 1, ChangeType::Update);
        assert_eq!(plain.to_string(), "[oldData=0, newData=1, changeType=UPDATE]");

        let meta = ChangeMessage::with_metadata(0, 1, ChangeType::Add, ListChange::Item(1));
        assert_eq!(
            meta.to_string(),
            "[oldData=0, newData=1, changeType=ADD, metadata=Item(1)]"
        );
    }

    #[test]
    fn into_parts_returns_fields() {
        let msg = ChangeMessage::with_metadata(
            vec![1],
            vec![1, 2],
            ChangeType::Add,
            ListChange::Item(2),
        );
        let (old, new, ty, meta) = msg.into_parts();
        assert_eq!(old, vec![1]);
        assert_eq!(new, vec![1, 2]);
        assert_eq!(ty, ChangeType::Add);
        assert_eq!(meta, Some(ListChange::Item(2)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let msg = ChangeMessage::with_metadata(
            vec![1],
            vec![1, 2],
            ChangeType::Add,
            ListChange::Item(2),
        );
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChangeMessage<Vec<i32>, ListChange<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
