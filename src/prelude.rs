//! Convenient re-exports for common usage.
//!
//! ```
//! use change_kit::prelude::*;
//! ```

pub use crate::bus::{EventBus, LocalBus, SubscriptionId};
pub use crate::filter::{by_change_type, by_metadata_shape, Predicate, PredicateExt};
pub use crate::AdapterError;
pub use crate::ChangeAdapter;
pub use crate::ChangeMessage;
pub use crate::ChangeType;
pub use crate::ListAdapter;
pub use crate::ListChange;
pub use crate::MapAdapter;
pub use crate::MapChange;
pub use crate::MetadataShape;
pub use crate::PublishMode;
pub use crate::SetAdapter;
pub use crate::SetChange;
pub use crate::SingleAdapter;
