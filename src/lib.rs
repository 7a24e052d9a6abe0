//! # change-kit
//!
//! Change-notifying container adapters.
//!
//! An adapter wraps a single value, a list, a map or a set, and is the only
//! way to mutate it. After every successful mutation it publishes a
//! [`ChangeMessage`] carrying independent before/after snapshots of the
//! container and a metadata payload naming the element(s) that changed.
//! Subscribers receive messages synchronously, on the mutating thread, in
//! the order the mutations happened.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use change_kit::prelude::*;
//!
//! let mut list: ListAdapter<i32> = ListAdapter::new();
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&log);
//! list.subscribe(move |msg| sink.lock().unwrap().push(msg.to_string()));
//!
//! list.add(5);
//! list.add(7);
//!
//! assert_eq!(
//!     *log.lock().unwrap(),
//!     vec![
//!         "[oldData=[], newData=[5], changeType=ADD, metadata=Item(5)]",
//!         "[oldData=[5], newData=[5, 7], changeType=ADD, metadata=Item(7)]",
//!     ]
//! );
//! ```
//!
//! ## Available Adapters
//!
//! - [`SingleAdapter`] - One value; `update` publishes the old and new value
//! - [`ListAdapter`] - Ordered sequence with positional and value-based edits
//! - [`MapAdapter`] - Unique-key map, internally locked, atomic batches
//! - [`SetAdapter`] - Unique elements with atomic batches and value swaps
//!
//! ## Filtering
//!
//! Subscribers select messages with predicates from [`filter`]:
//! [`by_change_type`](filter::by_change_type) and
//! [`by_metadata_shape`](filter::by_metadata_shape), combined with
//! `and` / `or` / `not`.
//!
//! ## Rejected mutations
//!
//! A mutation whose precondition fails (duplicate key, missing element,
//! index out of range) returns `false`, leaves the container untouched and
//! publishes nothing. Batch operations are all-or-nothing.
//!
//! ## Thread safety
//!
//! Only [`MapAdapter`] synchronizes internally. The other adapters take
//! `&mut self` for mutations; share them across threads behind a lock.

#![warn(missing_docs)]

mod adapter;
mod error;
mod list;
mod map;
mod message;
mod set;
mod single;

pub mod bus;
pub mod filter;
pub mod prelude;

pub use adapter::ChangeAdapter;
pub use error::AdapterError;
pub use list::{ListAdapter, ListChange, ListMessage};
pub use map::{MapAdapter, MapAdapterBuilder, MapAdapterConfig, MapChange, MapMessage, PublishMode};
pub use message::{ChangeMessage, ChangeType, MetadataShape, NoMetadata, Shaped};
pub use set::{SetAdapter, SetChange, SetMessage};
pub use single::{SingleAdapter, SingleMessage};
