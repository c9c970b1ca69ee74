//! # ascribe_cache
//!
//! In-process memoization for derived document artifacts.
//!
//! - [`Fingerprint`] identifies one artifact of one document state.
//! - [`MemoStore`] is a bounded LRU map from fingerprint to either a
//!   resolved value or a pending computation, with a single-flight
//!   [`MemoStore::get_or_try_insert_with`] primitive.

mod entry;
mod error;
mod fingerprint;
mod store;

pub use entry::{Entry, EntryState, Flight};
pub use error::CacheError;
pub use fingerprint::{Fingerprint, FingerprintSource, fingerprint};
pub use store::{DEFAULT_CAPACITY, MemoStore};
