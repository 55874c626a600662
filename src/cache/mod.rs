//! Cache module for memoizing network responses on disk
//!
//! Every page fetch and API call goes through a [`RequestCache`], which looks the
//! request up by its [`RequestIdentity`] in a [`CacheStore`] backed by a single
//! JSON file. A request is only sent over the network the first time its
//! identity is seen; afterwards the stored payload is returned.

mod identity;
mod mediator;
mod store;

pub use identity::RequestIdentity;
pub use mediator::{CacheLookup, CacheSource, RequestCache};
pub use store::{CacheError, CacheStore, DEFAULT_CACHE_FILENAME};
