//! Storage boundary for collections, resources and tombstones.
//!
//! [`DavStore`] is the interface the query engine reads through;
//! [`MemoryStore`] is an in-process implementation.

pub mod error;
pub mod etag;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{Collection, NewCollection, Principal, PutOutcome, Resource, Tombstone};
pub use store::DavStore;
