//! In-memory adapters.

mod store;

pub use store::InMemoryDescriptorStore;
