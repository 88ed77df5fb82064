//! In-memory adapters for local runs and tests.

mod store;

pub use store::InMemoryStore;
