//! In-memory persistence - used when no database is configured, and by tests.
//!
//! Both repositories share one lock, so toggles and the post-delete cascade are
//! atomic with respect to every other operation on the store.
//! Note: Data is lost on process restart.

mod store;

pub use store::{InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};
