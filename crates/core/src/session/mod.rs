//! Session module
//!
//! Persistence of the authenticated user's token and profile.

mod kv;
mod model;
mod store;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use model::{Session, UserProfile};
pub use store::{SessionStore, TOKEN_KEY, USER_KEY};
