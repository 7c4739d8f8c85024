//! Core library for the cooperative admin client
//!
//! This crate contains the client-side domain logic, including:
//! - Session persistence over a durable key-value store
//! - Associate records, the editable form and the search filter

pub mod associate;
pub mod error;
pub mod session;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
