//! Warfront session service
//!
//! In-memory session storage on top of the `warfront-core` engine:
//! concurrent session management keyed by generated ids, an operation
//! surface that commits engine mutations atomically, and JSON file
//! persistence for save/load.

pub mod persist;
pub mod store;

pub use store::{SessionStore, StoreError};
