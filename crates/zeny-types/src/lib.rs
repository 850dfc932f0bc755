//! Shared domain types for the Zeny avatar chat client.
//!
//! Avatars, training documents, chat messages, conversation records, the
//! wire shapes of the backend API, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod avatar;
pub mod chat;
pub mod config;
pub mod error;
pub mod exchange;
pub mod id;
pub mod identity;
pub mod timestamp;
