//! Storage abstractions for the client.
//!
//! Implementations live in zeny-infra.

pub mod kv_store;
