//! Client-side key-value storage adapters.

pub mod local;
pub mod memory;
