//! SQLite-backed client storage.

pub mod kv;
pub mod pool;
