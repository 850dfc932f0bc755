//! Infrastructure layer for Zeny.
//!
//! Contains implementations of the ports defined in `zeny-core`: the HTTP
//! client for the backend API, SQLite-backed local storage, and the
//! configuration loader.

pub mod config;
pub mod http;
pub mod sqlite;
pub mod storage;
