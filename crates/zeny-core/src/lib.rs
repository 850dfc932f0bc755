//! Client-side logic and port definitions for Zeny.
//!
//! This crate defines the "ports" (backend and storage traits) that the
//! infrastructure layer implements. It depends only on `zeny-types` --
//! never on `zeny-infra` or any HTTP/database crate.

pub mod chat;
pub mod identity;
pub mod registry;
pub mod review;
pub mod storage;
