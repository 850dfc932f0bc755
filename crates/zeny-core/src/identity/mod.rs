//! Visitor identity continuity across widget sessions.

pub mod store;
