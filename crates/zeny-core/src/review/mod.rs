//! Conversation review for the operator dashboard.

pub mod repository;
pub mod surface;
