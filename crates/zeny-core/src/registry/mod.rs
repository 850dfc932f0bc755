//! Avatar and training-document management.

pub mod repository;
pub mod view;
