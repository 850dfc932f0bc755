//! HTTP adapter for the backend API.

pub mod client;
