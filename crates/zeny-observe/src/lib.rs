//! Observability setup for the Zeny client.

pub mod tracing_setup;
