//! Chat widget conversation model.
//!
//! Defines the backend ports (`AvatarSource`, `TurnExchange`), the session
//! state machine, and the async widget driver that ties them together.

pub mod backend;
pub mod session;
pub mod state;
pub mod widget;
