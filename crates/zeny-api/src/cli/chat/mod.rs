//! Interactive CLI chat with an avatar.
//!
//! The terminal plays the role of the embeddable widget: it mounts a
//! `ChatWidget`, renders the log, and forwards visitor input. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
