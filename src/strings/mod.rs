//! # Strings Module
//!
//! Centralizes log lines, user-facing messages, prompts and page templates.

pub mod logs;
pub mod messages;
pub mod prompts;
pub mod templates;
