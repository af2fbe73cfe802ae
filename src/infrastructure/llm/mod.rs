//! # LLM Wrapper
//!
//! A small, provider-agnostic completion client. The relay only needs one-shot prompts
//! for command classification, so there is no streaming and no conversation state.

mod client;
pub mod providers;
mod types;

pub use client::Client;

pub use types::{Context, Error, Message, MessageRole, Provider, Response, TokenUsage};
