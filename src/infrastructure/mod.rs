//! # Infrastructure Layer
//!
//! Concrete implementations of the domain traits: the LLM client and classifier,
//! the SMS notifier, desktop automation drivers, the clipboard, and tracing setup.

pub mod automation;
pub mod classifier;
pub mod clipboard;
pub mod llm;
pub mod logging;
pub mod notifier;
