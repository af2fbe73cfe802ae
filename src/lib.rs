//! # Relay
//!
//! Turns short natural-language commands (SMS or manual triggers) into structured actions,
//! routes them to a desktop execution backend, and reports a summary back.
//!
//! - Domain: actions, outcomes, configuration and the collaborator traits
//! - Infrastructure: LLM client, Twilio notifier, automation drivers, clipboard, tracing
//! - Application: validator, router, executor, collector, pipeline, activity log
//! - Interface: gateway and bridge HTTP routers

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;

#[cfg(test)]
mod testing;
