//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the relay.
//! Independent of specific transports, serving as the contract for other layers.

pub mod action;
pub mod automation;
pub mod config;
pub mod outcome;
pub mod traits;
pub mod types;
