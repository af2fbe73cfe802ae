//! # Application Layer
//!
//! Orchestration of the relay: classifying commands, routing them to a healthy backend,
//! driving the editor on the bridge side, and keeping the activity log.

pub mod activity;
pub mod collector;
pub mod executor;
pub mod pipeline;
pub mod router;
pub mod utils;
pub mod validator;
