//! # Interface Layer
//!
//! HTTP surfaces: the gateway that receives commands and the bridge that executes them
//! on the desktop.

pub mod bridge;
pub mod gateway;
