//! # Templates
//!
//! Static pages from the `templates/` directory.

pub const DASHBOARD_HTML: &str = include_str!("../../templates/dashboard.html");
