// ABOUTME: Library root for taskshim - the task and exec lifecycle core.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod error;
pub mod exec;
pub mod guest;
pub mod host;
pub mod output;
pub mod service;
pub mod task;
pub mod types;
