//! Typed client for the TaskFlow server.
//!
//! This crate provides:
//! - [`Session`], the explicit authentication context passed to every call
//! - [`TaskFlowClient`], one method per server endpoint
//! - [`PreferenceStore`], the locally persisted theme selection
//! - [`dates`], due date helpers for display

mod client;
pub mod dates;
mod preferences;
mod session;

pub use client::*;
pub use preferences::*;
pub use session::*;
