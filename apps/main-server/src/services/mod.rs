//! Shared handler logic.

pub mod access;
pub mod activity;
