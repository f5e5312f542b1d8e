//! Project and task storage for TaskFlow.
//!
//! This crate provides the storage abstraction behind the TaskFlow server:
//! users, projects with their member lists, tasks and preferences. It ships
//! an in-memory store (tests and ephemeral deployments) and a SQLite store.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
