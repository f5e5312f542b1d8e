//! Core entity definitions for TaskFlow.
//!
//! This crate defines the records shared across the TaskFlow service (users,
//! projects, tasks and preferences) together with the membership model that
//! decides who may read or mutate a project, and the validation rules applied
//! to incoming data before it becomes an entity.

mod membership;
mod preference;
mod project;
mod task;
mod user;
mod validation;

pub use membership::*;
pub use preference::*;
pub use project::*;
pub use task::*;
pub use user::*;
pub use validation::*;
