//! Activity log.
//!
//! Activity is recorded as structured tracing events under the
//! `taskflow::activity` target, so it can be routed to its own sink with an
//! `EnvFilter` directive such as `taskflow::activity=info`.

use std::fmt;

use uuid::Uuid;

/// Kind of record an activity refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Project => "Project",
            Self::Task => "Task",
        })
    }
}

/// Records that `user_id` performed `action` on an entity.
pub fn record(action: &str, entity: EntityKind, entity_id: Uuid, user_id: Uuid) {
    tracing::info!(
        target: "taskflow::activity",
        action,
        entity_type = %entity,
        entity_id = %entity_id,
        user_id = %user_id,
        "activity"
    );
}

/// Like [`record`], with a free-form detail such as the affected member.
pub fn record_with(
    action: &str,
    entity: EntityKind,
    entity_id: Uuid,
    user_id: Uuid,
    detail: &dyn fmt::Display,
) {
    tracing::info!(
        target: "taskflow::activity",
        action,
        entity_type = %entity,
        entity_id = %entity_id,
        user_id = %user_id,
        detail = %detail,
        "activity"
    );
}
