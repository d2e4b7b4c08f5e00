//! HTTP handlers, one module per resource.

pub mod consistency;
pub mod documents;
pub mod health;
pub mod projects;

use uuid::Uuid;

/// Parse a path id. Ids that are not UUIDs cannot exist, so callers map
/// `None` to the resource's not-found error.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}
