use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Category a report belongs to
///
/// Categories are managed elsewhere; reports only reference and populate them.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
