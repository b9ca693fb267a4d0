use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-text problem noted against a measurement position during a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProblemReport {
    pub id: String,
    pub position: String,
    pub description: String,
    pub reported_at: DateTime<Utc>,
}

impl ProblemReport {
    pub fn new(position: String, description: String, reported_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            position,
            description,
            reported_at,
        }
    }
}
