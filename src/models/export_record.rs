use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished session export, kept in the `export_log` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub id: i64,
    pub record_kind: String,
    pub file_name: String,
    pub data_rows: u32,
    pub cleared: bool,
    pub created_at: DateTime<Utc>,
}
