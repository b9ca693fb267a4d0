use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::kind::RecordKind;
use crate::models::{ProblemReport, SessionParameters};

/// What durable storage holds for a session at the moment of export.
#[derive(Debug, Clone)]
pub struct PersistedSession<K: RecordKind> {
    pub parameters: SessionParameters,
    pub values: K::Values,
    pub problems: Vec<ProblemReport>,
}

/// Fixed-column layout of an exported session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTable {
    pub title: String,
    pub exported_at: DateTime<Utc>,
    pub metadata: Vec<(String, String)>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub problems: Vec<ProblemReport>,
}

impl ExportTable {
    pub fn build<K: RecordKind>(session: &PersistedSession<K>, exported_at: DateTime<Utc>) -> Self {
        Self {
            title: K::TITLE.to_string(),
            exported_at,
            metadata: session
                .parameters
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            header: K::data_header(),
            rows: K::data_rows(&session.values),
            problems: session.problems.clone(),
        }
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Metadata rows, then the measurement grid, then reported problems.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record([self.title.as_str()])?;
        writer.write_record(["Exported At", self.exported_at.to_rfc3339().as_str()])?;
        for (key, value) in &self.metadata {
            writer.write_record([key.as_str(), value.as_str()])?;
        }

        writer.write_record(["Measurements"])?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer.write_record(["Problems"])?;
        writer.write_record(["Position", "Description", "Reported At"])?;
        for problem in &self.problems {
            writer.write_record([
                problem.position.as_str(),
                problem.description.as_str(),
                problem.reported_at.to_rfc3339().as_str(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("failed to flush CSV writer: {err}"))?;
        String::from_utf8(bytes).context("CSV export produced invalid UTF-8")
    }

    pub fn file_name(&self, namespace: &str) -> String {
        format!(
            "{namespace}-tension-{}.csv",
            self.exported_at.format("%Y%m%d-%H%M%S")
        )
    }
}
