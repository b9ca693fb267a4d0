use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_datetime, to_u32},
    Database,
};
use crate::models::ExportRecord;

fn row_to_export_record(row: &Row) -> Result<ExportRecord> {
    Ok(ExportRecord {
        id: row.get("id")?,
        record_kind: row.get("record_kind")?,
        file_name: row.get("file_name")?,
        data_rows: to_u32(row.get("data_rows")?, "data_rows")?,
        cleared: row.get::<_, i64>("cleared")? != 0,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?, "created_at")?,
    })
}

impl Database {
    pub async fn insert_export_record(
        &self,
        record_kind: &str,
        file_name: &str,
        data_rows: u32,
        cleared: bool,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let record_kind = record_kind.to_string();
        let file_name = file_name.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO export_log (record_kind, file_name, data_rows, cleared, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record_kind,
                    file_name,
                    i64::from(data_rows),
                    cleared as i64,
                    created_at.to_rfc3339(),
                ],
            )
            .context("failed to insert export record")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Most recent exports first.
    pub async fn list_export_records(
        &self,
        record_kind: &str,
        limit: u32,
    ) -> Result<Vec<ExportRecord>> {
        let record_kind = record_kind.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, record_kind, file_name, data_rows, cleared, created_at
                 FROM export_log
                 WHERE record_kind = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;

            let mut rows = stmt.query(params![record_kind, i64::from(limit)])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_export_record(row)?);
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use crate::db::test_support::temp_database;

    #[tokio::test]
    async fn export_records_are_listed_newest_first_per_kind() {
        let (db, _dir) = temp_database();
        let earlier = Utc::now() - Duration::minutes(5);
        db.insert_export_record("weaving", "a.csv", 120, false, earlier)
            .await
            .unwrap();
        db.insert_export_record("weaving", "b.csv", 120, true, Utc::now())
            .await
            .unwrap();
        db.insert_export_record("twisting", "c.csv", 84, true, Utc::now())
            .await
            .unwrap();

        let records = db.list_export_records("weaving", 10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_name, "b.csv");
        assert!(records[0].cleared);
        assert_eq!(records[1].data_rows, 120);

        let limited = db.list_export_records("weaving", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
