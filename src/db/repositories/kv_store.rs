use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::db::Database;

impl Database {
    /// Raw stored text for `key`, if any.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .with_context(|| format!("failed to read key {key}"))?;
            Ok(value)
        })
        .await
    }

    pub async fn put_value(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write key {key}"))?;
            Ok(())
        })
        .await
    }

    /// Removes every key in `keys` inside one transaction.
    pub async fn delete_values(&self, keys: Vec<String>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let mut removed = 0;
            for key in &keys {
                removed += tx
                    .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                    .with_context(|| format!("failed to delete key {key}"))?;
            }
            tx.commit().context("failed to commit key deletion")?;
            Ok(removed)
        })
        .await
    }

    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM kv_store WHERE key LIKE ?1 ESCAPE '\\' ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![pattern], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::temp_database;

    #[tokio::test]
    async fn put_then_get_overwrites() {
        let (db, _dir) = temp_database();
        assert_eq!(db.get_value("weaving.cursor").await.unwrap(), None);

        db.put_value("weaving.cursor", "1".into()).await.unwrap();
        db.put_value("weaving.cursor", "2".into()).await.unwrap();
        assert_eq!(
            db.get_value("weaving.cursor").await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn delete_and_list_by_prefix() {
        let (db, _dir) = temp_database();
        for key in ["twisting.values", "twisting.cursor", "twisting_other.x", "weaving.values"] {
            db.put_value(key, "{}".into()).await.unwrap();
        }

        let keys = db.list_keys("twisting.").await.unwrap();
        assert_eq!(keys, vec!["twisting.cursor", "twisting.values"]);

        let removed = db
            .delete_values(vec![
                "twisting.values".into(),
                "twisting.cursor".into(),
                "twisting.view".into(),
            ])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(db.list_keys("twisting.").await.unwrap().is_empty());
        assert_eq!(db.list_keys("weaving.").await.unwrap().len(), 1);
    }
}
