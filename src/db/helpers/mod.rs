use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out of range value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_datetime_accepts_rfc3339_offsets() {
        let parsed = parse_datetime("2026-03-01T08:30:00+02:00", "created_at").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T06:30:00+00:00");
        assert!(parse_datetime("yesterday", "created_at").is_err());
    }

    #[test]
    fn to_u32_rejects_negative_counts() {
        assert_eq!(to_u32(84, "data_rows").unwrap(), 84);
        assert!(to_u32(-1, "data_rows").is_err());
    }
}
