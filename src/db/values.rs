// src/db/values.rs
//
// SQL value conversions for domain types.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::domain::{CatalogDate, StatisticBucket};

/// Dates are written as `YYYY-MM-DD`; any native text form is accepted on read.
impl ToSql for CatalogDate {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_relational()))
    }
}

impl FromSql for CatalogDate {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        CatalogDate::parse(raw).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Buckets are stored under their statistic column name.
impl ToSql for StatisticBucket {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.column()))
    }
}

impl FromSql for StatisticBucket {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        StatisticBucket::from_column(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown bucket '{}'", raw).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_reads_timestamp_text_as_date() {
        let conn = Connection::open_in_memory().unwrap();
        let date: CatalogDate = conn
            .query_row("SELECT '2023-05-01T00:00:00Z'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(date.to_string(), "01.05.2023");
    }

    #[test]
    fn test_writes_sql_date() {
        let conn = Connection::open_in_memory().unwrap();
        let date = CatalogDate::from_ymd(2023, 5, 1).unwrap();
        let stored: String = conn
            .query_row("SELECT ?1", [date], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, "2023-05-01");
    }

    #[test]
    fn test_bucket_reads_back_and_null_is_none() {
        let conn = Connection::open_in_memory().unwrap();
        let bucket: Option<StatisticBucket> = conn
            .query_row("SELECT ?1", [StatisticBucket::Age19To30], |row| row.get(0))
            .unwrap();
        assert_eq!(bucket, Some(StatisticBucket::Age19To30));

        let missing: Option<StatisticBucket> =
            conn.query_row("SELECT NULL", [], |row| row.get(0)).unwrap();
        assert_eq!(missing, None);

        let unknown: rusqlite::Result<StatisticBucket> =
            conn.query_row("SELECT 'st_unknown'", [], |row| row.get(0));
        assert!(unknown.is_err());
    }
}
