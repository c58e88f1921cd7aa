use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, MySql};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Null,
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// ===============================
/// Partial UPDATE of one row
/// ===============================
///
/// Only the columns passed to [`SqlUpdate::set`] end up in the statement, so
/// columns the caller did not touch keep their stored representation.
#[derive(Debug)]
pub struct SqlUpdate {
    table: &'static str,
    columns: Vec<&'static str>,
    values: Vec<SqlValue>,
    null_guards: Vec<&'static str>,
}

impl SqlUpdate {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
            null_guards: Vec::new(),
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.columns.push(column);
        self.values.push(value.into());
        self
    }

    /// Adds the column only when a value is present.
    pub fn set_some<T: Into<SqlValue>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Matches the row only while `column` is still NULL, so a write-once
    /// column is never overwritten.
    pub fn where_null(mut self, column: &'static str) -> Self {
        self.null_guards.push(column);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `UPDATE <table> SET a = ?, b = ? WHERE id = ?`, or `None` when nothing is set.
    pub fn sql(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let set_clause = self
            .columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");

        let guards: String = self
            .null_guards
            .iter()
            .map(|c| format!(" AND {} IS NULL", c))
            .collect();

        Some(format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            self.table, set_clause, guards
        ))
    }
}

/// ===============================
/// Execute the update
/// ===============================
///
/// Runs on a pool or inside a transaction. Returns the affected row count;
/// an empty update does not touch the database.
pub async fn execute_update<'c, E>(executor: E, update: SqlUpdate, id: u64) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = MySql>,
{
    let Some(sql) = update.sql() else {
        return Ok(0);
    };

    let mut query = sqlx::query(&sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}
