pub mod employee;
mod error;

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::QueryAs;
use sqlx::{Any, AnyConnection, Connection, FromRow};

pub use error::{RepoError, RepoResult};

/// Fixed-width RFC 3339 form used for stored timestamps, so text order is time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(Option<i64>),
    Text(Option<String>),
}

impl SqlValue {
    fn is_null(&self) -> bool {
        matches!(self, SqlValue::Int(None) | SqlValue::Text(None))
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(Some(value))
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(Some(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(Some(value.to_string()))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        SqlValue::Text(value)
    }
}

pub trait Record: for<'r> FromRow<'r, AnyRow> + Send + Unpin + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const PRIMARY_KEY: &'static str = "id";
    /// Set once at insert, never written afterwards.
    const CREATED_AT_COLUMN: &'static str;
    /// Columns referencing other records, usable with `get_by_foreign_key`.
    const FOREIGN_KEYS: &'static [&'static str] = &[];

    type Changes: Changeset + Sync;

    fn id(&self) -> i64;
}

pub trait Changeset {
    fn values(&self) -> Vec<(&'static str, SqlValue)>;
}

/// Filters and window for [`Repository::get_all`]. Unset parts impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub after: Option<DateTime<Utc>>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub filters: Vec<(&'static str, SqlValue)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only rows created at or after `ts`.
    pub fn after(mut self, ts: DateTime<Utc>) -> Self {
        self.after = Some(ts);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Equality filter. A null value matches `IS NULL`.
    pub fn filter(mut self, column: &'static str, value: impl Into<SqlValue>) -> Self {
        self.filters.push((column, value.into()));
        self
    }
}

pub struct Repository<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Repository<T> {}

impl<T> Default for Repository<T> {
    fn default() -> Self {
        Repository { _record: PhantomData }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("record", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Record> Repository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_by_id(&self, conn: &mut AnyConnection, id: i64) -> RepoResult<Option<T>> {
        self.find_first_by(conn, T::PRIMARY_KEY, SqlValue::from(id)).await
    }

    pub async fn get_by_foreign_key(
        &self,
        conn: &mut AnyConnection,
        column: &str,
        id: i64,
    ) -> RepoResult<Option<T>> {
        let column = T::FOREIGN_KEYS
            .iter()
            .copied()
            .find(|fk| *fk == column)
            .ok_or_else(|| RepoError::UnknownColumn(column.to_string()))?;
        self.find_first_by(conn, column, SqlValue::from(id)).await
    }

    pub async fn find_first_by(
        &self,
        conn: &mut AnyConnection,
        column: &str,
        value: SqlValue,
    ) -> RepoResult<Option<T>> {
        let column = checked_column::<T>(column)?;
        let sql = format!(
            "{} WHERE {} = $1 ORDER BY {} LIMIT 1",
            select_sql::<T>(),
            column,
            T::PRIMARY_KEY
        );
        debug!("{}: {}", T::TABLE, sql);
        let row = bind_all(sqlx::query_as::<_, T>(&sql), vec![value])
            .fetch_optional(conn)
            .await?;
        Ok(row)
    }

    pub async fn get_all(&self, conn: &mut AnyConnection, query: &ListQuery) -> RepoResult<Vec<T>> {
        let mut sql = select_sql::<T>();
        let mut binds = Vec::new();
        let mut clauses = Vec::new();

        for (column, value) in &query.filters {
            let column = checked_column::<T>(column)?;
            if value.is_null() {
                clauses.push(format!("{column} IS NULL"));
            } else {
                binds.push(value.clone());
                clauses.push(format!("{column} = ${}", binds.len()));
            }
        }

        if let Some(after) = &query.after {
            binds.push(SqlValue::from(format_timestamp(after)));
            clauses.push(format!("{} >= ${}", T::CREATED_AT_COLUMN, binds.len()));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        sql.push_str(&format!(" ORDER BY {}", T::PRIMARY_KEY));

        // SQLite accepts OFFSET only after a LIMIT.
        if query.limit.is_some() || query.offset.is_some() {
            binds.push(SqlValue::from(query.limit.unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT ${}", binds.len()));
            if let Some(offset) = query.offset {
                binds.push(SqlValue::from(offset));
                sql.push_str(&format!(" OFFSET ${}", binds.len()));
            }
        }

        debug!("{}: {}", T::TABLE, sql);
        let rows = bind_all(sqlx::query_as::<_, T>(&sql), binds)
            .fetch_all(conn)
            .await?;
        Ok(rows)
    }

    /// Inserts a row and returns it with its server-assigned fields.
    pub async fn create(&self, conn: &mut AnyConnection, changes: &T::Changes) -> RepoResult<T> {
        let (mut columns, mut binds): (Vec<_>, Vec<_>) = writable_values::<T>(changes)?.into_iter().unzip();
        columns.push(T::CREATED_AT_COLUMN);
        binds.push(SqlValue::from(format_timestamp(&Utc::now())));

        let placeholders: Vec<String> = (1..=binds.len()).map(|i| format!("${i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            T::TABLE,
            columns.join(", "),
            placeholders.join(", "),
            T::COLUMNS.join(", ")
        );
        write_returning(conn, &sql, binds).await
    }

    /// Overwrites every column in `changes` on `existing` and returns the refreshed row.
    pub async fn update(
        &self,
        conn: &mut AnyConnection,
        existing: &T,
        changes: &T::Changes,
    ) -> RepoResult<T> {
        let values = writable_values::<T>(changes)?;
        if values.is_empty() {
            return self
                .get_by_id(conn, existing.id())
                .await?
                .ok_or(RepoError::Database(sqlx::Error::RowNotFound));
        }

        let mut binds = Vec::with_capacity(values.len() + 1);
        let mut assignments = Vec::with_capacity(values.len());
        for (column, value) in values {
            binds.push(value);
            assignments.push(format!("{column} = ${}", binds.len()));
        }
        binds.push(SqlValue::from(existing.id()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
            T::TABLE,
            assignments.join(", "),
            T::PRIMARY_KEY,
            binds.len(),
            T::COLUMNS.join(", ")
        );
        write_returning(conn, &sql, binds).await
    }

    pub async fn delete(&self, conn: &mut AnyConnection, existing: &T) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", T::TABLE, T::PRIMARY_KEY);
        debug!("{}: {}", T::TABLE, sql);

        let mut tx = conn.begin().await?;
        match sqlx::query(&sql).bind(existing.id()).execute(&mut *tx).await {
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(err) => {
                rollback(tx).await;
                Err(err.into())
            }
        }
    }
}

fn select_sql<T: Record>() -> String {
    format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

fn checked_column<T: Record>(column: &str) -> RepoResult<&'static str> {
    T::COLUMNS
        .iter()
        .copied()
        .find(|known| *known == column)
        .ok_or_else(|| RepoError::UnknownColumn(column.to_string()))
}

/// Changeset values minus the primary key and creation timestamp, which are never written.
fn writable_values<T: Record>(changes: &T::Changes) -> RepoResult<Vec<(&'static str, SqlValue)>> {
    changes
        .values()
        .into_iter()
        .filter(|(column, _)| *column != T::PRIMARY_KEY && *column != T::CREATED_AT_COLUMN)
        .map(|(column, value)| checked_column::<T>(column).map(|column| (column, value)))
        .collect()
}

fn bind_all<'q, O>(
    mut query: QueryAs<'q, Any, O, AnyArguments<'q>>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, Any, O, AnyArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Int(v) => query.bind(v),
            SqlValue::Text(v) => query.bind(v),
        };
    }
    query
}

/// Runs one `... RETURNING` statement in its own unit of work.
async fn write_returning<T: Record>(
    conn: &mut AnyConnection,
    sql: &str,
    binds: Vec<SqlValue>,
) -> RepoResult<T> {
    debug!("{}: {}", T::TABLE, sql);

    let mut tx = conn.begin().await?;
    match bind_all(sqlx::query_as::<_, T>(sql), binds)
        .fetch_one(&mut *tx)
        .await
    {
        Ok(row) => {
            tx.commit().await?;
            Ok(row)
        }
        Err(err) => {
            rollback(tx).await;
            Err(err.into())
        }
    }
}

async fn rollback(tx: sqlx::Transaction<'_, Any>) {
    debug!("rolling back unit of work");
    if let Err(err) = tx.rollback().await {
        warn!("rollback failed: {}", err);
    }
}
