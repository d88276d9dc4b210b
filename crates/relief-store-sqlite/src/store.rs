//! [`SqliteStore`], the SQLite implementation of [`MessageStore`].

use std::path::Path;

use relief_core::{
  category::CategorySet,
  message::{Dataset, MessageRecord},
  store::MessageStore,
};
use rusqlite::{OpenFlags, types::Value};

use crate::{
  encode::{RawRow, digest_records, encode_flag},
  schema::{self, FIXED_COLUMNS, LAYOUT_VERSION},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The cleaned message table inside a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  table: String,
}

impl SqliteStore {
  /// Open (or create) the database at `path`, addressing `table` inside it.
  pub async fn open(path: impl AsRef<Path>, table: impl Into<String>) -> Result<Self> {
    let table = checked_table(table.into())?;
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn, table })
  }

  /// Open the database at `path` only if the file already exists.
  ///
  /// Readers use this so a mistyped path fails instead of leaving an empty
  /// database behind.
  pub async fn open_existing(
    path: impl AsRef<Path>,
    table: impl Into<String>,
  ) -> Result<Self> {
    let table = checked_table(table.into())?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
      | OpenFlags::SQLITE_OPEN_URI
      | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = tokio_rusqlite::Connection::open_with_flags(path, flags).await?;
    Ok(Self { conn, table })
  }

  /// Open an in-memory database.
  pub async fn open_in_memory(table: impl Into<String>) -> Result<Self> {
    let table = checked_table(table.into())?;
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn, table })
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Category column names, in table order.
  ///
  /// Fails with [`Error::TableNotFound`] if the table does not exist.
  async fn category_columns(&self) -> Result<Vec<String>> {
    let table = self.table.clone();
    let columns: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(schema::TABLE_COLUMNS)?;
        let names = stmt
          .query_map(rusqlite::params![table], |r| r.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;

    if columns.is_empty() {
      return Err(Error::TableNotFound(self.table.clone()));
    }
    if columns.len() <= FIXED_COLUMNS.len()
      || columns[..FIXED_COLUMNS.len()] != FIXED_COLUMNS
    {
      return Err(Error::UnexpectedLayout {
        table:  self.table.clone(),
        detail: format!("columns {columns:?}"),
      });
    }

    Ok(columns[FIXED_COLUMNS.len()..].to_vec())
  }

  async fn raw_rows(&self, n_categories: usize) -> Result<Vec<RawRow>> {
    let sql = schema::select_all(&self.table);
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |r| {
            let flags = (0..n_categories)
              .map(|i| r.get::<_, i64>(FIXED_COLUMNS.len() + i))
              .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(RawRow {
              id: r.get(0)?,
              message: r.get(1)?,
              genre: r.get(2)?,
              flags,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

fn checked_table(table: String) -> Result<String> {
  if schema::is_valid_table_name(&table) {
    Ok(table)
  } else {
    Err(Error::InvalidTableName(table))
  }
}

fn row_values(record: &MessageRecord) -> Vec<Value> {
  let mut values = Vec::with_capacity(FIXED_COLUMNS.len() + record.categories.len());
  values.push(Value::Integer(record.id));
  values.push(Value::Text(record.message.clone()));
  values.push(Value::Text(record.genre.clone()));
  values.extend(
    record
      .categories
      .as_slice()
      .iter()
      .map(|f| Value::Integer(encode_flag(*f))),
  );
  values
}

// ─── MessageStore impl ───────────────────────────────────────────────────────

impl MessageStore for SqliteStore {
  type Error = Error;

  async fn replace_dataset(&self, dataset: Dataset) -> Result<usize> {
    let drop_sql   = schema::drop_table(&self.table);
    let create_sql = schema::create_table(&self.table, &dataset.categories);
    let insert_sql = schema::insert(&self.table, &dataset.categories);
    let rows: Vec<Vec<Value>> = dataset.records.iter().map(row_values).collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&drop_sql, [])?;
        tx.execute(&create_sql, [])?;
        {
          let mut stmt = tx.prepare(&insert_sql)?;
          for values in &rows {
            stmt.execute(rusqlite::params_from_iter(values.iter()))?;
          }
        }
        tx.pragma_update(None, "user_version", LAYOUT_VERSION)?;
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::info!(table = %self.table, rows = written, "replaced message table");
    Ok(written)
  }

  async fn load_dataset(&self) -> Result<Dataset> {
    let columns = self.category_columns().await?;
    let categories = CategorySet::new(columns.clone())?;
    let records = self
      .raw_rows(columns.len())
      .await?
      .into_iter()
      .map(|raw| raw.decode(&columns))
      .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
      table = %self.table,
      rows = records.len(),
      categories = categories.len(),
      "loaded message table"
    );
    Ok(Dataset::new(categories, records)?)
  }

  async fn category_counts(&self) -> Result<Vec<(String, u64)>> {
    let columns = self.category_columns().await?;
    let sql = schema::sum_categories(&self.table, &columns);
    let n = columns.len();

    let sums: Vec<i64> = self
      .conn
      .call(move |conn| {
        let sums = conn.query_row(&sql, [], |r| {
          (0..n).map(|i| r.get::<_, i64>(i)).collect::<rusqlite::Result<Vec<_>>>()
        })?;
        Ok(sums)
      })
      .await?;

    Ok(
      columns
        .into_iter()
        .zip(sums)
        .map(|(name, sum)| (name, sum.max(0) as u64))
        .collect(),
    )
  }

  async fn genre_counts(&self) -> Result<Vec<(String, u64)>> {
    // Surfaces TableNotFound instead of a bare SQL error.
    self.category_columns().await?;
    let sql = schema::count_genres(&self.table);

    let counts: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      counts
        .into_iter()
        .map(|(genre, n)| (genre, n.max(0) as u64))
        .collect(),
    )
  }

  async fn digest(&self) -> Result<String> {
    let dataset = self.load_dataset().await?;
    Ok(digest_records(dataset.categories.names(), &dataset.records))
  }
}
