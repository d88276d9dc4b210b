//! SQL for the message table.
//!
//! The table is wide: three fixed columns followed by one 0/1 column per
//! category. Its shape depends on the vocabulary, so the DDL is built at
//! runtime rather than held in a constant.

use relief_core::category::CategorySet;

/// Table name used when the caller does not choose one.
pub const DEFAULT_TABLE: &str = "messages";

/// Fixed leading columns, in order.
pub const FIXED_COLUMNS: [&str; 3] = ["id", "message", "genre"];

/// Bumped whenever the table layout changes.
pub const LAYOUT_VERSION: i64 = 1;

/// Quote an identifier for SQLite. Embedded quotes are doubled.
pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn is_valid_table_name(name: &str) -> bool {
  !name.is_empty()
    && !name.starts_with("sqlite_")
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn drop_table(table: &str) -> String {
  format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

pub fn create_table(table: &str, categories: &CategorySet) -> String {
  let mut columns = vec![
    "id      INTEGER NOT NULL".to_owned(),
    "message TEXT    NOT NULL".to_owned(),
    "genre   TEXT    NOT NULL".to_owned(),
  ];
  columns.extend(categories.iter().map(|name| {
    let col = quote_ident(name);
    format!("{col} INTEGER NOT NULL CHECK ({col} IN (0, 1))")
  }));
  format!(
    "CREATE TABLE {} (\n    {}\n)",
    quote_ident(table),
    columns.join(",\n    ")
  )
}

pub fn insert(table: &str, categories: &CategorySet) -> String {
  let names: Vec<String> = FIXED_COLUMNS
    .iter()
    .copied()
    .chain(categories.iter())
    .map(quote_ident)
    .collect();
  let params: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    quote_ident(table),
    names.join(", "),
    params.join(", ")
  )
}

pub fn select_all(table: &str) -> String {
  format!("SELECT * FROM {} ORDER BY rowid", quote_ident(table))
}

pub fn sum_categories(table: &str, categories: &[String]) -> String {
  let sums: Vec<String> = categories
    .iter()
    .map(|name| format!("COALESCE(SUM({}), 0)", quote_ident(name)))
    .collect();
  format!("SELECT {} FROM {}", sums.join(", "), quote_ident(table))
}

pub fn count_genres(table: &str) -> String {
  format!(
    "SELECT genre, COUNT(*) FROM {} GROUP BY genre ORDER BY genre",
    quote_ident(table)
  )
}

pub const TABLE_COLUMNS: &str =
  "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn create_table_has_one_checked_column_per_category() {
    let set = CategorySet::new(["related", "aid_related"]).unwrap();
    let sql = create_table("messages", &set);
    assert!(sql.starts_with("CREATE TABLE \"messages\""));
    assert!(sql.contains("\"related\" INTEGER NOT NULL CHECK (\"related\" IN (0, 1))"));
    assert!(sql.contains("\"aid_related\" INTEGER NOT NULL"));
  }

  #[test]
  fn insert_numbers_every_column() {
    let set = CategorySet::new(["related", "request"]).unwrap();
    let sql = insert("t", &set);
    assert!(sql.ends_with("VALUES (?1, ?2, ?3, ?4, ?5)"), "{sql}");
  }

  #[test]
  fn quote_ident_doubles_quotes() {
    assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
  }

  #[test]
  fn table_names_are_plain_identifiers() {
    assert!(is_valid_table_name("InsertTableName"));
    assert!(!is_valid_table_name("sqlite_master"));
    assert!(!is_valid_table_name("x; DROP"));
    assert!(!is_valid_table_name(""));
  }
}
