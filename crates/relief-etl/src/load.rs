//! CSV readers for the two input tables.

use std::{io, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

/// One row of the messages file (`id,message,original,genre`).
///
/// Empty cells deserialize to `None`; cleaning decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRow {
  pub id:       i64,
  #[serde(default)]
  pub message:  Option<String>,
  /// Untranslated text. Read so the column is accepted, dropped when cleaning.
  #[serde(default)]
  pub original: Option<String>,
  #[serde(default)]
  pub genre:    Option<String>,
}

/// One row of the categories file (`id,categories`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRow {
  pub id:         i64,
  /// `;`-separated `name-value` pairs, e.g. `related-1;request-0`.
  pub categories: String,
}

pub fn read_messages<R: io::Read>(reader: R) -> Result<Vec<MessageRow>> {
  read_rows(csv::Reader::from_reader(reader))
}

pub fn read_categories<R: io::Read>(reader: R) -> Result<Vec<CategoryRow>> {
  read_rows(csv::Reader::from_reader(reader))
}

pub(crate) fn read_messages_file(path: &Path) -> Result<Vec<MessageRow>> {
  read_rows(open(path)?)
}

pub(crate) fn read_categories_file(path: &Path) -> Result<Vec<CategoryRow>> {
  read_rows(open(path)?)
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
  csv::Reader::from_path(path).map_err(|source| Error::Open {
    path: path.to_path_buf(),
    source,
  })
}

fn read_rows<R, T>(mut reader: csv::Reader<R>) -> Result<Vec<T>>
where
  R: io::Read,
  T: for<'de> Deserialize<'de>,
{
  reader
    .deserialize()
    .collect::<Result<Vec<T>, csv::Error>>()
    .map_err(Error::from)
}
