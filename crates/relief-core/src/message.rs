//! Message records and the dataset envelope the store reads and writes.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  category::{CategoryFlags, CategorySet},
};

/// One cleaned message with its category flags.
///
/// Records are immutable once ingestion has produced them. Equality and
/// hashing cover every field, so two rows are duplicates only if they agree
/// on id, text, genre and every flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRecord {
  pub id:         i64,
  pub message:    String,
  /// Channel the message arrived through (`direct`, `news`, `social`, ...).
  pub genre:      String,
  pub categories: CategoryFlags,
}

/// A category vocabulary together with the records that use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub categories: CategorySet,
  pub records:    Vec<MessageRecord>,
}

impl Dataset {
  /// Bundle records with their vocabulary, checking every record's flag count.
  pub fn new(categories: CategorySet, records: Vec<MessageRecord>) -> Result<Self> {
    let expected = categories.len();
    if let Some(bad) = records.iter().find(|r| r.categories.len() != expected) {
      return Err(Error::FlagCountMismatch {
        id: bad.id,
        expected,
        found: bad.categories.len(),
      });
    }
    Ok(Self { categories, records })
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}
