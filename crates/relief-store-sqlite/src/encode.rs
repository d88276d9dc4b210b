//! Conversions between domain types and the plain values stored in SQLite
//! columns.
//!
//! Flags are stored as INTEGER 0/1. Rows come back from the worker thread as
//! [`RawRow`] and are decoded here, outside the connection closure.

use relief_core::{category::CategoryFlags, message::MessageRecord};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── Flags ───────────────────────────────────────────────────────────────────

pub fn encode_flag(flag: bool) -> i64 { i64::from(flag) }

pub fn decode_flag(id: i64, category: &str, value: i64) -> Result<bool> {
  match value {
    0 => Ok(false),
    1 => Ok(true),
    value => Err(Error::InvalidFlag {
      id,
      category: category.to_owned(),
      value,
    }),
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A row as read from SQLite, before flag validation.
pub struct RawRow {
  pub id:      i64,
  pub message: String,
  pub genre:   String,
  pub flags:   Vec<i64>,
}

impl RawRow {
  pub fn decode(self, categories: &[String]) -> Result<MessageRecord> {
    let flags = self
      .flags
      .iter()
      .zip(categories)
      .map(|(value, name)| decode_flag(self.id, name, *value))
      .collect::<Result<Vec<_>>>()?;
    Ok(MessageRecord {
      id:         self.id,
      message:    self.message,
      genre:      self.genre,
      categories: CategoryFlags::new(flags),
    })
  }
}

// ─── Digest ──────────────────────────────────────────────────────────────────

/// Order-independent digest over a multiset of records.
///
/// Each record is hashed on its own; the sorted record hashes are then hashed
/// together, so duplicates still count.
pub fn digest_records<'a>(
  categories: &[String],
  records: impl IntoIterator<Item = &'a MessageRecord>,
) -> String {
  let mut row_hashes: Vec<[u8; 32]> = records
    .into_iter()
    .map(|r| {
      let mut hasher = Sha256::new();
      hasher.update(r.id.to_le_bytes());
      hash_str(&mut hasher, &r.message);
      hash_str(&mut hasher, &r.genre);
      for flag in r.categories.as_slice() {
        hasher.update([u8::from(*flag)]);
      }
      hasher.finalize().into()
    })
    .collect();
  row_hashes.sort_unstable();

  let mut hasher = Sha256::new();
  for name in categories {
    hash_str(&mut hasher, name);
  }
  for h in &row_hashes {
    hasher.update(h);
  }
  hex::encode(hasher.finalize())
}

/// Length-prefixed so adjacent fields cannot run into each other.
fn hash_str(hasher: &mut Sha256, s: &str) {
  hasher.update((s.len() as u64).to_le_bytes());
  hasher.update(s.as_bytes());
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: i64, message: &str, flags: Vec<bool>) -> MessageRecord {
    MessageRecord {
      id,
      message: message.into(),
      genre: "news".into(),
      categories: flags.into(),
    }
  }

  #[test]
  fn decode_flag_rejects_values_other_than_zero_and_one() {
    assert!(!decode_flag(1, "related", 0).unwrap());
    assert!(decode_flag(1, "related", 1).unwrap());
    assert!(matches!(
      decode_flag(1, "related", 2),
      Err(Error::InvalidFlag { value: 2, .. })
    ));
  }

  #[test]
  fn digest_ignores_row_order() {
    let names = vec!["related".to_owned()];
    let a = record(1, "water", vec![true]);
    let b = record(2, "food", vec![false]);
    assert_eq!(
      digest_records(&names, [&a, &b]),
      digest_records(&names, [&b, &a])
    );
  }

  #[test]
  fn digest_counts_duplicates() {
    let names = vec!["related".to_owned()];
    let a = record(1, "water", vec![true]);
    assert_ne!(digest_records(&names, [&a]), digest_records(&names, [&a, &a]));
  }
}
