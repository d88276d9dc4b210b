//! The category vocabulary and per-message category flags.
//!
//! A [`CategorySet`] is fixed at ingestion time and travels with the data all
//! the way to the model artifact. Flags are stored positionally, aligned with
//! the vocabulary order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

/// Names taken by the message columns stored alongside the flags.
pub const RESERVED_NAMES: [&str; 3] = ["id", "message", "genre"];

/// An ordered, duplicate-free list of category names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet {
  names: Vec<String>,
}

impl CategorySet {
  /// Build a vocabulary, rejecting empty, duplicate or non-identifier names.
  ///
  /// Names become SQLite column names next to the message columns, so only
  /// ASCII letters, digits and `_` are accepted, [`RESERVED_NAMES`] are
  /// refused, and duplicates are compared ignoring ASCII case.
  pub fn new<I, S>(names: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    if names.is_empty() {
      return Err(Error::EmptyVocabulary);
    }

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
      if !is_valid_name(name) {
        return Err(Error::InvalidCategoryName(name.clone()));
      }
      let folded = name.to_ascii_lowercase();
      if RESERVED_NAMES.contains(&folded.as_str()) {
        return Err(Error::ReservedCategory(name.clone()));
      }
      if !seen.insert(folded) {
        return Err(Error::DuplicateCategory(name.clone()));
      }
    }

    Ok(Self { names })
  }

  pub fn len(&self) -> usize { self.names.len() }

  pub fn is_empty(&self) -> bool { self.names.is_empty() }

  pub fn names(&self) -> &[String] { &self.names }

  pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
    self.names.iter().map(String::as_str)
  }
}

impl TryFrom<Vec<String>> for CategorySet {
  type Error = Error;

  fn try_from(names: Vec<String>) -> Result<Self> { Self::new(names) }
}

impl From<CategorySet> for Vec<String> {
  fn from(set: CategorySet) -> Self { set.names }
}

fn is_valid_name(name: &str) -> bool {
  !name.is_empty()
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─── Flags ───────────────────────────────────────────────────────────────────

/// Boolean membership flags for one message, aligned with a [`CategorySet`].
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct CategoryFlags(Vec<bool>);

impl CategoryFlags {
  pub fn new(flags: Vec<bool>) -> Self { Self(flags) }

  /// All-false flags for a vocabulary of `len` categories.
  pub fn none(len: usize) -> Self { Self(vec![false; len]) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, index: usize) -> Option<bool> { self.0.get(index).copied() }

  pub fn as_slice(&self) -> &[bool] { &self.0 }

  /// Names of the flagged categories, in vocabulary order.
  pub fn flagged<'a>(&'a self, set: &'a CategorySet) -> Vec<&'a str> {
    set
      .iter()
      .zip(&self.0)
      .filter_map(|(name, flag)| flag.then_some(name))
      .collect()
  }
}

impl From<Vec<bool>> for CategoryFlags {
  fn from(flags: Vec<bool>) -> Self { Self(flags) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_empty_vocabulary() {
    let err = CategorySet::new(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, Error::EmptyVocabulary));
  }

  #[test]
  fn rejects_duplicates() {
    let err = CategorySet::new(["related", "request", "related"]).unwrap_err();
    assert!(matches!(err, Error::DuplicateCategory(n) if n == "related"));
  }

  #[test]
  fn rejects_duplicates_that_differ_only_by_case() {
    let err = CategorySet::new(["Water", "water"]).unwrap_err();
    assert!(matches!(err, Error::DuplicateCategory(n) if n == "water"));
  }

  #[test]
  fn rejects_message_column_names() {
    for names in [vec!["id", "related"], vec!["genre"], vec!["related", "Message"]] {
      let err = CategorySet::new(names.clone()).unwrap_err();
      assert!(matches!(err, Error::ReservedCategory(_)), "{names:?}");
    }
  }

  #[test]
  fn rejects_names_that_are_not_identifiers() {
    let err = CategorySet::new(["related", "drop table"]).unwrap_err();
    assert!(matches!(err, Error::InvalidCategoryName(_)));
  }

  #[test]
  fn flagged_follows_vocabulary_order() {
    let set = CategorySet::new(["related", "request", "offer"]).unwrap();
    let flags = CategoryFlags::new(vec![true, false, true]);
    assert_eq!(flags.flagged(&set), vec!["related", "offer"]);
  }

  #[test]
  fn deserialization_validates() {
    let ok: CategorySet = serde_json::from_str(r#"["a","b"]"#).unwrap();
    assert_eq!(ok.len(), 2);
    assert!(serde_json::from_str::<CategorySet>(r#"["a","a"]"#).is_err());
  }
}
