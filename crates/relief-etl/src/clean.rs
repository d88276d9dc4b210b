//! Join and clean the two input tables.
//!
//! The category cell of every row is a `;`-separated list of `name-value`
//! pairs. The first merged row defines the vocabulary; every other row must
//! list the same names in the same order.

use std::collections::{HashMap, HashSet};

use relief_core::{
  category::{CategoryFlags, CategorySet},
  message::{Dataset, MessageRecord},
};

use crate::{
  Error, Result,
  load::{CategoryRow, MessageRow},
};

/// A message row joined with one of its category rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
  pub id:         i64,
  pub message:    Option<String>,
  pub genre:      Option<String>,
  pub categories: String,
}

/// Row counts for each cleaning step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
  /// Rows read from the messages file; filled in by [`crate::run`].
  pub input_rows:         usize,
  pub merged_rows:        usize,
  pub incomplete_dropped: usize,
  pub duplicates_dropped: usize,
  pub output_rows:        usize,
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Inner join on `id`.
///
/// Output follows message order; a message with several category rows yields
/// one merged row per category row, in category-file order. The `original`
/// column is discarded here.
pub fn merge(messages: Vec<MessageRow>, categories: Vec<CategoryRow>) -> Vec<MergedRow> {
  let mut by_id: HashMap<i64, Vec<String>> = HashMap::new();
  for row in categories {
    by_id.entry(row.id).or_default().push(row.categories);
  }

  let mut merged = Vec::with_capacity(messages.len());
  for msg in messages {
    let Some(cells) = by_id.get(&msg.id) else { continue };
    for cell in cells {
      merged.push(MergedRow {
        id:         msg.id,
        message:    msg.message.clone(),
        genre:      msg.genre.clone(),
        categories: cell.clone(),
      });
    }
  }
  merged
}

// ─── Clean ───────────────────────────────────────────────────────────────────

/// Split category cells into 0/1 flags, drop incomplete rows and exact
/// duplicates.
pub fn clean(merged: Vec<MergedRow>) -> Result<(Dataset, CleanReport)> {
  let first = merged.first().ok_or(Error::NothingMerged)?;
  let vocabulary = parse_cell(first.id, &first.categories)?;
  let categories = CategorySet::new(vocabulary.iter().map(|(name, _)| *name))?;

  let mut report = CleanReport {
    merged_rows: merged.len(),
    ..CleanReport::default()
  };
  let mut seen: HashSet<MessageRecord> = HashSet::with_capacity(merged.len());
  let mut records = Vec::with_capacity(merged.len());

  for row in merged {
    let flags = row_flags(&categories, row.id, &row.categories)?;

    let (Some(message), Some(genre)) = (present(row.message), present(row.genre))
    else {
      tracing::debug!(id = row.id, "dropping row with missing message or genre");
      report.incomplete_dropped += 1;
      continue;
    };

    let record = MessageRecord {
      id: row.id,
      message,
      genre,
      categories: flags,
    };
    if seen.insert(record.clone()) {
      records.push(record);
    } else {
      report.duplicates_dropped += 1;
    }
  }

  if report.incomplete_dropped > 0 {
    tracing::warn!(rows = report.incomplete_dropped, "dropped incomplete rows");
  }
  report.output_rows = records.len();
  Ok((Dataset::new(categories, records)?, report))
}

fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

/// Parse one cell into `(name, flag)` pairs.
///
/// The value after the last `-` must be a non-negative integer. The raw data
/// occasionally carries `2`; any non-zero value counts as flagged.
fn parse_cell(id: i64, cell: &str) -> Result<Vec<(&str, bool)>> {
  cell
    .split(';')
    .map(|pair| {
      let pair = pair.trim();
      let (name, value) = pair.rsplit_once('-').ok_or_else(|| {
        Error::MalformedCategories {
          id,
          detail: format!("{pair:?} is not a name-value pair"),
        }
      })?;
      let value: u32 = value.parse().map_err(|_| Error::MalformedCategories {
        id,
        detail: format!("{pair:?} has a non-numeric value"),
      })?;
      Ok((name, value > 0))
    })
    .collect()
}

fn row_flags(categories: &CategorySet, id: i64, cell: &str) -> Result<CategoryFlags> {
  let pairs = parse_cell(id, cell)?;
  if pairs.len() != categories.len() {
    return Err(Error::InconsistentVocabulary {
      id,
      detail: format!("{} categories, expected {}", pairs.len(), categories.len()),
    });
  }

  let mut flags = Vec::with_capacity(pairs.len());
  for ((name, flag), expected) in pairs.into_iter().zip(categories.iter()) {
    if name != expected {
      return Err(Error::InconsistentVocabulary {
        id,
        detail: format!("found {name:?} where {expected:?} was expected"),
      });
    }
    flags.push(flag);
  }
  Ok(CategoryFlags::new(flags))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn msg(id: i64, message: Option<&str>, genre: Option<&str>) -> MessageRow {
    MessageRow {
      id,
      message: message.map(Into::into),
      original: None,
      genre: genre.map(Into::into),
    }
  }

  fn cat(id: i64, cell: &str) -> CategoryRow {
    CategoryRow { id, categories: cell.into() }
  }

  #[test]
  fn merge_is_an_inner_join_in_message_order() {
    let merged = merge(
      vec![
        msg(3, Some("c"), Some("news")),
        msg(1, Some("a"), Some("direct")),
        msg(2, Some("b"), Some("social")),
      ],
      vec![cat(1, "related-1"), cat(3, "related-0"), cat(3, "related-1")],
    );
    let ids: Vec<i64> = merged.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![3, 3, 1]);
    assert_eq!(merged[0].categories, "related-0");
    assert_eq!(merged[1].categories, "related-1");
  }

  #[test]
  fn splits_cells_into_named_flags() {
    let merged = merge(
      vec![msg(1, Some("need water"), Some("direct"))],
      vec![cat(1, "related-1;request-0;water-1")],
    );
    let (dataset, report) = clean(merged).unwrap();
    assert_eq!(dataset.categories.names(), ["related", "request", "water"]);
    assert_eq!(dataset.records[0].categories.as_slice(), [true, false, true]);
    assert_eq!(report.output_rows, 1);
  }

  #[test]
  fn value_two_normalises_to_flagged() {
    let merged = merge(
      vec![msg(1, Some("x"), Some("direct"))],
      vec![cat(1, "related-2;request-0")],
    );
    let (dataset, _) = clean(merged).unwrap();
    assert_eq!(dataset.records[0].categories.as_slice(), [true, false]);
  }

  #[test]
  fn names_with_hyphens_split_on_the_last_one() {
    let merged = merge(
      vec![msg(1, Some("x"), Some("direct"))],
      vec![cat(1, "aid_related-1")],
    );
    let (dataset, _) = clean(merged).unwrap();
    assert_eq!(dataset.categories.names(), ["aid_related"]);
  }

  #[test]
  fn drops_exact_duplicates_keeping_the_first() {
    let merged = merge(
      vec![
        msg(1, Some("help"), Some("direct")),
        msg(1, Some("help"), Some("direct")),
        msg(2, Some("food"), Some("news")),
      ],
      vec![cat(1, "related-1"), cat(2, "related-0")],
    );
    let (dataset, report) = clean(merged).unwrap();
    assert_eq!(report.merged_rows, 3);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records[0].id, 1);
    assert_eq!(dataset.records[1].id, 2);
  }

  #[test]
  fn same_id_with_different_flags_is_not_a_duplicate() {
    let merged = merge(
      vec![msg(1, Some("help"), Some("direct"))],
      vec![cat(1, "related-1"), cat(1, "related-0")],
    );
    let (dataset, report) = clean(merged).unwrap();
    assert_eq!(report.duplicates_dropped, 0);
    assert_eq!(dataset.len(), 2);
  }

  #[test]
  fn drops_rows_missing_message_or_genre() {
    let merged = merge(
      vec![
        msg(1, None, Some("direct")),
        msg(2, Some("  "), Some("direct")),
        msg(3, Some("ok"), None),
        msg(4, Some("ok"), Some("news")),
      ],
      vec![
        cat(1, "related-1"),
        cat(2, "related-1"),
        cat(3, "related-1"),
        cat(4, "related-1"),
      ],
    );
    let (dataset, report) = clean(merged).unwrap();
    assert_eq!(report.incomplete_dropped, 3);
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records[0].id, 4);
  }

  #[test]
  fn output_never_exceeds_input() {
    let messages: Vec<MessageRow> = (0..20)
      .map(|i| msg(i % 7, Some("repeat"), Some("direct")))
      .collect();
    let categories: Vec<CategoryRow> = (0..7).map(|i| cat(i, "related-1;offer-0")).collect();
    let input = messages.len();
    let (dataset, report) = clean(merge(messages, categories)).unwrap();
    assert!(dataset.len() <= input);
    assert_eq!(report.output_rows, dataset.len());
    assert_eq!(dataset.len(), 7);
  }

  #[test]
  fn inconsistent_vocabulary_is_fatal() {
    let merged = merge(
      vec![msg(1, Some("a"), Some("d")), msg(2, Some("b"), Some("d"))],
      vec![cat(1, "related-1;request-0"), cat(2, "request-0;related-1")],
    );
    let err = clean(merged).unwrap_err();
    assert!(matches!(err, Error::InconsistentVocabulary { id: 2, .. }));
  }

  #[test]
  fn category_named_like_a_message_column_is_fatal() {
    let merged = merge(
      vec![msg(1, Some("a"), Some("d"))],
      vec![cat(1, "related-1;Genre-0")],
    );
    assert!(matches!(
      clean(merged),
      Err(Error::Core(relief_core::Error::ReservedCategory(n))) if n == "Genre"
    ));
  }

  #[test]
  fn missing_pair_is_fatal() {
    let merged = merge(
      vec![msg(1, Some("a"), Some("d")), msg(2, Some("b"), Some("d"))],
      vec![cat(1, "related-1;request-0"), cat(2, "related-1")],
    );
    assert!(matches!(
      clean(merged),
      Err(Error::InconsistentVocabulary { id: 2, .. })
    ));
  }

  #[test]
  fn non_numeric_flag_is_malformed() {
    let merged = merge(
      vec![msg(1, Some("a"), Some("d"))],
      vec![cat(1, "related-yes")],
    );
    assert!(matches!(
      clean(merged),
      Err(Error::MalformedCategories { id: 1, .. })
    ));
  }

  #[test]
  fn nothing_merged_is_an_error() {
    let merged = merge(vec![msg(1, Some("a"), Some("d"))], vec![cat(2, "related-1")]);
    assert!(matches!(clean(merged), Err(Error::NothingMerged)));
  }
}
