//! Bag-of-n-grams counting followed by TF-IDF weighting.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, sparse::SparseRow};

/// Tunable knobs of [`TfidfVectorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorizerParams {
  /// Longest n-gram; n-grams of length `1..=ngram_max` are counted.
  pub ngram_max:    usize,
  /// Terms present in more than `max_df × documents` are ignored.
  pub max_df:       f64,
  /// Keep only the most frequent terms.
  pub max_features: Option<usize>,
  pub use_idf:      bool,
}

impl Default for VectorizerParams {
  fn default() -> Self {
    Self {
      ngram_max:    1,
      max_df:       1.0,
      max_features: None,
      use_idf:      true,
    }
  }
}

impl VectorizerParams {
  pub fn validate(&self) -> Result<()> {
    if !(1..=3).contains(&self.ngram_max) {
      return Err(Error::InvalidParams(format!(
        "ngram_max must be 1..=3, got {}",
        self.ngram_max
      )));
    }
    if !(self.max_df > 0.0 && self.max_df <= 1.0) {
      return Err(Error::InvalidParams(format!(
        "max_df must be in (0, 1], got {}",
        self.max_df
      )));
    }
    if self.max_features == Some(0) {
      return Err(Error::InvalidParams("max_features must be positive".into()));
    }
    Ok(())
  }
}

/// A fitted vocabulary with optional inverse document frequencies.
///
/// Vocabulary indices follow sorted term order. Output rows are L2-normalised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
  params:     VectorizerParams,
  vocabulary: BTreeMap<String, u32>,
  /// Present iff `params.use_idf`; indexed like the vocabulary.
  idf:        Option<Vec<f64>>,
}

impl TfidfVectorizer {
  /// Learn the vocabulary (and idf weights) from tokenized documents.
  pub fn fit(params: VectorizerParams, docs: &[&[String]]) -> Result<Self> {
    params.validate()?;

    // term -> (total count, document frequency)
    let mut stats: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for doc in docs {
      for (term, count) in term_counts(doc, params.ngram_max) {
        let entry = stats.entry(term).or_default();
        entry.0 += count;
        entry.1 += 1;
      }
    }

    let n_docs = docs.len();
    let max_doc_count = params.max_df * n_docs as f64;
    stats.retain(|_, (_, df)| (*df as f64) <= max_doc_count);

    if let Some(limit) = params.max_features
      && stats.len() > limit
    {
      let mut by_freq: Vec<(&String, u64)> =
        stats.iter().map(|(t, (count, _))| (t, *count)).collect();
      by_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
      let keep: std::collections::HashSet<String> =
        by_freq.into_iter().take(limit).map(|(t, _)| t.clone()).collect();
      stats.retain(|t, _| keep.contains(t));
    }

    let vocabulary: BTreeMap<String, u32> = stats
      .keys()
      .enumerate()
      .map(|(i, t)| (t.clone(), i as u32))
      .collect();

    let idf = params.use_idf.then(|| {
      stats
        .values()
        .map(|(_, df)| ((1.0 + n_docs as f64) / (1.0 + *df as f64)).ln() + 1.0)
        .collect()
    });

    tracing::debug!(
      terms = vocabulary.len(),
      documents = n_docs,
      "fitted vectorizer"
    );
    Ok(Self {
      params,
      vocabulary,
      idf,
    })
  }

  pub fn params(&self) -> &VectorizerParams { &self.params }

  /// Number of output features.
  pub fn len(&self) -> usize { self.vocabulary.len() }

  pub fn is_empty(&self) -> bool { self.vocabulary.is_empty() }

  pub fn vocabulary(&self) -> &BTreeMap<String, u32> { &self.vocabulary }

  /// Check internal consistency after deserialization.
  pub fn validate(&self) -> Result<()> {
    self.params.validate()?;
    if let Some(idf) = &self.idf
      && idf.len() != self.vocabulary.len()
    {
      return Err(Error::InvalidArtifact(format!(
        "{} idf weights for {} terms",
        idf.len(),
        self.vocabulary.len()
      )));
    }
    if self.idf.is_some() != self.params.use_idf {
      return Err(Error::InvalidArtifact("idf weights do not match use_idf".into()));
    }
    let n = self.vocabulary.len() as u32;
    if self.vocabulary.values().any(|i| *i >= n) {
      return Err(Error::InvalidArtifact("vocabulary index out of range".into()));
    }
    Ok(())
  }

  /// Vectorize one tokenized document.
  pub fn transform(&self, tokens: &[String]) -> SparseRow {
    let mut entries: Vec<(u32, f64)> = term_counts(tokens, self.params.ngram_max)
      .into_iter()
      .filter_map(|(term, count)| {
        let idx = *self.vocabulary.get(&term)?;
        let weight = self.idf.as_ref().map_or(1.0, |idf| idf[idx as usize]);
        Some((idx, count as f64 * weight))
      })
      .collect();
    entries.sort_by_key(|(idx, _)| *idx);

    let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
      for (_, v) in &mut entries {
        *v /= norm;
      }
    }
    SparseRow::from_sorted(entries)
  }
}

/// Count every n-gram (joined with single spaces) in a token list.
fn term_counts(tokens: &[String], ngram_max: usize) -> HashMap<String, u64> {
  let mut counts = HashMap::new();
  for n in 1..=ngram_max {
    for window in tokens.windows(n) {
      *counts.entry(window.join(" ")).or_insert(0) += 1;
    }
  }
  counts
}

#[cfg(test)]
mod tests {
  use super::*;

  fn docs(texts: &[&str]) -> Vec<Vec<String>> {
    texts
      .iter()
      .map(|t| t.split_whitespace().map(str::to_owned).collect())
      .collect()
  }

  fn refs(docs: &[Vec<String>]) -> Vec<&[String]> {
    docs.iter().map(Vec::as_slice).collect()
  }

  #[test]
  fn vocabulary_is_sorted() {
    let d = docs(&["water food", "food tent"]);
    let v = TfidfVectorizer::fit(VectorizerParams::default(), &refs(&d)).unwrap();
    let terms: Vec<&str> = v.vocabulary().keys().map(String::as_str).collect();
    assert_eq!(terms, vec!["food", "tent", "water"]);
    assert_eq!(v.vocabulary()["food"], 0);
  }

  #[test]
  fn bigrams_are_added_when_requested() {
    let d = docs(&["need clean water"]);
    let params = VectorizerParams {
      ngram_max: 2,
      ..VectorizerParams::default()
    };
    let v = TfidfVectorizer::fit(params, &refs(&d)).unwrap();
    assert!(v.vocabulary().contains_key("clean water"));
    assert_eq!(v.len(), 5);
  }

  #[test]
  fn max_df_drops_ubiquitous_terms() {
    let d = docs(&["the water", "the food", "the tent", "the rain"]);
    let params = VectorizerParams {
      max_df: 0.75,
      ..VectorizerParams::default()
    };
    let v = TfidfVectorizer::fit(params, &refs(&d)).unwrap();
    assert!(!v.vocabulary().contains_key("the"));
    assert_eq!(v.len(), 4);
  }

  #[test]
  fn max_features_keeps_most_frequent() {
    let d = docs(&["a a a b b c", "a b"]);
    let params = VectorizerParams {
      max_features: Some(2),
      ..VectorizerParams::default()
    };
    let v = TfidfVectorizer::fit(params, &refs(&d)).unwrap();
    let terms: Vec<&str> = v.vocabulary().keys().map(String::as_str).collect();
    assert_eq!(terms, vec!["a", "b"]);
  }

  #[test]
  fn rows_are_l2_normalised() {
    let d = docs(&["water water food", "food"]);
    let v = TfidfVectorizer::fit(VectorizerParams::default(), &refs(&d)).unwrap();
    let row = v.transform(&d[0]);
    let norm: f64 = row.entries().iter().map(|(_, x)| x * x).sum();
    assert!((norm - 1.0).abs() < 1e-12);
    // "water" only appears in one document, so it outweighs "food".
    assert!(row.get(v.vocabulary()["water"]) > row.get(v.vocabulary()["food"]));
  }

  #[test]
  fn without_idf_weights_are_plain_counts() {
    let d = docs(&["water water food"]);
    let params = VectorizerParams {
      use_idf: false,
      ..VectorizerParams::default()
    };
    let v = TfidfVectorizer::fit(params, &refs(&d)).unwrap();
    let row = v.transform(&d[0]);
    let water = row.get(v.vocabulary()["water"]);
    let food = row.get(v.vocabulary()["food"]);
    assert!((water / food - 2.0).abs() < 1e-12);
  }

  #[test]
  fn unknown_terms_produce_an_empty_row() {
    let d = docs(&["water"]);
    let v = TfidfVectorizer::fit(VectorizerParams::default(), &refs(&d)).unwrap();
    let unseen = docs(&["earthquake"]);
    assert_eq!(v.transform(&unseen[0]).nnz(), 0);
  }

  #[test]
  fn rejects_out_of_range_params() {
    let bad = VectorizerParams {
      max_df: 0.0,
      ..VectorizerParams::default()
    };
    assert!(matches!(bad.validate(), Err(Error::InvalidParams(_))));
  }
}
