//! Exhaustive search over vectorizer settings, scored by k-fold
//! cross-validated subset accuracy.

use rayon::prelude::*;
use relief_core::category::CategoryFlags;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  features::Document,
  metrics,
  pipeline::{Pipeline, PipelineParams},
  split,
};

/// Values tried for each vectorizer knob. Candidates are the cartesian
/// product, enumerated in field order with the last field varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
  pub ngram_max:    Vec<usize>,
  pub max_df:       Vec<f64>,
  pub max_features: Vec<Option<usize>>,
  pub use_idf:      Vec<bool>,
}

impl Default for ParamGrid {
  fn default() -> Self {
    Self {
      ngram_max:    vec![1, 2],
      max_df:       vec![0.75, 1.0],
      max_features: vec![None, Some(5000)],
      use_idf:      vec![true, false],
    }
  }
}

impl ParamGrid {
  /// Every candidate, each starting from `base` with the grid knobs replaced.
  pub fn candidates(&self, base: &PipelineParams) -> Vec<PipelineParams> {
    let mut out = Vec::new();
    for &ngram_max in &self.ngram_max {
      for &max_df in &self.max_df {
        for &max_features in &self.max_features {
          for &use_idf in &self.use_idf {
            let mut params = *base;
            params.vectorizer.ngram_max = ngram_max;
            params.vectorizer.max_df = max_df;
            params.vectorizer.max_features = max_features;
            params.vectorizer.use_idf = use_idf;
            out.push(params);
          }
        }
      }
    }
    out
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
  pub params: PipelineParams,
  pub score:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
  pub best:       PipelineParams,
  pub best_score: f64,
  /// Every candidate in enumeration order.
  pub scores:     Vec<CandidateScore>,
}

/// Score every candidate of `grid` with `folds`-fold cross-validation and pick
/// the best. Ties keep the earlier candidate.
pub fn grid_search(
  docs: &[&Document],
  labels: &[&CategoryFlags],
  n_categories: usize,
  base: &PipelineParams,
  grid: &ParamGrid,
  folds: usize,
) -> Result<SearchResult> {
  let candidates = grid.candidates(base);
  if candidates.is_empty() {
    return Err(Error::InvalidParams("parameter grid is empty".into()));
  }
  for candidate in &candidates {
    candidate.validate()?;
  }
  let splits = split::k_fold(docs.len(), folds)?;

  let scores: Vec<CandidateScore> = candidates
    .into_par_iter()
    .map(|params| {
      let score = cross_validate(docs, labels, n_categories, &params, &splits)?;
      tracing::debug!(vectorizer = ?params.vectorizer, score, "scored candidate");
      Ok(CandidateScore { params, score })
    })
    .collect::<Result<_>>()?;

  let mut best = &scores[0];
  for candidate in &scores[1..] {
    if candidate.score > best.score {
      best = candidate;
    }
  }

  tracing::info!(
    candidates = scores.len(),
    folds,
    best_score = best.score,
    ngram_max = best.params.vectorizer.ngram_max,
    max_df = best.params.vectorizer.max_df,
    max_features = ?best.params.vectorizer.max_features,
    use_idf = best.params.vectorizer.use_idf,
    "grid search finished"
  );

  Ok(SearchResult {
    best: best.params,
    best_score: best.score,
    scores,
  })
}

/// Mean validation subset accuracy over the folds.
fn cross_validate(
  docs: &[&Document],
  labels: &[&CategoryFlags],
  n_categories: usize,
  params: &PipelineParams,
  splits: &[(Vec<usize>, Vec<usize>)],
) -> Result<f64> {
  let mut total = 0.0;
  for (train, validation) in splits {
    let train_docs: Vec<&Document> = train.iter().map(|&i| docs[i]).collect();
    let train_labels: Vec<&CategoryFlags> = train.iter().map(|&i| labels[i]).collect();
    let pipeline = Pipeline::fit(&train_docs, &train_labels, n_categories, params)?;

    let truth: Vec<&CategoryFlags> = validation.iter().map(|&i| labels[i]).collect();
    let predicted: Vec<CategoryFlags> = validation
      .iter()
      .map(|&i| pipeline.predict_document(docs[i]))
      .collect();
    total += metrics::subset_accuracy(&truth, &predicted);
  }
  Ok(total / splits.len() as f64)
}
