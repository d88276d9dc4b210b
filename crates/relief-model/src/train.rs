//! One training run: split, optional grid search, final fit, held-out
//! evaluation and artifact assembly.

use chrono::Utc;
use rayon::prelude::*;
use relief_core::{category::CategoryFlags, message::Dataset};
use uuid::Uuid;

use crate::{
  Error, Result,
  artifact::ModelArtifact,
  features::Document,
  metrics,
  pipeline::{Pipeline, PipelineParams},
  search::{self, ParamGrid, SearchResult},
  split,
};

/// Knobs of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
  pub seed:        u64,
  /// Fraction of rows held out for evaluation.
  pub test_size:   f64,
  pub cv_folds:    usize,
  pub grid_search: bool,
  /// Used as-is without grid search, otherwise as the base of every
  /// candidate.
  pub params:      PipelineParams,
  pub grid:        ParamGrid,
}

impl Default for TrainConfig {
  fn default() -> Self {
    Self {
      seed:        42,
      test_size:   0.2,
      cv_folds:    3,
      grid_search: true,
      params:      PipelineParams::default(),
      grid:        ParamGrid::default(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct TrainOutcome {
  pub artifact: ModelArtifact,
  /// Present when grid search ran.
  pub search:   Option<SearchResult>,
}

/// Train a model on `dataset`. Deterministic for a given dataset and seed,
/// apart from the run id and timestamp.
pub fn train(dataset: &Dataset, config: &TrainConfig) -> Result<TrainOutcome> {
  config.params.validate()?;
  if config.grid_search && config.cv_folds < 2 {
    return Err(Error::InvalidParams(format!(
      "cv_folds must be at least 2, got {}",
      config.cv_folds
    )));
  }

  let split = split::train_test_split(dataset.len(), config.test_size, config.seed)?;
  tracing::info!(
    rows = dataset.len(),
    train = split.train.len(),
    test = split.test.len(),
    seed = config.seed,
    "split dataset"
  );

  let docs: Vec<Document> = dataset
    .records
    .par_iter()
    .map(|r| Document::new(&r.message))
    .collect();
  let labels: Vec<&CategoryFlags> = dataset.records.iter().map(|r| &r.categories).collect();
  let n_categories = dataset.categories.len();

  let train_docs: Vec<&Document> = split.train.iter().map(|&i| &docs[i]).collect();
  let train_labels: Vec<&CategoryFlags> = split.train.iter().map(|&i| labels[i]).collect();

  let search = if config.grid_search {
    let folds = config.cv_folds.min(train_docs.len());
    if folds < 2 {
      tracing::warn!(
        train_rows = train_docs.len(),
        "too few training rows for cross-validation, skipping grid search"
      );
      None
    } else {
      Some(search::grid_search(
        &train_docs,
        &train_labels,
        n_categories,
        &config.params,
        &config.grid,
        folds,
      )?)
    }
  } else {
    None
  };
  let params = search.as_ref().map_or(config.params, |s| s.best);

  let pipeline = Pipeline::fit(&train_docs, &train_labels, n_categories, &params)?;
  for (name, clf) in dataset.categories.iter().zip(pipeline.classifiers()) {
    if let crate::boost::BinaryClassifier::Constant { value } = clf {
      tracing::warn!(category = name, value, "category has a single class in training data");
    }
  }

  let truth: Vec<&CategoryFlags> = split.test.iter().map(|&i| labels[i]).collect();
  let predicted: Vec<CategoryFlags> = split
    .test
    .iter()
    .map(|&i| pipeline.predict_document(&docs[i]))
    .collect();
  let evaluation = metrics::evaluate(&dataset.categories, &truth, &predicted);
  tracing::info!(
    test_rows = evaluation.rows,
    overall_accuracy = evaluation.overall_accuracy,
    subset_accuracy = evaluation.subset_accuracy,
    "evaluated model"
  );

  let artifact = ModelArtifact {
    run_id: Uuid::new_v4(),
    trained_at: Utc::now(),
    categories: dataset.categories.clone(),
    params,
    seed: config.seed,
    evaluation: Some(evaluation),
    pipeline,
  };
  artifact.validate()?;
  Ok(TrainOutcome { artifact, search })
}
