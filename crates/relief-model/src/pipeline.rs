//! The full text → category-flags pipeline: features, vectorizer and one
//! boosted classifier per category.

use rayon::prelude::*;
use relief_core::category::CategoryFlags;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  boost::{self, BinaryClassifier, BoostParams},
  features::Document,
  sparse::{FeatureColumns, SparseRow},
  vectorize::{TfidfVectorizer, VectorizerParams},
};

/// Every tunable knob of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineParams {
  pub vectorizer:    VectorizerParams,
  /// Append the starting-verb flag as an extra feature column.
  pub starting_verb: bool,
  pub boost:         BoostParams,
}

impl Default for PipelineParams {
  fn default() -> Self {
    Self {
      vectorizer:    VectorizerParams::default(),
      starting_verb: true,
      boost:         BoostParams::default(),
    }
  }
}

impl PipelineParams {
  pub fn validate(&self) -> Result<()> {
    self.vectorizer.validate()?;
    if self.boost.estimators == 0 {
      return Err(Error::InvalidParams("estimators must be positive".into()));
    }
    if !(self.boost.learning_rate > 0.0) {
      return Err(Error::InvalidParams(format!(
        "learning_rate must be positive, got {}",
        self.boost.learning_rate
      )));
    }
    Ok(())
  }
}

/// A fitted multi-label pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
  vectorizer:    TfidfVectorizer,
  starting_verb: bool,
  classifiers:   Vec<BinaryClassifier>,
}

impl Pipeline {
  /// Fit on `docs` with one label vector per document.
  ///
  /// Categories are fitted in parallel; the result is in category order, so
  /// the outcome does not depend on scheduling.
  pub fn fit(
    docs: &[&Document],
    labels: &[&CategoryFlags],
    n_categories: usize,
    params: &PipelineParams,
  ) -> Result<Self> {
    params.validate()?;
    if docs.len() != labels.len() {
      return Err(Error::InvalidParams(format!(
        "{} documents but {} label rows",
        docs.len(),
        labels.len()
      )));
    }

    let tokens: Vec<&[String]> = docs.iter().map(|d| d.tokens.as_slice()).collect();
    let vectorizer = TfidfVectorizer::fit(params.vectorizer, &tokens)?;

    let mut pipeline = Self {
      vectorizer,
      starting_verb: params.starting_verb,
      classifiers: Vec::new(),
    };
    let rows: Vec<SparseRow> = docs.iter().map(|d| pipeline.features(d)).collect();
    let columns = FeatureColumns::new(&rows, pipeline.n_features());

    pipeline.classifiers = (0..n_categories)
      .into_par_iter()
      .map(|c| {
        let y: Vec<bool> = labels.iter().map(|f| f.get(c).unwrap_or(false)).collect();
        boost::fit(&columns, &y, &params.boost)
      })
      .collect();

    let constant = pipeline
      .classifiers
      .iter()
      .filter(|c| matches!(c, BinaryClassifier::Constant { .. }))
      .count();
    tracing::debug!(
      documents = docs.len(),
      features = pipeline.n_features(),
      categories = n_categories,
      constant,
      "fitted pipeline"
    );
    Ok(pipeline)
  }

  pub fn n_features(&self) -> usize {
    self.vectorizer.len() + usize::from(self.starting_verb)
  }

  pub fn n_categories(&self) -> usize { self.classifiers.len() }

  pub fn vectorizer(&self) -> &TfidfVectorizer { &self.vectorizer }

  pub fn classifiers(&self) -> &[BinaryClassifier] { &self.classifiers }

  /// Feature row for a document: TF-IDF columns, then the starting-verb flag.
  pub fn features(&self, doc: &Document) -> SparseRow {
    let mut row = self.vectorizer.transform(&doc.tokens);
    if self.starting_verb && doc.starts_with_verb {
      row.push(self.vectorizer.len() as u32, 1.0);
    }
    row
  }

  pub fn predict_document(&self, doc: &Document) -> CategoryFlags {
    let row = self.features(doc);
    CategoryFlags::new(self.classifiers.iter().map(|c| c.predict(&row)).collect())
  }

  pub fn predict(&self, text: &str) -> CategoryFlags {
    self.predict_document(&Document::new(text))
  }

  /// Check internal consistency after deserialization.
  pub fn validate(&self) -> Result<()> {
    self.vectorizer.validate()?;
    let n_features = self.n_features() as u32;
    if let Some(max) = self.classifiers.iter().filter_map(BinaryClassifier::max_feature).max()
      && max >= n_features
    {
      return Err(Error::InvalidArtifact(format!(
        "classifier uses feature {max} but only {n_features} exist"
      )));
    }
    Ok(())
  }
}
