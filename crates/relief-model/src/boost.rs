//! Binary AdaBoost (discrete SAMME) over decision stumps.
//!
//! A stump thresholds one sparse feature. Because absent features are zero and
//! every stored value is positive, thresholds are either `0` (feature present)
//! or midpoints between consecutive distinct stored values.

use serde::{Deserialize, Serialize};

use crate::sparse::{FeatureColumns, SparseRow};

/// Weighted errors at or below this count as a perfect fit.
const PERFECT_FIT: f64 = 1e-12;

/// Boosting knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostParams {
  pub estimators:    usize,
  pub learning_rate: f64,
}

impl Default for BoostParams {
  fn default() -> Self {
    Self {
      estimators:    50,
      learning_rate: 1.0,
    }
  }
}

/// `feature > threshold` predicts `positive_above`, otherwise its negation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stump {
  pub feature:        u32,
  pub threshold:      f64,
  pub positive_above: bool,
}

impl Stump {
  pub fn predict(&self, row: &SparseRow) -> bool {
    (row.get(self.feature) > self.threshold) == self.positive_above
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedStump {
  pub stump:  Stump,
  pub weight: f64,
}

/// A fitted yes/no classifier for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinaryClassifier {
  /// The training labels (or the best stump) never disagreed; always answer
  /// `value`.
  Constant { value: bool },
  Boosted { stumps: Vec<WeightedStump> },
}

impl BinaryClassifier {
  pub fn predict(&self, row: &SparseRow) -> bool {
    match self {
      Self::Constant { value } => *value,
      Self::Boosted { stumps } => {
        let score: f64 = stumps
          .iter()
          .map(|ws| if ws.stump.predict(row) { ws.weight } else { -ws.weight })
          .sum();
        score > 0.0
      }
    }
  }

  /// Largest feature index referenced, if any.
  pub fn max_feature(&self) -> Option<u32> {
    match self {
      Self::Constant { .. } => None,
      Self::Boosted { stumps } => stumps.iter().map(|ws| ws.stump.feature).max(),
    }
  }
}

/// Fit one binary classifier on the columns of a feature matrix.
pub fn fit(columns: &FeatureColumns, labels: &[bool], params: &BoostParams) -> BinaryClassifier {
  let n = labels.len();
  debug_assert_eq!(n, columns.n_rows());

  let positives = labels.iter().filter(|y| **y).count();
  if positives == 0 || positives == n {
    return BinaryClassifier::Constant { value: positives == n && n > 0 };
  }
  let majority = positives * 2 > n;

  let mut weights = vec![1.0 / n as f64; n];
  let mut stumps: Vec<WeightedStump> = Vec::with_capacity(params.estimators);

  for _ in 0..params.estimators {
    let Some((stump, error)) = best_stump(columns, labels, &weights) else {
      break;
    };

    if error <= PERFECT_FIT {
      stumps.push(WeightedStump { stump, weight: 1.0 });
      break;
    }
    if error >= 0.5 {
      break;
    }

    let alpha = params.learning_rate * ((1.0 - error) / error).ln();
    let predictions = stump_predictions(columns, &stump);
    let boost = alpha.exp();
    for ((w, y), p) in weights.iter_mut().zip(labels).zip(&predictions) {
      if p != y {
        *w *= boost;
      }
    }
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
      *w /= total;
    }

    stumps.push(WeightedStump { stump, weight: alpha });
  }

  if stumps.is_empty() {
    BinaryClassifier::Constant { value: majority }
  } else {
    BinaryClassifier::Boosted { stumps }
  }
}

/// The stump with the lowest weighted error, ties going to the lowest feature
/// then the lowest threshold.
fn best_stump(
  columns: &FeatureColumns,
  labels: &[bool],
  weights: &[f64],
) -> Option<(Stump, f64)> {
  let total: f64 = weights.iter().sum();
  // Error of predicting "negative" everywhere.
  let base: f64 = weights.iter().zip(labels).filter(|(_, y)| **y).map(|(w, _)| w).sum();

  let mut best: Option<(Stump, f64)> = None;
  let mut consider = |stump: Stump, error: f64| {
    if best.as_ref().is_none_or(|(_, e)| error < *e) {
      best = Some((stump, error));
    }
  };

  for feature in 0..columns.n_features() {
    let column = columns.column(feature);
    if column.is_empty() {
      continue;
    }

    // Moving a row from "predict negative" to "predict positive" changes the
    // error by -w for a positive label and +w for a negative one.
    let delta = |row: u32| {
      let i = row as usize;
      if labels[i] { -weights[i] } else { weights[i] }
    };
    let all_delta: f64 = column.iter().map(|(_, row)| delta(*row)).sum();

    let mut below = 0.0;
    for m in 0..column.len() {
      if m > 0 && column[m - 1].0 == column[m].0 {
        below += delta(column[m - 1].1);
        continue;
      }
      let threshold = if m == 0 {
        0.0
      } else {
        (column[m - 1].0 + column[m].0) / 2.0
      };
      if m > 0 {
        below += delta(column[m - 1].1);
      }

      let error_above = (base + all_delta - below).max(0.0);
      let error_below = (total - error_above).max(0.0);
      consider(
        Stump {
          feature: feature as u32,
          threshold,
          positive_above: true,
        },
        error_above,
      );
      consider(
        Stump {
          feature: feature as u32,
          threshold,
          positive_above: false,
        },
        error_below,
      );
    }
  }

  best.map(|(stump, error)| (stump, error / total))
}

/// Predictions of `stump` on every row the columns were built from.
fn stump_predictions(columns: &FeatureColumns, stump: &Stump) -> Vec<bool> {
  let mut above = vec![false; columns.n_rows()];
  for &(value, row) in columns.column(stump.feature as usize) {
    if value > stump.threshold {
      above[row as usize] = true;
    }
  }
  above.into_iter().map(|a| a == stump.positive_above).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rows(values: &[&[(u32, f64)]]) -> Vec<SparseRow> {
    values.iter().map(|r| SparseRow::from_sorted(r.to_vec())).collect()
  }

  #[test]
  fn single_class_becomes_constant() {
    let r = rows(&[&[(0, 1.0)], &[]]);
    let cols = FeatureColumns::new(&r, 1);
    assert_eq!(
      fit(&cols, &[false, false], &BoostParams::default()),
      BinaryClassifier::Constant { value: false }
    );
    assert_eq!(
      fit(&cols, &[true, true], &BoostParams::default()),
      BinaryClassifier::Constant { value: true }
    );
  }

  #[test]
  fn separable_feature_gives_a_perfect_stump() {
    // Feature 1 marks the positive rows exactly.
    let r = rows(&[
      &[(0, 0.5), (1, 0.7)],
      &[(0, 0.5)],
      &[(1, 0.2)],
      &[(0, 0.9)],
    ]);
    let labels = [true, false, true, false];
    let cols = FeatureColumns::new(&r, 2);
    let clf = fit(&cols, &labels, &BoostParams::default());

    let BinaryClassifier::Boosted { stumps } = &clf else {
      panic!("expected boosted classifier, got {clf:?}");
    };
    assert_eq!(stumps.len(), 1);
    assert_eq!(stumps[0].stump.feature, 1);
    assert_eq!(stumps[0].stump.threshold, 0.0);
    assert!(stumps[0].stump.positive_above);

    for (row, y) in r.iter().zip(labels) {
      assert_eq!(clf.predict(row), y);
    }
  }

  #[test]
  fn inverted_polarity_is_found() {
    // Positive exactly when feature 0 is absent.
    let r = rows(&[&[(0, 1.0)], &[], &[(0, 1.0)], &[]]);
    let labels = [false, true, false, true];
    let clf = fit(&FeatureColumns::new(&r, 1), &labels, &BoostParams::default());
    for (row, y) in r.iter().zip(labels) {
      assert_eq!(clf.predict(row), y);
    }
  }

  #[test]
  fn thresholds_split_on_value() {
    // Positive when feature 0 is large.
    let r = rows(&[&[(0, 0.1)], &[(0, 0.2)], &[(0, 0.8)], &[(0, 0.9)]]);
    let labels = [false, false, true, true];
    let clf = fit(&FeatureColumns::new(&r, 1), &labels, &BoostParams::default());
    let BinaryClassifier::Boosted { stumps } = &clf else {
      panic!("expected boosted classifier");
    };
    assert!((stumps[0].stump.threshold - 0.5).abs() < 1e-12);
    assert!(clf.predict(&SparseRow::from_sorted(vec![(0, 0.7)])));
    assert!(!clf.predict(&SparseRow::from_sorted(vec![(0, 0.3)])));
  }

  #[test]
  fn boosting_combines_several_stumps() {
    // Positive iff feature 0 or feature 1 is present; feature 2 marks a
    // negative. No single stump separates this.
    let r = rows(&[
      &[(0, 1.0)],
      &[(1, 1.0)],
      &[],
      &[],
      &[(0, 1.0), (1, 1.0)],
      &[(2, 1.0)],
    ]);
    let labels = [true, true, false, false, true, false];
    let params = BoostParams {
      estimators: 3,
      ..BoostParams::default()
    };
    let clf = fit(&FeatureColumns::new(&r, 3), &labels, &params);

    let BinaryClassifier::Boosted { stumps } = &clf else {
      panic!("expected boosted classifier, got {clf:?}");
    };
    assert_eq!(stumps.len(), 3);
    let features: Vec<u32> = stumps.iter().map(|ws| ws.stump.feature).collect();
    assert_eq!(features, vec![0, 1, 2]);
    for (row, y) in r.iter().zip(labels) {
      assert_eq!(clf.predict(row), y);
    }
  }

  #[test]
  fn fitting_is_deterministic() {
    let r = rows(&[
      &[(0, 0.3), (2, 0.4)],
      &[(1, 0.6)],
      &[(0, 0.3), (1, 0.1)],
      &[(2, 0.9)],
      &[(0, 0.7)],
    ]);
    let labels = [true, false, true, false, true];
    let cols = FeatureColumns::new(&r, 3);
    let a = fit(&cols, &labels, &BoostParams::default());
    let b = fit(&cols, &labels, &BoostParams::default());
    assert_eq!(a, b);
  }
}
