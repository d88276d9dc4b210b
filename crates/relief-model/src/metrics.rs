//! Held-out evaluation: per-category precision/recall/F1 and overall
//! accuracy.

use std::fmt;

use relief_core::category::{CategoryFlags, CategorySet};
use serde::{Deserialize, Serialize};

/// Scores for one class (0 or 1) of one category. Undefined ratios are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
  pub precision: f64,
  pub recall:    f64,
  pub f1:        f64,
  pub support:   usize,
}

impl ClassMetrics {
  fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
      0.0
    } else {
      2.0 * precision * recall / (precision + recall)
    };
    Self {
      precision,
      recall,
      f1,
      support: tp + fn_,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
  pub name:     String,
  pub negative: ClassMetrics,
  pub positive: ClassMetrics,
  pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
  pub rows:             usize,
  pub categories:       Vec<CategoryReport>,
  /// Mean agreement over every (row, category) cell.
  pub overall_accuracy: f64,
  /// Fraction of rows whose whole flag vector was predicted exactly.
  pub subset_accuracy:  f64,
}

/// Compare predictions against the truth, row by row.
pub fn evaluate(
  categories: &CategorySet,
  truth: &[&CategoryFlags],
  predicted: &[CategoryFlags],
) -> EvaluationReport {
  debug_assert_eq!(truth.len(), predicted.len());
  let rows = truth.len();

  let mut reports = Vec::with_capacity(categories.len());
  let mut agreeing_cells = 0usize;
  for (c, name) in categories.iter().enumerate() {
    // [truth][prediction]
    let mut counts = [[0usize; 2]; 2];
    for (t, p) in truth.iter().zip(predicted) {
      let t = t.get(c).unwrap_or(false);
      let p = p.get(c).unwrap_or(false);
      counts[usize::from(t)][usize::from(p)] += 1;
    }
    let [[tn, fp], [fn_, tp]] = counts;
    agreeing_cells += tn + tp;

    reports.push(CategoryReport {
      name:     name.to_owned(),
      negative: ClassMetrics::from_counts(tn, fn_, fp),
      positive: ClassMetrics::from_counts(tp, fp, fn_),
      accuracy: if rows == 0 { 0.0 } else { (tn + tp) as f64 / rows as f64 },
    });
  }

  let cells = rows * categories.len();
  let exact = truth.iter().zip(predicted).filter(|(t, p)| **t == *p).count();
  EvaluationReport {
    rows,
    categories: reports,
    overall_accuracy: if cells == 0 { 0.0 } else { agreeing_cells as f64 / cells as f64 },
    subset_accuracy: if rows == 0 { 0.0 } else { exact as f64 / rows as f64 },
  }
}

/// Fraction of rows predicted exactly; the grid-search score.
pub fn subset_accuracy(truth: &[&CategoryFlags], predicted: &[CategoryFlags]) -> f64 {
  if truth.is_empty() {
    return 0.0;
  }
  let exact = truth.iter().zip(predicted).filter(|(t, p)| **t == *p).count();
  exact as f64 / truth.len() as f64
}

impl fmt::Display for EvaluationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in &self.categories {
      writeln!(f, "Category: {}", c.name)?;
      writeln!(f, "{:>12} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
      for (label, m) in [("0", &c.negative), ("1", &c.positive)] {
        writeln!(
          f,
          "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
          label, m.precision, m.recall, m.f1, m.support
        )?;
      }
      writeln!(f, "{:>12} {:>32.2} {:>10}", "accuracy", c.accuracy, self.rows)?;
      writeln!(f)?;
    }
    writeln!(f, "Overall accuracy: {:.4}", self.overall_accuracy)?;
    write!(f, "Subset accuracy:  {:.4}", self.subset_accuracy)
  }
}
