//! Sparse feature rows and their column-major view.

/// One row of the feature matrix: `(feature, value)` pairs sorted by feature.
/// Absent features are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
  entries: Vec<(u32, f64)>,
}

impl SparseRow {
  /// Build a row from pairs that are already sorted by feature and unique.
  pub fn from_sorted(entries: Vec<(u32, f64)>) -> Self {
    debug_assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
    Self { entries }
  }

  /// Append a feature past every existing one.
  pub fn push(&mut self, feature: u32, value: f64) {
    debug_assert!(self.entries.last().is_none_or(|(f, _)| *f < feature));
    self.entries.push((feature, value));
  }

  pub fn get(&self, feature: u32) -> f64 {
    self
      .entries
      .binary_search_by_key(&feature, |(f, _)| *f)
      .map_or(0.0, |i| self.entries[i].1)
  }

  pub fn entries(&self) -> &[(u32, f64)] { &self.entries }

  pub fn nnz(&self) -> usize { self.entries.len() }
}

/// Column-major copy of a set of rows. Each column lists its non-zero
/// `(value, row)` pairs in ascending value order, ties by row.
#[derive(Debug, Clone)]
pub struct FeatureColumns {
  columns: Vec<Vec<(f64, u32)>>,
  n_rows:  usize,
}

impl FeatureColumns {
  pub fn new(rows: &[SparseRow], n_features: usize) -> Self {
    let mut columns: Vec<Vec<(f64, u32)>> = vec![Vec::new(); n_features];
    for (row_idx, row) in rows.iter().enumerate() {
      for &(feature, value) in row.entries() {
        if value != 0.0 {
          columns[feature as usize].push((value, row_idx as u32));
        }
      }
    }
    for column in &mut columns {
      column.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    }
    Self {
      columns,
      n_rows: rows.len(),
    }
  }

  pub fn n_rows(&self) -> usize { self.n_rows }

  pub fn n_features(&self) -> usize { self.columns.len() }

  pub fn column(&self, feature: usize) -> &[(f64, u32)] { &self.columns[feature] }
}
