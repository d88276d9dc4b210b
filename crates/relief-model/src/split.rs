//! Seeded train/test splitting and k-fold partitioning over row indices.

use rand::{SeedableRng as _, rngs::StdRng, seq::SliceRandom as _};

use crate::{Error, Result};

/// Indices of the training and held-out rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
  pub train: Vec<usize>,
  pub test:  Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(test_size × n)` rows.
///
/// Both sides always get at least one row.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split> {
  if n < 2 {
    return Err(Error::NotEnoughRows { rows: n, needed: 2 });
  }
  if !(test_size > 0.0 && test_size < 1.0) {
    return Err(Error::InvalidParams(format!(
      "test_size must be in (0, 1), got {test_size}"
    )));
  }

  let mut indices: Vec<usize> = (0..n).collect();
  indices.shuffle(&mut StdRng::seed_from_u64(seed));

  let n_test = ((test_size * n as f64).ceil() as usize).clamp(1, n - 1);
  let train = indices.split_off(n_test);
  Ok(Split {
    train,
    test: indices,
  })
}

/// Partition `0..n` into `k` contiguous validation folds.
///
/// The first `n % k` folds get one extra row. Returns `(train, validation)`
/// position lists for each fold.
pub fn k_fold(n: usize, k: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
  if k < 2 || k > n {
    return Err(Error::InvalidParams(format!(
      "cannot make {k} folds from {n} rows"
    )));
  }

  let mut folds = Vec::with_capacity(k);
  let mut start = 0;
  for fold in 0..k {
    let size = n / k + usize::from(fold < n % k);
    let end = start + size;
    let validation: Vec<usize> = (start..end).collect();
    let train: Vec<usize> = (0..start).chain(end..n).collect();
    folds.push((train, validation));
    start = end;
  }
  Ok(folds)
}
