//! The output of classifying one message.

use serde::Serialize;

use crate::category::{CategoryFlags, CategorySet};

/// Predicted flags for every category in a model's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
  pub categories: CategorySet,
  pub flags:      CategoryFlags,
}

/// One row of a rendered prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLabel<'a> {
  pub name:    &'a str,
  pub flagged: bool,
}

impl Prediction {
  /// A prediction with no category flagged.
  pub fn empty(categories: CategorySet) -> Self {
    let flags = CategoryFlags::none(categories.len());
    Self { categories, flags }
  }

  /// Names of the predicted categories; possibly empty.
  pub fn flagged(&self) -> Vec<&str> { self.flags.flagged(&self.categories) }

  /// Every category paired with its predicted flag, in vocabulary order.
  pub fn labels(&self) -> Vec<CategoryLabel<'_>> {
    self
      .categories
      .iter()
      .zip(self.flags.as_slice())
      .map(|(name, flagged)| CategoryLabel { name, flagged: *flagged })
      .collect()
  }
}
