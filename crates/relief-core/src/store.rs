//! The `MessageStore` trait.
//!
//! Implemented by storage backends (e.g. `relief-store-sqlite`). The training
//! stage and the web server depend on this abstraction, not on a concrete
//! backend.

use std::future::Future;

use crate::message::Dataset;

/// Abstraction over the durable store holding the cleaned message table.
///
/// The table is written once per ingestion run and replaced wholesale; there
/// are no partial updates.
pub trait MessageStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Replace the stored table with `dataset`. Returns the number of rows
  /// written. Either every row lands or none does.
  fn replace_dataset(
    &self,
    dataset: Dataset,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Load the whole table, rows in insertion order.
  fn load_dataset(
    &self,
  ) -> impl Future<Output = Result<Dataset, Self::Error>> + Send + '_;

  /// Number of rows flagged for each category, in vocabulary order.
  fn category_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<(String, u64)>, Self::Error>> + Send + '_;

  /// Number of rows per genre, ordered by genre.
  fn genre_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<(String, u64)>, Self::Error>> + Send + '_;

  /// Hex digest over the stored row set. Independent of row order, so two
  /// ingestion runs over identical inputs produce the same digest.
  fn digest(
    &self,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}
