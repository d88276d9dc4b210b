//! Ingestion stage: extract the message and category CSV files, join and
//! clean them, and hand back a [`Dataset`] ready for the store.
//!
//! ```rust,ignore
//! let (dataset, report) = relief_etl::run("messages.csv", "categories.csv")?;
//! store.replace_dataset(dataset).await?;
//! ```

pub mod clean;
pub mod error;
pub mod load;

use std::path::Path;

use relief_core::message::Dataset;

pub use clean::{CleanReport, clean, merge};
pub use error::{Error, Result};
pub use load::{CategoryRow, MessageRow, read_categories, read_messages};

/// Load both CSV files, merge them on `id` and clean the result.
pub fn run(
  messages_path: impl AsRef<Path>,
  categories_path: impl AsRef<Path>,
) -> Result<(Dataset, CleanReport)> {
  let messages = load::read_messages_file(messages_path.as_ref())?;
  let categories = load::read_categories_file(categories_path.as_ref())?;
  tracing::info!(
    messages = messages.len(),
    categories = categories.len(),
    "loaded input files"
  );

  let input_rows = messages.len();
  let merged = merge(messages, categories);
  let (dataset, mut report) = clean(merged)?;
  report.input_rows = input_rows;
  tracing::info!(
    input = report.input_rows,
    merged = report.merged_rows,
    duplicates = report.duplicates_dropped,
    incomplete = report.incomplete_dropped,
    rows = report.output_rows,
    categories = dataset.categories.len(),
    "cleaned message data"
  );
  Ok((dataset, report))
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
  }

  const MESSAGES: &str = "\
id,message,original,genre
2,Weather update - a cold front from Cuba,Un front froid,direct
7,Is the Hurricane over or is it not over,Cyclone nan fini osinon li pa fini,direct
8,Looking for someone but no name,Patnm,direct
8,Looking for someone but no name,Patnm,direct
9,,,direct
";

  const CATEGORIES: &str = "\
id,categories
2,related-1;request-0;offer-0
7,related-1;request-0;offer-0
8,related-1;request-0;offer-0
9,related-0;request-0;offer-0
";

  #[test]
  fn run_cleans_files_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let messages = write(&dir, "disaster_messages.csv", MESSAGES);
    let categories = write(&dir, "disaster_categories.csv", CATEGORIES);

    let (dataset, report) = run(&messages, &categories).unwrap();
    assert_eq!(dataset.categories.names(), ["related", "request", "offer"]);
    assert_eq!(report.merged_rows, 5);
    assert_eq!(report.input_rows, 5);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(report.incomplete_dropped, 1);
    assert_eq!(dataset.len(), 3);
  }

  #[test]
  fn run_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let messages = write(&dir, "m.csv", MESSAGES);
    let categories = write(&dir, "c.csv", CATEGORIES);

    let (first, _) = run(&messages, &categories).unwrap();
    let (second, _) = run(&messages, &categories).unwrap();
    assert_eq!(first, second);
  }
}
