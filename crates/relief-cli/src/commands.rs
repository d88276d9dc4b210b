//! The three pipeline stages as callable commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use relief_core::{prediction::Prediction, store::MessageStore as _};
use relief_etl::CleanReport;
use relief_model::{Classifier, TrainConfig, TrainOutcome};
use relief_store_sqlite::SqliteStore;

// ─── process-data ─────────────────────────────────────────────────────────────

/// Load both CSV files, clean them and replace the table in `database`.
pub async fn process_data(
  messages: PathBuf,
  categories: PathBuf,
  database: &Path,
  table: &str,
) -> Result<CleanReport> {
  let (dataset, report) =
    tokio::task::spawn_blocking(move || relief_etl::run(&messages, &categories))
      .await
      .context("cleaning task panicked")?
      .context("failed to load and clean input files")?;

  let store = SqliteStore::open(database, table)
    .await
    .with_context(|| format!("failed to open database {}", database.display()))?;
  let written = store
    .replace_dataset(dataset)
    .await
    .with_context(|| format!("failed to write table {table:?}"))?;

  tracing::info!(rows = written, database = %database.display(), table, "saved cleaned data");
  Ok(report)
}

// ─── train-classifier ─────────────────────────────────────────────────────────

/// Load the table, train, and save the artifact. Returns the outcome and the
/// artifact fingerprint.
pub async fn train_classifier(
  database: &Path,
  table: &str,
  model: &Path,
  config: TrainConfig,
) -> Result<(TrainOutcome, String)> {
  let store = SqliteStore::open_existing(database, table)
    .await
    .with_context(|| format!("failed to open database {}", database.display()))?;
  let dataset = store
    .load_dataset()
    .await
    .with_context(|| format!("failed to load table {table:?}"))?;
  tracing::info!(
    rows = dataset.len(),
    categories = dataset.categories.len(),
    "loaded training data"
  );

  let model = model.to_path_buf();
  tokio::task::spawn_blocking(move || -> Result<(TrainOutcome, String)> {
    let outcome = relief_model::train(&dataset, &config).context("training failed")?;
    let fingerprint = outcome
      .artifact
      .save(&model)
      .with_context(|| format!("failed to save model to {}", model.display()))?;
    Ok((outcome, fingerprint))
  })
  .await
  .context("training task panicked")?
}

// ─── classify ─────────────────────────────────────────────────────────────────

/// Classify one message with a saved artifact.
pub async fn classify(model: PathBuf, text: String) -> Result<Prediction> {
  tokio::task::spawn_blocking(move || -> Result<Prediction> {
    let classifier = Classifier::load(&model)
      .with_context(|| format!("failed to load model from {}", model.display()))?;
    Ok(classifier.predict(&text))
  })
  .await
  .context("classification task panicked")?
}

#[cfg(test)]
mod tests {
  use std::fs;

  use relief_core::store::MessageStore as _;
  use relief_model::EvaluationReport;

  use super::*;

  const MESSAGES: &str = "\
id,message,original,genre
1,We need water please,,direct
2,No drinking water here,,direct
3,Water is finished in the camp,,social
4,Send water to Jacmel,,news
5,The bridge collapsed,,news
6,Houses collapsed after the quake,,direct
7,Collapsed school in Leogane,,news
8,Thanks for the information,,social
9,Radio is back on,,social
10,The market opened,,direct
10,The market opened,,direct
11,,,direct
";

  const CATEGORIES: &str = "\
id,categories
1,related-1;water-1;infrastructure-0
2,related-1;water-1;infrastructure-0
3,related-1;water-1;infrastructure-0
4,related-1;water-1;infrastructure-0
5,related-1;water-0;infrastructure-1
6,related-2;water-0;infrastructure-1
7,related-1;water-0;infrastructure-1
8,related-0;water-0;infrastructure-0
9,related-0;water-0;infrastructure-0
10,related-0;water-0;infrastructure-0
11,related-0;water-0;infrastructure-0
";

  fn inputs(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
    let messages = dir.path().join("messages.csv");
    let categories = dir.path().join("categories.csv");
    fs::write(&messages, MESSAGES).unwrap();
    fs::write(&categories, CATEGORIES).unwrap();
    (messages, categories)
  }

  #[tokio::test]
  async fn stages_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (messages, categories) = inputs(&dir);
    let database = dir.path().join("DisasterResponse.db");
    let model = dir.path().join("classifier.json");

    let report = process_data(messages, categories, &database, "messages").await.unwrap();
    assert_eq!(report.output_rows, 10);
    assert!(report.output_rows <= report.merged_rows);

    let config = TrainConfig {
      grid_search: false,
      ..TrainConfig::default()
    };
    let (outcome, fingerprint) =
      train_classifier(&database, "messages", &model, config).await.unwrap();
    assert!(model.exists());
    assert_eq!(fingerprint.len(), 64);
    let evaluation: &EvaluationReport = outcome.artifact.evaluation.as_ref().unwrap();
    assert_eq!(evaluation.categories.len(), 3);

    let prediction = classify(model.clone(), String::new()).await.unwrap();
    assert!(prediction.flagged().is_empty());
    assert_eq!(prediction.flags.len(), 3);
  }

  #[tokio::test]
  async fn rerunning_ingestion_replaces_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let (messages, categories) = inputs(&dir);
    let database = dir.path().join("relief.db");

    process_data(messages.clone(), categories.clone(), &database, "messages").await.unwrap();
    let first = SqliteStore::open(&database, "messages").await.unwrap().digest().await.unwrap();
    process_data(messages, categories, &database, "messages").await.unwrap();
    let store = SqliteStore::open(&database, "messages").await.unwrap();
    assert_eq!(store.digest().await.unwrap(), first);
    assert_eq!(store.load_dataset().await.unwrap().len(), 10);
  }

  #[tokio::test]
  async fn missing_inputs_fail_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_data(
      dir.path().join("nope.csv"),
      dir.path().join("nope2.csv"),
      &dir.path().join("out.db"),
      "messages",
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("failed to load and clean input files"));
  }

  #[tokio::test]
  async fn training_leaves_a_mistyped_database_uncreated() {
    let dir = tempfile::tempdir().unwrap();
    let database = dir.path().join("DisasterRespnse.db");
    let model = dir.path().join("classifier.json");

    let err = train_classifier(&database, "messages", &model, TrainConfig::default())
      .await
      .unwrap_err();
    assert!(format!("{err:#}").contains("failed to open database"), "{err:#}");
    assert!(!database.exists());
    assert!(!model.exists());
  }

  #[tokio::test]
  async fn classify_rejects_a_missing_model() {
    let dir = tempfile::tempdir().unwrap();
    let err = classify(dir.path().join("missing.json"), "water".into()).await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to load model"));
  }
}
