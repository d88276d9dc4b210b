//! `relief`: batch entry point for the disaster-response pipeline.
//!
//! # Usage
//!
//! ```text
//! relief process-data disaster_messages.csv disaster_categories.csv DisasterResponse.db
//! relief train-classifier DisasterResponse.db models/classifier.json
//! relief classify models/classifier.json "We need water and food"
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use relief_model::{TrainConfig, pipeline::PipelineParams};
use relief_store_sqlite::DEFAULT_TABLE;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "relief", version, about = "Disaster response message triage")]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Merge and clean the raw CSV files into a SQLite table.
  ProcessData {
    /// CSV with `id,message,original,genre` columns.
    messages:   PathBuf,
    /// CSV with `id,categories` columns.
    categories: PathBuf,
    /// SQLite database to write.
    database:   PathBuf,
    #[arg(long, default_value = DEFAULT_TABLE)]
    table:      String,
  },

  /// Train the multi-label classifier and save it as a JSON artifact.
  TrainClassifier {
    /// SQLite database written by `process-data`.
    database:       PathBuf,
    /// Where to write the model artifact.
    model:          PathBuf,
    #[arg(long, default_value = DEFAULT_TABLE)]
    table:          String,
    #[arg(long, default_value_t = 42)]
    seed:           u64,
    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_size:      f64,
    /// Cross-validation folds used by the grid search.
    #[arg(long, default_value_t = 3)]
    cv_folds:       usize,
    /// Fit the default parameters directly instead of searching.
    #[arg(long)]
    no_grid_search: bool,
    /// Boosting rounds per category.
    #[arg(long, default_value_t = 50)]
    estimators:     usize,
  },

  /// Print the categories a saved model assigns to a message.
  Classify {
    model: PathBuf,
    text:  String,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  match args.command {
    Command::ProcessData {
      messages,
      categories,
      database,
      table,
    } => {
      let report = commands::process_data(messages, categories, &database, &table).await?;
      println!(
        "Saved {} rows to {} (table {table}); dropped {} duplicates and {} incomplete rows",
        report.output_rows,
        database.display(),
        report.duplicates_dropped,
        report.incomplete_dropped,
      );
    }

    Command::TrainClassifier {
      database,
      model,
      table,
      seed,
      test_size,
      cv_folds,
      no_grid_search,
      estimators,
    } => {
      let mut params = PipelineParams::default();
      params.boost.estimators = estimators;
      let config = TrainConfig {
        seed,
        test_size,
        cv_folds,
        grid_search: !no_grid_search,
        params,
        ..TrainConfig::default()
      };

      let (outcome, fingerprint) =
        commands::train_classifier(&database, &table, &model, config).await?;
      if let Some(search) = &outcome.search {
        println!(
          "Best parameters (cv subset accuracy {:.4}): {:?}",
          search.best_score, search.best.vectorizer
        );
      }
      if let Some(evaluation) = &outcome.artifact.evaluation {
        println!("{evaluation}");
      }
      println!("Saved model to {} (sha256 {fingerprint})", model.display());
    }

    Command::Classify { model, text } => {
      let prediction = commands::classify(model, text).await?;
      let flagged = prediction.flagged();
      if flagged.is_empty() {
        println!("(no categories)");
      } else {
        for name in flagged {
          println!("{name}");
        }
      }
    }
  }

  Ok(())
}
