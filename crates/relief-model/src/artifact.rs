//! The persisted model: a fitted pipeline plus the metadata needed to serve
//! and audit it.

use std::{
  fs,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use relief_core::{category::CategorySet, prediction::Prediction};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
  Error, Result,
  metrics::EvaluationReport,
  pipeline::{Pipeline, PipelineParams},
};

// ─── Artifact ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
  pub run_id:     Uuid,
  pub trained_at: DateTime<Utc>,
  pub categories: CategorySet,
  /// The parameters the pipeline was finally fitted with.
  pub params:     PipelineParams,
  pub seed:       u64,
  /// Held-out evaluation, when the run kept a test split.
  pub evaluation: Option<EvaluationReport>,
  pub pipeline:   Pipeline,
}

impl ModelArtifact {
  /// Check that the pipeline is internally consistent and answers for every
  /// category.
  pub fn validate(&self) -> Result<()> {
    if self.pipeline.n_categories() != self.categories.len() {
      return Err(Error::InvalidArtifact(format!(
        "{} classifiers for {} categories",
        self.pipeline.n_categories(),
        self.categories.len()
      )));
    }
    self.pipeline.validate()
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec(self)?) }

  /// Write the artifact next to `path` and rename it into place. Returns the
  /// fingerprint of the written bytes.
  pub fn save(&self, path: &Path) -> Result<String> {
    let bytes = self.to_bytes()?;
    let io_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| Error::Io { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, &bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))?;

    let fingerprint = fingerprint(&bytes);
    tracing::info!(path = %path.display(), %fingerprint, bytes = bytes.len(), "saved model");
    Ok(fingerprint)
  }

  /// Read and validate an artifact, returning it with its fingerprint.
  pub fn load(path: &Path) -> Result<(Self, String)> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let artifact: Self = serde_json::from_slice(&bytes)?;
    artifact.validate()?;
    Ok((artifact, fingerprint(&bytes)))
  }
}

/// Hex SHA-256 of serialized artifact bytes.
pub fn fingerprint(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

fn tmp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".tmp");
  path.with_file_name(name)
}

// ─── Serving handle ──────────────────────────────────────────────────────────

/// A loaded artifact ready to answer queries.
#[derive(Debug, Clone)]
pub struct Classifier {
  artifact:    ModelArtifact,
  fingerprint: String,
}

impl Classifier {
  pub fn load(path: &Path) -> Result<Self> {
    let (artifact, fingerprint) = ModelArtifact::load(path)?;
    tracing::info!(
      path = %path.display(),
      run_id = %artifact.run_id,
      categories = artifact.categories.len(),
      %fingerprint,
      "loaded model"
    );
    Ok(Self {
      artifact,
      fingerprint,
    })
  }

  /// Wrap an in-memory artifact, fingerprinting its serialized form.
  pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
    artifact.validate()?;
    let fingerprint = fingerprint(&artifact.to_bytes()?);
    Ok(Self {
      artifact,
      fingerprint,
    })
  }

  /// Classify one message. Blank text flags nothing.
  pub fn predict(&self, text: &str) -> Prediction {
    let categories = self.artifact.categories.clone();
    if text.trim().is_empty() {
      return Prediction::empty(categories);
    }
    Prediction {
      categories,
      flags: self.artifact.pipeline.predict(text),
    }
  }

  pub fn categories(&self) -> &CategorySet { &self.artifact.categories }

  pub fn fingerprint(&self) -> &str { &self.fingerprint }
}
