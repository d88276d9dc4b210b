//! Feature extraction, multi-label classification and model persistence for
//! the relief triage pipeline.
//!
//! Training goes through [`train::train`], which produces a
//! [`artifact::ModelArtifact`]. Serving loads one with
//! [`artifact::Classifier::load`].

pub mod artifact;
pub mod boost;
pub mod error;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod sparse;
pub mod split;
pub mod tokenize;
pub mod train;
pub mod vectorize;

pub use artifact::{Classifier, ModelArtifact};
pub use error::{Error, Result};
pub use metrics::EvaluationReport;
pub use pipeline::{Pipeline, PipelineParams};
pub use search::{ParamGrid, SearchResult};
pub use train::{TrainConfig, TrainOutcome, train};
