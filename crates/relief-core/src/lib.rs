//! Core types and trait definitions for the relief message-triage pipeline.
//!
//! This crate is free of database, CSV and HTTP dependencies. The ingestion,
//! training and serving crates all depend on it.

// Native `async fn` in traits; the store trait spells out `Send` bounds itself.
#![allow(async_fn_in_trait)]

pub mod category;
pub mod error;
pub mod message;
pub mod prediction;
pub mod store;

pub use error::{Error, Result};
