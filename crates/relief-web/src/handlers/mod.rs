//! Route handlers.

pub mod classify;
pub mod go;
pub mod index;
