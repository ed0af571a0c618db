//! Core types shared across the crate: the error taxonomy and result alias.

pub mod error;

pub use error::{RepoError, Result};
