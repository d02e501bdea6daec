//! Error types for mapnorm operations.
//!
//! This module provides the main error type [`MapError`] which wraps the
//! error conditions that can occur while normalizing a floor plan.

use std::{io, path::PathBuf};

use thiserror::Error;

use mapnorm_core::CoreError;

use crate::markup::MarkupError;

/// The main error type for mapnorm operations.
///
/// # Diagnostic Variants
///
/// The `Markup` variant keeps the source text next to the error so the byte
/// offset can be shown as a labeled snippet.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Markup { err: MarkupError, src: String },

    #[error("Transform error: {0}")]
    Transform(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MapError {
    /// Create a new `Markup` error with the associated source text.
    pub fn new_markup_error(err: MarkupError, src: impl Into<String>) -> Self {
        Self::Markup {
            err,
            src: src.into(),
        }
    }
}
