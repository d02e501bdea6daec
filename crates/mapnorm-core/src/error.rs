//! Errors raised by the normalization core.

use thiserror::Error;

/// Errors that abort a normalization run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// No element identified as the reference measurement, and no
    /// override length was supplied.
    #[error("no reference measurement found: expected an element with id=\"meter\"")]
    MissingReference,

    /// The reference measurement exists but no usable length can be
    /// derived from it.
    #[error("invalid reference measurement: {0}")]
    InvalidReference(String),

    /// The target unit length is not a positive number.
    #[error("target unit length must be a positive number, got {0}")]
    InvalidUnit(f64),

    /// The document has no `svg` viewport element.
    #[error("document has no <svg> element")]
    MissingViewport,
}
