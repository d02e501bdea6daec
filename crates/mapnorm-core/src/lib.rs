//! Mapnorm Core Types and Passes
//!
//! This crate provides the document model and the normalization passes used
//! to prepare vector floor plans for an indoor-navigation front end. It
//! includes:
//!
//! - **Document**: An owned markup tree with ordered attributes ([`document`] module)
//! - **Markers**: Relabeling of legacy markers into `data-type` ([`markers`] module)
//! - **Coordinates**: Reference-based rescaling of all geometry ([`coords`] module)
//! - **Root maps**: Linking transition views to buildings ([`buildings`] module)
//! - **Transforms**: The `transform` attribute parser ([`transform`] module)
//!
//! None of the passes touch the filesystem; reading and writing markup lives
//! in the `mapnorm` crate.

pub mod buildings;
pub mod coords;
pub mod document;
pub mod geometry;
pub mod markers;
pub mod transform;
pub mod vocabulary;

mod error;

pub use error::CoreError;
