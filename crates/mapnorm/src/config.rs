//! Configuration types for map normalization.
//!
//! This module provides configuration structures that control how floor
//! plans are normalized and previewed. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`MarkerConfig`] - The recognized marker [`Vocabulary`].
//! - [`GeometryConfig`] - Target unit length and [`ViewportPolicy`].
//! - [`PreviewConfig`] - Optional template and stylesheet for the preview page.
//!
//! # Example
//!
//! ```
//! # use mapnorm::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.geometry().unit(), 1.0);
//! assert!(config.markers().vocabulary().contains("area"));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mapnorm_core::{geometry::ViewportPolicy, vocabulary::Vocabulary};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Marker configuration section.
    #[serde(default)]
    markers: MarkerConfig,

    /// Geometry configuration section.
    #[serde(default)]
    geometry: GeometryConfig,

    /// Preview configuration section.
    #[serde(default)]
    preview: PreviewConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(markers: MarkerConfig, geometry: GeometryConfig, preview: PreviewConfig) -> Self {
        Self {
            markers,
            geometry,
            preview,
        }
    }

    /// Returns the marker configuration.
    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    /// Returns the geometry configuration.
    pub fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    /// Returns the preview configuration.
    pub fn preview(&self) -> &PreviewConfig {
        &self.preview
    }
}

/// Marker recognition settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkerConfig {
    /// Category names recognized in `id` and `data-name` attributes.
    #[serde(default)]
    vocabulary: Vocabulary,
}

impl MarkerConfig {
    /// Creates a marker configuration with the given vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Returns the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

/// Coordinate normalization settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeometryConfig {
    /// Output length of one reference segment.
    #[serde(default = "default_unit")]
    unit: f64,

    /// How the root `viewBox` is rewritten.
    #[serde(default)]
    viewport: ViewportPolicy,
}

fn default_unit() -> f64 {
    1.0
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            viewport: ViewportPolicy::default(),
        }
    }
}

impl GeometryConfig {
    /// Creates a geometry configuration.
    pub fn new(unit: f64, viewport: ViewportPolicy) -> Self {
        Self { unit, viewport }
    }

    /// Returns the target unit length.
    pub fn unit(&self) -> f64 {
        self.unit
    }

    /// Returns the viewport policy.
    pub fn viewport(&self) -> ViewportPolicy {
        self.viewport
    }
}

/// Preview page settings.
///
/// Both paths are optional; the built-in template and stylesheet are used
/// when they are not set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewConfig {
    /// HTML template the map is inserted into.
    #[serde(default)]
    template: Option<PathBuf>,

    /// Stylesheet copied next to the page as `style.css`.
    #[serde(default)]
    stylesheet: Option<PathBuf>,
}

impl PreviewConfig {
    /// Creates a preview configuration.
    pub fn new(template: Option<PathBuf>, stylesheet: Option<PathBuf>) -> Self {
        Self {
            template,
            stylesheet,
        }
    }

    /// Returns the configured template path.
    pub fn template(&self) -> Option<&Path> {
        self.template.as_deref()
    }

    /// Returns the configured stylesheet path.
    pub fn stylesheet(&self) -> Option<&Path> {
        self.stylesheet.as_deref()
    }
}
