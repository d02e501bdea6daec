//! Mapnorm - normalization of annotated SVG floor plans.
//!
//! Reads a floor plan, relabels its semantic markers into `data-type`,
//! rescales all geometry by the embedded one-meter reference segment and
//! writes the result back, optionally with an HTML preview page.

pub mod config;
pub mod markup;
pub mod preview;

mod error;

pub use mapnorm_core::{
    CoreError, buildings, coords, document, geometry, markers, transform, vocabulary,
};

pub use error::MapError;

use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use mapnorm_core::{
    buildings::RootReport,
    coords::{Calibration, CoordinateTransformer, TransformReport},
    document::Document,
    markers::MarkerReport,
};

use config::AppConfig;
use preview::PreviewError;

/// Per-run options that are not part of the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessOptions {
    /// Reference length used instead of measuring the `meter` element.
    pub meter: Option<f64>,
    /// Target unit length; overrides the configured one.
    pub unit: Option<f64>,
    /// Run the root-map pass that links transition views to buildings.
    pub root: bool,
}

/// Combined result of the normalization passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessReport {
    pub markers: MarkerReport,
    pub coordinates: TransformReport,
    /// Present when the root-map pass ran.
    pub root: Option<RootReport>,
}

/// Builder for normalizing floor plans.
///
/// This provides an API for processing maps through parsing, normalization
/// and rendering stages.
///
/// # Examples
///
/// ```rust
/// use mapnorm::{MapProcessor, ProcessOptions, config::AppConfig};
///
/// let source = r#"<svg viewBox="0 0 100 100">
///     <line id="meter" x1="0" y1="0" x2="10" y2="0"/>
///     <rect id="area" x="10" y="20" width="5" height="5"/>
/// </svg>"#;
///
/// let processor = MapProcessor::new(AppConfig::default());
/// let output = processor
///     .process(source, &ProcessOptions::default())
///     .expect("Failed to process");
///
/// assert!(output.contains(r#"<rect x="1" y="2" width="0.5" height="0.5" data-type="area"/>"#));
/// assert!(!output.contains("meter"));
/// ```
#[derive(Debug, Default)]
pub struct MapProcessor {
    config: AppConfig,
}

impl MapProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Returns the processor configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse markup into a document.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Markup` for malformed markup.
    pub fn parse(&self, source: &str) -> Result<Document, MapError> {
        info!("Parsing map");

        let document =
            markup::parse(source).map_err(|err| MapError::new_markup_error(err, source))?;

        debug!(root = document.root().name(); "Map parsed successfully");
        Ok(document)
    }

    /// Run the normalization passes on `document`.
    ///
    /// Markers are normalized first, then coordinates; the root-map pass
    /// runs last when enabled in `options`.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Transform` when the scale ratio cannot be derived
    /// or the document has no `svg` element.
    pub fn normalize(
        &self,
        document: &mut Document,
        options: &ProcessOptions,
    ) -> Result<ProcessReport, MapError> {
        let markers = markers::normalize_markers(
            document,
            self.config.markers().vocabulary(),
        );
        info!(
            relabeled = markers.relabeled,
            areas = markers.areas;
            "Markers normalized"
        );

        let geometry = self.config.geometry();
        let calibration = Calibration::new(
            options.meter,
            options.unit.unwrap_or_else(|| geometry.unit()),
        );
        let transformer = CoordinateTransformer::new(calibration, geometry.viewport());
        let coordinates = transformer.transform(document)?;
        info!(
            ratio = coordinates.ratio,
            shapes = coordinates.shapes,
            transforms = coordinates.transforms;
            "Coordinates normalized"
        );

        let root = options.root.then(|| buildings::relabel_root(document));
        if let Some(report) = root {
            info!(linked = report.linked, moved = report.moved; "Root map relabeled");
        }

        trace!(document:?; "Normalized document");
        Ok(ProcessReport {
            markers,
            coordinates,
            root,
        })
    }

    /// Render a document to markup text.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Io` if the markup writer fails.
    pub fn render(&self, document: &Document) -> Result<String, MapError> {
        let output = markup::render(document)?;
        debug!(bytes = output.len(); "Map rendered");
        Ok(output)
    }

    /// Parse, normalize and render in one step.
    ///
    /// # Errors
    ///
    /// See [`MapProcessor::parse`], [`MapProcessor::normalize`] and
    /// [`MapProcessor::render`].
    pub fn process(&self, source: &str, options: &ProcessOptions) -> Result<String, MapError> {
        let mut document = self.parse(source)?;
        self.normalize(&mut document, options)?;
        self.render(&document)
    }

    /// Create the preview page for a normalized document written to
    /// `output`.
    ///
    /// # Errors
    ///
    /// Returns [`PreviewError`] on any failure; preview errors are kept
    /// apart from [`MapError`] because they never invalidate the output.
    pub fn create_preview(
        &self,
        document: &Document,
        output: &Path,
    ) -> Result<PathBuf, PreviewError> {
        let svg = document
            .viewport_path()
            .and_then(|path| document.get(&path))
            .unwrap_or_else(|| document.root());
        preview::create_preview(svg, output, self.config.preview())
    }
}
