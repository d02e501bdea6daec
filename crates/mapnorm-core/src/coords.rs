//! Coordinate normalization.
//!
//! The [`CoordinateTransformer`] derives a scale ratio from the reference
//! measurement (the element with `id="meter"`), removes that element, and
//! rewrites every geometric attribute, every translation inside a
//! `transform` list and the root `viewBox` by the ratio.
//!
//! ```text
//! ratio = unit / L        L = |meter line|  (or the override length)
//! v'    = round(v * ratio * 100) / 100
//! ```

use log::{debug, info, warn};

use crate::{
    document::{Document, Element, ElementKind},
    error::CoreError,
    geometry::{Segment, ViewBox, ViewportPolicy, parse_number, scale_attribute, scale_points},
    transform::TransformChain,
    vocabulary::{ID, METER_ID},
};

const VIEW_BOX: &str = "viewBox";
const TRANSFORM: &str = "transform";
const POINTS: &str = "points";
const RECT_ATTRIBUTES: [&str; 4] = ["x", "y", "width", "height"];
const LINE_ATTRIBUTES: [&str; 4] = ["x1", "y1", "x2", "y2"];

/// How the scale ratio is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    meter: Option<f64>,
    unit: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            meter: None,
            unit: 1.0,
        }
    }
}

impl Calibration {
    /// Creates a calibration from an optional reference length override and
    /// the target unit length.
    pub fn new(meter: Option<f64>, unit: f64) -> Self {
        Self { meter, unit }
    }

    /// Replaces the measured reference length with `meter` (builder style).
    pub fn with_meter(mut self, meter: f64) -> Self {
        self.meter = Some(meter);
        self
    }

    /// Sets the length one reference segment has in output space.
    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }

    /// Returns the override reference length, if any.
    pub fn meter(&self) -> Option<f64> {
        self.meter
    }

    /// Returns the target unit length.
    pub fn unit(&self) -> f64 {
        self.unit
    }
}

/// Summary of a coordinate normalization run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformReport {
    /// Reference length in raw document units.
    pub reference_length: f64,
    /// The applied ratio.
    pub ratio: f64,
    /// Rewritten rect, line, polyline and polygon elements.
    pub shapes: usize,
    /// Rewritten transform lists.
    pub transforms: usize,
    /// The resulting view box, if the document has one.
    pub view_box: Option<ViewBox>,
}

/// Rescales a document into the normalized coordinate space.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateTransformer {
    calibration: Calibration,
    viewport: ViewportPolicy,
}

impl CoordinateTransformer {
    /// Creates a transformer.
    pub fn new(calibration: Calibration, viewport: ViewportPolicy) -> Self {
        Self {
            calibration,
            viewport,
        }
    }

    /// Runs the normalization on `document`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingReference`] if there is no reference element
    ///   and no override length.
    /// - [`CoreError::InvalidReference`] if the reference cannot be measured
    ///   or the override is not positive.
    /// - [`CoreError::InvalidUnit`] for a non-positive unit length.
    /// - [`CoreError::MissingViewport`] if there is no `svg` element.
    pub fn transform(&self, document: &mut Document) -> Result<TransformReport, CoreError> {
        let unit = self.calibration.unit;
        if !(unit.is_finite() && unit > 0.0) {
            return Err(CoreError::InvalidUnit(unit));
        }

        let reference_length = self.reference_length(document)?;
        let ratio = unit / reference_length;
        info!(reference_length, ratio; "Scale ratio derived");

        let view_box = self.rewrite_viewport(document, ratio)?;
        let (shapes, transforms) = rewrite_geometry(document, ratio);

        debug!(shapes, transforms; "Geometry rewritten");

        Ok(TransformReport {
            reference_length,
            ratio,
            shapes,
            transforms,
            view_box,
        })
    }

    /// Consumes the reference element and returns the reference length.
    fn reference_length(&self, document: &mut Document) -> Result<f64, CoreError> {
        let reference = take_reference(document);

        match (self.calibration.meter, reference) {
            (Some(meter), _) => {
                if meter.is_finite() && meter > 0.0 {
                    debug!(meter; "Using reference length override");
                    Ok(meter)
                } else {
                    Err(CoreError::InvalidReference(format!(
                        "override length must be a positive number, got {meter}"
                    )))
                }
            }
            (None, Some(element)) => measure_reference(&element),
            (None, None) => Err(CoreError::MissingReference),
        }
    }

    fn rewrite_viewport(
        &self,
        document: &mut Document,
        ratio: f64,
    ) -> Result<Option<ViewBox>, CoreError> {
        let path = document.viewport_path().ok_or(CoreError::MissingViewport)?;
        let svg = document
            .get_mut(&path)
            .ok_or(CoreError::MissingViewport)?;

        let declared = svg.attribute(VIEW_BOX).map(str::to_owned);
        let current = declared.as_deref().and_then(ViewBox::parse);
        if let (Some(value), None) = (&declared, current) {
            warn!(view_box = value.as_str(); "Unparseable viewBox left unchanged");
            return Ok(None);
        }

        let rewritten = self.viewport.apply(current, ratio);
        match rewritten {
            Some(view_box) => svg.set_attribute(VIEW_BOX, view_box.to_string()),
            None => warn!("Document declares no viewBox"),
        }
        Ok(rewritten)
    }
}

/// Removes the first element with `id="meter"` and returns it.
pub fn take_reference(document: &mut Document) -> Option<Element> {
    let path = document
        .select(|element| element.has_attribute_value(ID, METER_ID))
        .into_iter()
        .next()?;
    document.detach(&path)
}

/// Measures a reference element.
///
/// The element is either the measurement line itself or a container whose
/// first child element is that line. Absent endpoint attributes are `0`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidReference`] if no line is found, an endpoint
/// is not a number, or the length is zero.
pub fn measure_reference(element: &Element) -> Result<f64, CoreError> {
    let line = if element.kind() == ElementKind::Line {
        element
    } else {
        element
            .first_child_element()
            .filter(|child| child.kind() == ElementKind::Line)
            .ok_or_else(|| {
                CoreError::InvalidReference(format!(
                    "<{}> is neither a line nor a group starting with one",
                    element.name()
                ))
            })?
    };

    let coordinate = |name: &str| line.attribute(name).map_or(0.0, |v| parse_number(Some(v)));
    let [x1, y1, x2, y2] = LINE_ATTRIBUTES.map(coordinate);
    if [x1, y1, x2, y2].iter().any(|value| value.is_nan()) {
        return Err(CoreError::InvalidReference(
            "endpoints x1, y1, x2, y2 must be numbers".to_string(),
        ));
    }

    let length = Segment::new(x1, y1, x2, y2).length();
    if length.is_finite() && length > 0.0 {
        Ok(length)
    } else {
        Err(CoreError::InvalidReference(format!(
            "length must be positive, got {length}"
        )))
    }
}

/// Rewrites shapes and transform lists, returning both counts.
fn rewrite_geometry(document: &mut Document, ratio: f64) -> (usize, usize) {
    let mut shapes = 0;
    let mut transforms = 0;

    document.walk_mut(|element| {
        if rewrite_shape(element, ratio) {
            shapes += 1;
        }
        if rewrite_transform(element, ratio) {
            transforms += 1;
        }
    });

    (shapes, transforms)
}

fn rewrite_shape(element: &mut Element, ratio: f64) -> bool {
    match element.kind() {
        ElementKind::Rect => {
            scale_attributes(element, &RECT_ATTRIBUTES, ratio);
            true
        }
        ElementKind::Line => {
            scale_attributes(element, &LINE_ATTRIBUTES, ratio);
            true
        }
        ElementKind::Polyline | ElementKind::Polygon => {
            let Some(points) = element.attribute(POINTS) else {
                return false;
            };
            let scaled = scale_points(points, ratio);
            element.set_attribute(POINTS, scaled);
            true
        }
        _ => false,
    }
}

fn scale_attributes(element: &mut Element, names: &[&str], ratio: f64) {
    for name in names {
        let scaled = scale_attribute(element.attribute(name), ratio);
        element.set_attribute(*name, scaled);
    }
}

fn rewrite_transform(element: &mut Element, ratio: f64) -> bool {
    let Some(raw) = element.attribute(TRANSFORM) else {
        return false;
    };

    match TransformChain::parse(raw) {
        Ok(chain) if chain.has_translation() => {
            let scaled = chain.scale_translations(ratio).to_string();
            element.set_attribute(TRANSFORM, scaled);
            true
        }
        Ok(_) => false,
        Err(err) => {
            warn!(element = element.name(), err:%; "Transform left unchanged");
            false
        }
    }
}
