//! Numeric helpers and geometric value types for coordinate normalization.
//!
//! # Overview
//!
//! - [`scale`] - The scaling function applied to every rewritten number.
//! - [`parse_number`] / [`format_number`] - Attribute value conversion.
//! - [`scale_points`] - Rewrites a `points` attribute.
//! - [`Segment`] - A line segment, used for the reference measurement.
//! - [`ViewBox`] / [`ViewportPolicy`] - The root viewport and how it is rewritten.
//!
//! Attribute numbers follow a lenient coercion: surrounding whitespace is
//! ignored, an empty value is `0`, and anything unparseable (or absent) is
//! `NaN`. [`scale`] maps both `0` and `NaN` to `0`.

use std::fmt;

use serde::Deserialize;

/// Rounds half-way cases towards positive infinity.
///
/// `-2.5` rounds to `-2` and `2.5` to `3`, unlike [`f64::round`] which
/// rounds half-way cases away from zero.
pub fn round_half_up(value: f64) -> f64 {
    let rounded = value.round();
    if value - rounded == 0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

/// Rounds a value to two decimal places.
pub fn round_hundredths(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Scales `value` by `ratio`, rounded to two decimal places.
///
/// Zero and `NaN` inputs short-circuit to `0`.
///
/// # Examples
///
/// ```
/// # use mapnorm_core::geometry::scale;
/// assert_eq!(scale(10.0, 0.1), 1.0);
/// assert_eq!(scale(1.0, 1.0 / 3.0), 0.33);
/// assert_eq!(scale(f64::NAN, 0.5), 0.0);
/// ```
pub fn scale(value: f64, ratio: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        return 0.0;
    }
    round_hundredths(value * ratio)
}

/// Converts an attribute value into a number.
///
/// Absent and unparseable values yield `NaN`; blank values yield `0`.
pub fn parse_number(value: Option<&str>) -> f64 {
    let Some(value) = value else {
        return f64::NAN;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// Formats a number in its shortest round-trip form.
///
/// Integral values have no fractional part and negative zero is written as
/// `0`.
///
/// ```
/// # use mapnorm_core::geometry::format_number;
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(-0.6), "-0.6");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Scales a single attribute value and formats the result.
pub fn scale_attribute(value: Option<&str>, ratio: f64) -> String {
    format_number(scale(parse_number(value), ratio))
}

/// Rewrites a `points` attribute.
///
/// Tokens are whitespace-delimited and scaled independently. A token holding
/// a comma-separated pair keeps its pairing: each part is scaled and the
/// parts are joined with `,` again. The result is joined with single spaces.
///
/// ```
/// # use mapnorm_core::geometry::scale_points;
/// assert_eq!(scale_points("0 0 10 10 20 0", 0.1), "0 0 1 1 2 0");
/// assert_eq!(scale_points("10,20 30,40", 0.1), "1,2 3,4");
/// ```
pub fn scale_points(points: &str, ratio: f64) -> String {
    points
        .split_whitespace()
        .map(|token| {
            token
                .split(',')
                .map(|part| {
                    if part.is_empty() {
                        String::new()
                    } else {
                        scale_attribute(Some(part), ratio)
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl Segment {
    /// Creates a segment from its endpoint coordinates.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }
}

/// The four numbers of a `viewBox` declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    min_x: f64,
    min_y: f64,
    width: f64,
    height: f64,
}

impl ViewBox {
    /// Creates a view box from origin and extent.
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Parses a `viewBox` value: four numbers separated by whitespace
    /// and/or commas. Returns `None` for any other shape.
    pub fn parse(value: &str) -> Option<Self> {
        let numbers: Vec<f64> = value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| parse_number(Some(part)))
            .collect();
        match numbers.as_slice() {
            &[min_x, min_y, width, height] => Some(Self::new(min_x, min_y, width, height)),
            _ => None,
        }
    }

    /// Scales all four numbers with [`scale`].
    pub fn scaled(self, ratio: f64) -> Self {
        Self::new(
            scale(self.min_x, ratio),
            scale(self.min_y, ratio),
            scale(self.width, ratio),
            scale(self.height, ratio),
        )
    }

    /// Moves the origin by `-margin` and grows the extent by `margin`,
    /// rounded to two decimal places.
    pub fn padded(self, margin: f64) -> Self {
        Self::new(
            round_hundredths(self.min_x - margin),
            round_hundredths(self.min_y - margin),
            round_hundredths(self.width + margin),
            round_hundredths(self.height + margin),
        )
    }

    /// Returns the origin x coordinate.
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Returns the origin y coordinate.
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_number(self.min_x),
            format_number(self.min_y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// How the root `viewBox` is rewritten.
///
/// Deserialized from configuration as a tagged table, e.g.
/// `{ policy = "padded", margin = 0.6 }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ViewportPolicy {
    /// Scale each number by the ratio.
    #[default]
    Scaled,
    /// Scale, then pad by a fixed margin.
    Padded {
        #[serde(default = "default_margin")]
        margin: f64,
    },
    /// Replace with `0 0 size size`.
    Fixed {
        #[serde(default = "default_fixed_size")]
        size: f64,
    },
}

fn default_margin() -> f64 {
    0.6
}

fn default_fixed_size() -> f64 {
    1000.0
}

impl ViewportPolicy {
    /// Applies the policy to an existing view box.
    ///
    /// `current` may be `None` when the document declares no view box, in
    /// which case only [`ViewportPolicy::Fixed`] produces a value.
    pub fn apply(self, current: Option<ViewBox>, ratio: f64) -> Option<ViewBox> {
        match self {
            ViewportPolicy::Scaled => current.map(|view_box| view_box.scaled(ratio)),
            ViewportPolicy::Padded { margin } => {
                current.map(|view_box| view_box.scaled(ratio).padded(margin))
            }
            ViewportPolicy::Fixed { size } => Some(ViewBox::new(0.0, 0.0, size, size)),
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn coordinate_strategy() -> impl Strategy<Value = f64> {
        (-100_000i64..100_000).prop_map(|n| n as f64 / 10.0)
    }

    fn length_strategy() -> impl Strategy<Value = f64> {
        1.0f64..500.0
    }

    /// Scaling by `1 / L` equals `round(p / L * 100) / 100`.
    fn check_scale_matches_reference_formula(p: f64, length: f64) -> Result<(), TestCaseError> {
        let ratio = 1.0 / length;
        let expected = if p == 0.0 {
            0.0
        } else {
            round_half_up(p * ratio * 100.0) / 100.0
        };
        prop_assert!(approx_eq!(f64, scale(p, ratio), expected, ulps = 2));
        Ok(())
    }

    /// The result of `scale` always has at most two decimals.
    fn check_scale_has_two_decimals(p: f64, ratio: f64) -> Result<(), TestCaseError> {
        let scaled = scale(p, ratio);
        prop_assert!(approx_eq!(
            f64,
            scaled * 100.0,
            (scaled * 100.0).round(),
            epsilon = 1e-6
        ));
        Ok(())
    }

    /// A single text token scales the same way as the number it holds.
    fn check_points_scale_like_numbers(p: f64, ratio: f64) -> Result<(), TestCaseError> {
        let token = format_number(p);
        prop_assert_eq!(scale_points(&token, ratio), format_number(scale(p, ratio)));
        Ok(())
    }

    proptest! {
        #[test]
        fn scale_matches_reference_formula(p in coordinate_strategy(), length in length_strategy()) {
            check_scale_matches_reference_formula(p, length)?;
        }

        #[test]
        fn scale_has_two_decimals(p in coordinate_strategy(), ratio in 0.001f64..10.0) {
            check_scale_has_two_decimals(p, ratio)?;
        }

        #[test]
        fn points_scale_like_numbers(p in coordinate_strategy(), ratio in 0.001f64..10.0) {
            check_points_scale_like_numbers(p, ratio)?;
        }
    }

    #[test]
    fn test_scaling_twice_differs_from_once() {
        // 10 / 10 = 1, then 1 / 10 = 0.1
        let ratio = 0.1;
        let once = scale(10.0, ratio);
        let twice = scale(once, ratio);
        assert_eq!(once, 1.0);
        assert_eq!(twice, 0.1);
        assert_ne!(once, twice);
    }
}
