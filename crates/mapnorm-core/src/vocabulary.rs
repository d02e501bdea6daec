//! Marker vocabulary and the attribute names used by the normalization passes.

use serde::Deserialize;

/// Identifier attribute.
pub const ID: &str = "id";
/// Legacy semantic-name attribute.
pub const DATA_NAME: &str = "data-name";
/// Canonical classification attribute.
pub const DATA_TYPE: &str = "data-type";
/// Link from a transition view to its building, written by the root pass.
pub const DATA_TARGET: &str = "data-target";
/// Identifier of the reference measurement element.
pub const METER_ID: &str = "meter";

/// Category of background areas, drawn beneath everything else.
pub const AREA: &str = "area";
/// Category of building outlines on root maps.
pub const BUILDING: &str = "building";
/// Category of transition points (stairs, exits).
pub const TRANSITION_VIEW: &str = "transition-view";

/// The set of recognized category names.
///
/// Deserializes from a plain list of strings.
///
/// # Examples
///
/// ```
/// # use mapnorm_core::vocabulary::Vocabulary;
/// let vocabulary = Vocabulary::default();
/// assert!(vocabulary.contains("area"));
/// assert!(!vocabulary.contains("stairs"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    categories: Vec<String>,
}

impl Vocabulary {
    /// Creates a vocabulary from category names.
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `name` is a recognized category.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|category| category == name)
    }

    /// Returns the recognized category that equals `value`, if any.
    pub fn lookup(&self, value: Option<&str>) -> Option<&str> {
        let value = value?;
        self.categories
            .iter()
            .find(|category| *category == value)
            .map(String::as_str)
    }

    /// Iterates over the category names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new([AREA, "place", TRANSITION_VIEW, "walls", "door", BUILDING])
    }
}
