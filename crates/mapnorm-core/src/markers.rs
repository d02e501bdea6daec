//! Marker normalization.
//!
//! Floor plans arrive with two legacy ways of tagging semantic elements:
//! an `id` equal to the category name, or a `data-name` attribute. This pass
//! rewrites both into the canonical `data-type` attribute, drops `defs`
//! blocks, and moves areas to the front of their parent so they are drawn
//! beneath everything else.

use log::{debug, trace};

use crate::{
    document::{Document, Element, ElementKind},
    vocabulary::{AREA, DATA_NAME, DATA_TYPE, ID, Vocabulary},
};

/// Counts collected while normalizing markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerReport {
    /// Elements that received a `data-type` from a legacy marker.
    pub relabeled: usize,
    /// Area elements placed at the front of their parent.
    pub areas: usize,
    /// Removed `defs` elements.
    pub removed_defs: usize,
}

/// Returns `true` for an element classified as an area by any convention.
pub fn is_area(element: &Element) -> bool {
    element.has_attribute_value(ID, AREA)
        || element.has_attribute_value(DATA_NAME, AREA)
        || element.has_attribute_value(DATA_TYPE, AREA)
}

/// Normalizes markers in place.
///
/// Areas are hoisted only when the vocabulary recognizes `area`.
///
/// Running the pass on an already normalized document changes nothing.
pub fn normalize_markers(document: &mut Document, vocabulary: &Vocabulary) -> MarkerReport {
    let removed_defs = document.remove_elements(|element| element.kind() == ElementKind::Defs);

    let mut areas = 0;
    if vocabulary.contains(AREA) {
        document.walk_mut(|element| areas += element.hoist_children(is_area));
    }

    let mut relabeled = 0;
    document.walk_mut(|element| {
        if relabel(element, vocabulary) {
            relabeled += 1;
        }
    });

    let report = MarkerReport {
        relabeled,
        areas,
        removed_defs,
    };
    debug!(
        relabeled = report.relabeled,
        areas = report.areas,
        removed_defs = report.removed_defs;
        "Markers normalized"
    );
    report
}

/// Moves a recognized `id` or `data-name` into `data-type`.
///
/// `data-name` is applied last and wins when both are present.
fn relabel(element: &mut Element, vocabulary: &Vocabulary) -> bool {
    let mut changed = false;

    if let Some(category) = vocabulary.lookup(element.attribute(ID)) {
        trace!(category; "Relabeling element identified by id");
        element.set_attribute(DATA_TYPE, category);
        element.remove_attribute(ID);
        changed = true;
    }

    if let Some(category) = vocabulary.lookup(element.attribute(DATA_NAME)) {
        trace!(category; "Relabeling element identified by data-name");
        element.set_attribute(DATA_TYPE, category);
        element.remove_attribute(DATA_NAME);
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;

    fn ids(element: &Element) -> Vec<String> {
        element
            .child_elements()
            .map(|child| {
                child
                    .attribute("data-type")
                    .or_else(|| child.attribute("id"))
                    .unwrap_or("")
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_id_area_becomes_first_child() {
        let mut doc = Document::new(
            Element::new("svg")
                .with_child(Element::new("rect").with_attribute("id", "r1"))
                .with_child(Element::new("rect").with_attribute("id", "area")),
        );

        let report = normalize_markers(&mut doc, &Vocabulary::default());

        let first = doc.root().first_child_element().unwrap();
        assert_eq!(first.attribute("data-type"), Some("area"));
        assert_eq!(first.attribute("id"), None);
        assert_eq!(first.attribute("data-name"), None);
        assert_eq!(report.relabeled, 1);
        assert_eq!(report.areas, 1);
    }

    #[test]
    fn test_data_name_is_relabeled() {
        let mut doc = Document::new(
            Element::new("svg").with_child(
                Element::new("g")
                    .with_attribute("id", "Room_101")
                    .with_attribute("data-name", "place"),
            ),
        );

        normalize_markers(&mut doc, &Vocabulary::default());

        let group = doc.root().first_child_element().unwrap();
        assert_eq!(group.attribute("data-type"), Some("place"));
        assert_eq!(group.attribute("data-name"), None);
        assert_eq!(group.attribute("id"), Some("Room_101"));
    }

    #[test]
    fn test_data_name_wins_over_id() {
        let mut doc = Document::new(
            Element::new("svg").with_child(
                Element::new("g")
                    .with_attribute("id", "walls")
                    .with_attribute("data-name", "door"),
            ),
        );

        normalize_markers(&mut doc, &Vocabulary::default());

        let group = doc.root().first_child_element().unwrap();
        assert_eq!(group.attribute("data-type"), Some("door"));
        assert_eq!(group.attribute("id"), None);
        assert_eq!(group.attribute("data-name"), None);
    }

    #[test]
    fn test_unrecognized_markers_untouched() {
        let element = Element::new("g")
            .with_attribute("id", "stairs")
            .with_attribute("data-name", "lobby");
        let mut doc = Document::new(Element::new("svg").with_child(element.clone()));

        let report = normalize_markers(&mut doc, &Vocabulary::default());

        assert_eq!(doc.root().first_child_element(), Some(&element));
        assert_eq!(report, MarkerReport::default());
    }

    #[test]
    fn test_custom_vocabulary() {
        let mut doc = Document::new(
            Element::new("svg").with_child(Element::new("g").with_attribute("id", "stairs")),
        );

        normalize_markers(&mut doc, &Vocabulary::new(["stairs"]));

        let group = doc.root().first_child_element().unwrap();
        assert_eq!(group.attribute("data-type"), Some("stairs"));
    }

    #[test]
    fn test_vocabulary_without_area_keeps_order() {
        let mut doc = Document::new(
            Element::new("svg")
                .with_child(Element::new("g").with_attribute("id", "walls"))
                .with_child(Element::new("rect").with_attribute("id", "area")),
        );

        let report = normalize_markers(&mut doc, &Vocabulary::new(["walls"]));

        assert_eq!(report.areas, 0);
        let names: Vec<_> = doc.root().child_elements().map(|e| e.name()).collect();
        assert_eq!(names, vec!["g", "rect"]);
        let rect = doc.root().child_elements().nth(1).unwrap();
        assert_eq!(rect.attribute("id"), Some("area"));
        assert_eq!(rect.attribute("data-type"), None);
    }

    #[test]
    fn test_defs_removed_everywhere() {
        let mut doc = Document::new(
            Element::new("svg")
                .with_child(Element::new("defs").with_child(Element::new("style")))
                .with_child(Element::new("g").with_child(Element::new("defs"))),
        );

        let report = normalize_markers(&mut doc, &Vocabulary::default());

        assert_eq!(report.removed_defs, 2);
        assert!(doc.find(|element| element.name() == "defs").is_none());
        assert!(doc.find(|element| element.name() == "style").is_none());
    }

    #[test]
    fn test_multiple_areas_keep_relative_order() {
        let mut doc = Document::new(
            Element::new("svg")
                .with_child(Element::new("g").with_attribute("id", "walls"))
                .with_child(Node::Text("\n".to_string()))
                .with_child(
                    Element::new("rect")
                        .with_attribute("data-name", "area")
                        .with_attribute("x", "1"),
                )
                .with_child(Element::new("g").with_attribute("data-name", "place"))
                .with_child(
                    Element::new("rect")
                        .with_attribute("id", "area")
                        .with_attribute("x", "2"),
                ),
        );

        normalize_markers(&mut doc, &Vocabulary::default());

        assert_eq!(ids(doc.root()), vec!["area", "area", "walls", "place"]);
        let xs: Vec<_> = doc
            .root()
            .child_elements()
            .take(2)
            .map(|area| area.attribute("x").unwrap())
            .collect();
        assert_eq!(xs, vec!["1", "2"]);
    }

    #[test]
    fn test_nested_areas_move_within_their_parent() {
        let mut doc = Document::new(
            Element::new("svg").with_child(
                Element::new("g")
                    .with_attribute("id", "floor")
                    .with_child(Element::new("line"))
                    .with_child(Element::new("polygon").with_attribute("id", "area")),
            ),
        );

        normalize_markers(&mut doc, &Vocabulary::default());

        let floor = doc.root().first_child_element().unwrap();
        assert_eq!(floor.attribute("id"), Some("floor"));
        assert_eq!(floor.first_child_element().unwrap().name(), "polygon");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut doc = Document::new(
            Element::new("svg")
                .with_child(Element::new("defs"))
                .with_child(Element::new("g").with_attribute("id", "walls"))
                .with_child(Element::new("rect").with_attribute("id", "area"))
                .with_child(Element::new("rect").with_attribute("data-name", "area"))
                .with_child(Element::new("g").with_attribute("data-name", "door")),
        );

        normalize_markers(&mut doc, &Vocabulary::default());
        let once = doc.clone();
        let report = normalize_markers(&mut doc, &Vocabulary::default());

        assert_eq!(doc, once);
        assert_eq!(report.relabeled, 0);
        assert_eq!(report.removed_defs, 0);
    }
}
