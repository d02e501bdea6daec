//! Root map relabeling.
//!
//! On a campus-level (root) map every building is a group tagged
//! `data-type="building"`, and transition views inside it lead into that
//! building's own floor plans. This pass links each such transition view to
//! its building through `data-target` and moves all transition views to the
//! front of the root element.

use log::debug;

use crate::{
    document::{Document, Element},
    vocabulary::{BUILDING, DATA_TARGET, DATA_TYPE, ID, TRANSITION_VIEW},
};

/// Counts collected by [`relabel_root`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootReport {
    /// Transition views that received a `data-target`.
    pub linked: usize,
    /// Transition views moved to the front of the root element.
    pub moved: usize,
}

fn is_transition_view(element: &Element) -> bool {
    element.has_attribute_value(DATA_TYPE, TRANSITION_VIEW)
}

/// Links transition views to their buildings and moves them to the front of
/// the root element, keeping their document order.
pub fn relabel_root(document: &mut Document) -> RootReport {
    let mut linked = 0;
    document.walk_mut(|element| {
        if !element.has_attribute_value(DATA_TYPE, BUILDING) {
            return;
        }
        let Some(building) = element.attribute(ID).map(str::to_owned) else {
            return;
        };
        for child in element.children_mut().iter_mut() {
            if let Some(view) = child.as_element_mut().filter(|e| is_transition_view(e)) {
                view.set_attribute(DATA_TARGET, building.as_str());
                linked += 1;
            }
        }
    });

    let paths = document.select(is_transition_view);
    let mut views: Vec<Element> = paths
        .iter()
        .rev()
        .filter_map(|path| document.detach(path))
        .collect();
    views.reverse();

    let moved = views.len();
    document.root_mut().prepend_elements(views);

    debug!(linked, moved; "Root map relabeled");
    RootReport { linked, moved }
}
