//! Selection state and marker classes

use crate::config::MarkerClasses;
use doc_model::{AnnotationId, DocumentTree, NodeId};
use render_model::Rgb;

/// The annotation currently selected by the user
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSelection {
    pub id: AnnotationId,
    pub color: Rgb,
    pub opacity: f32,
    /// The run that was clicked
    pub anchor: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(ActiveSelection),
}

impl SelectionState {
    pub fn selected_id(&self) -> Option<&AnnotationId> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(active) => Some(&active.id),
        }
    }

    pub fn is_selected(&self, id: &AnnotationId) -> bool {
        self.selected_id() == Some(id)
    }
}

/// What a click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An annotation became selected
    Selected(AnnotationId),
    /// The previous selection was dropped
    Deselected,
    /// Nothing changed
    Ignored,
}

/// Mark the runs of an annotation as selected.
///
/// Every run gets the selected class; the first run also gets the start
/// class and the last run the end class.
pub fn apply_markers(tree: &mut DocumentTree, runs: &[NodeId], markers: &MarkerClasses) {
    for (index, &run) in runs.iter().enumerate() {
        let Some(markup) = tree.markup_mut(run) else {
            continue;
        };
        markup.add_class(&markers.selected);
        if index == 0 {
            markup.add_class(&markers.start);
        }
        if index + 1 == runs.len() {
            markup.add_class(&markers.end);
        }
    }
}

/// Remove all marker classes from the runs of an annotation
pub fn strip_markers(tree: &mut DocumentTree, runs: &[NodeId], markers: &MarkerClasses) {
    for &run in runs {
        if let Some(markup) = tree.markup_mut(run) {
            markup.remove_class(&markers.selected);
            markup.remove_class(&markers.start);
            markup.remove_class(&markers.end);
        }
    }
}
