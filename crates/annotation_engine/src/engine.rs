//! Annotation engine
//!
//! Owns the document tree and every piece of annotation state: the offset
//! index, the registry of markup runs, the validated records, the current
//! selection and the requests still waiting for the host. All mutation happens in plain
//! method calls; host round trips are split into a request method that only
//! stages state and sends a [`HostRequest`], and a confirmation method that
//! applies the tree surgery once the host answers.

use crate::config::EngineConfig;
use crate::port::{HostPort, HostRequest, RecordingPort};
use crate::record::{AnnotationRecord, AnnotationStyle, RecordError, WireAnnotation};
use crate::registry::AnnotationRegistry;
use crate::selection::{apply_markers, strip_markers, ActiveSelection, ClickOutcome, SelectionState};
use crate::splicer::{apply_style, MarkupTemplate, RangeSplicer};
use crate::Result;
use doc_model::{
    locate, AnnotationId, AnnotationKind, Bias, DocumentTree, Markup, MarkupShape, NodeId, NodeType,
    ParagraphOffsets, Selection,
};
use render_model::Rgb;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Outcome of a host confirmation callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The confirmation matched staged state and was applied
    Applied,
    /// The confirmation did not match; nothing changed
    Mismatched,
}

/// Summary of one `load_annotations` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Annotations now rendered, in input order
    pub rendered: Vec<AnnotationId>,
    /// Records rejected as malformed
    pub dropped: Vec<RecordError>,
    /// Ids that were already loaded
    pub skipped: Vec<AnnotationId>,
    /// Valid records that produced no markup
    pub empty: Vec<AnnotationId>,
}

/// A create request waiting for the host to allocate an id
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCreate {
    /// Endpoints as captured from the platform selection
    pub selection: Selection,
    /// Half-open global range computed at capture time
    pub range: Range<usize>,
    pub style: AnnotationStyle,
}

/// Positional annotation engine over one document
pub struct AnnotationEngine<P: HostPort = RecordingPort> {
    tree: DocumentTree,
    offsets: ParagraphOffsets,
    registry: AnnotationRegistry,
    records: HashMap<AnnotationId, AnnotationRecord>,
    selection: SelectionState,
    pending_create: Option<PendingCreate>,
    pending_delete: Option<AnnotationId>,
    pending_restyle: Option<AnnotationId>,
    config: EngineConfig,
    port: P,
}

impl<P: HostPort> AnnotationEngine<P> {
    /// Create an engine with the default configuration
    pub fn new(tree: DocumentTree, port: P) -> Self {
        Self::with_config(tree, EngineConfig::default(), port)
    }

    pub fn with_config(tree: DocumentTree, config: EngineConfig, port: P) -> Self {
        let offsets = ParagraphOffsets::compute(&tree);
        Self {
            tree,
            offsets,
            registry: AnnotationRegistry::new(),
            records: HashMap::new(),
            selection: SelectionState::Idle,
            pending_create: None,
            pending_delete: None,
            pending_restyle: None,
            config,
            port,
        }
    }

    /// Replace the document, dropping all annotation state
    pub fn load_document(&mut self, tree: DocumentTree) {
        self.offsets = ParagraphOffsets::compute(&tree);
        self.tree = tree;
        self.registry = AnnotationRegistry::new();
        self.records.clear();
        self.selection = SelectionState::Idle;
        self.pending_create = None;
        self.pending_delete = None;
        self.pending_restyle = None;
        info!(
            paragraphs = self.offsets.len(),
            length = self.offsets.total_len(),
            "document loaded"
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn offsets(&self) -> &ParagraphOffsets {
        &self.offsets
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    pub fn record(&self, id: &AnnotationId) -> Option<&AnnotationRecord> {
        self.records.get(id)
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.selection
    }

    pub fn pending_create(&self) -> Option<&PendingCreate> {
        self.pending_create.as_ref()
    }

    /// Annotation whose delete the host has not confirmed yet
    pub fn pending_delete(&self) -> Option<&AnnotationId> {
        self.pending_delete.as_ref()
    }

    /// Annotation whose restyle the host has not confirmed yet
    pub fn pending_restyle(&self) -> Option<&AnnotationId> {
        self.pending_restyle.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Text covered by an annotation's runs, in document order
    pub fn annotation_text(&self, id: &AnnotationId) -> Option<String> {
        if !self.registry.contains(id) {
            return None;
        }
        Some(
            self.registry
                .get(id)
                .iter()
                .map(|&run| self.tree.text_content(run))
                .collect(),
        )
    }

    /// Serialize the annotated document as HTML
    pub fn render_html(&self) -> String {
        render_model::render_html(&self.tree, &self.config.html)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Validate and render a batch of host annotations.
    ///
    /// Malformed records are dropped and already-loaded ids skipped; neither
    /// stops the rest of the batch.
    pub fn load_annotations(&mut self, annotations: &[WireAnnotation]) -> LoadReport {
        self.load_with(annotations, Self::insert_record, "loaded")
    }

    /// Take over annotation markup the document already carries.
    ///
    /// Documents saved with their annotations rendered already have a
    /// wrapper element around each run. Instead of splicing new markup, the
    /// wrapper around the text at the start of each paragraph's part of the
    /// range becomes the run: the leaf's parent for a highlight, or its
    /// grandparent for a decoration, with the parent as the inner wrapper.
    /// Records with no such wrapper are reported as empty.
    pub fn adopt_annotations(&mut self, annotations: &[WireAnnotation]) -> LoadReport {
        self.load_with(annotations, Self::adopt_record, "adopted")
    }

    fn load_with(
        &mut self,
        annotations: &[WireAnnotation],
        place: fn(&mut Self, AnnotationRecord) -> Result<bool>,
        action: &str,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        for wire in annotations {
            let record = match AnnotationRecord::from_wire(wire) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Dropping annotation {:?}: {}", wire.id, e);
                    report.dropped.push(e);
                    continue;
                }
            };
            if self.records.contains_key(&record.id) {
                warn!("Annotation {} is already loaded, skipping", record.id);
                report.skipped.push(record.id);
                continue;
            }

            let id = record.id.clone();
            match place(self, record) {
                Ok(true) => report.rendered.push(id),
                Ok(false) => report.empty.push(id),
                Err(e) => {
                    warn!("Failed to render annotation {}: {}", id, e);
                    report.empty.push(id);
                }
            }
        }

        info!(
            rendered = report.rendered.len(),
            dropped = report.dropped.len(),
            skipped = report.skipped.len(),
            empty = report.empty.len(),
            "annotations {}",
            action
        );
        report
    }

    /// Remove every annotation's markup and forget all records
    pub fn clear_annotations(&mut self) -> Result<()> {
        self.deselect();
        for (_, runs) in self.registry.clear_all() {
            self.remove_runs(&runs)?;
        }
        self.records.clear();
        Ok(())
    }

    /// Render a record and register it. Returns false if it covers no text.
    fn insert_record(&mut self, record: AnnotationRecord) -> Result<bool> {
        let runs = match self.render_record(&record) {
            Ok(runs) => runs,
            Err(e) => {
                let partial = self.tree.markup_nodes(&record.id);
                self.remove_runs(&partial)?;
                return Err(e);
            }
        };
        if runs.is_empty() {
            debug!(id = %record.id, "annotation range covers no text");
            return Ok(false);
        }

        debug!(id = %record.id, runs = runs.len(), "annotation rendered");
        self.registry.register(record.id.clone(), runs);
        self.records.insert(record.id.clone(), record);
        Ok(true)
    }

    /// Register existing wrappers as the runs of a record
    fn adopt_record(&mut self, record: AnnotationRecord) -> Result<bool> {
        let mut wrappers = Vec::new();
        for (index, local) in self.offsets.split_range(record.range.clone()) {
            let paragraph = self.offsets.paragraphs()[index];
            let wrapper = locate(&self.tree, paragraph, local.start, Bias::Start)
                .and_then(|point| self.existing_wrapper(point.leaf, record.style.kind));
            match wrapper {
                Some(wrapper) => wrappers.push(wrapper),
                None => debug!(id = %record.id, paragraph = %paragraph, "no wrapper to adopt"),
            }
        }
        if wrappers.is_empty() {
            return Ok(false);
        }

        let style = record.style.markup_style(&self.config.text_color);
        let mut runs = Vec::with_capacity(wrappers.len());
        for (outer, inner) in wrappers {
            let shape = match inner {
                Some(inner) => {
                    let inner_style = style.inner.clone().unwrap_or_default();
                    self.tree.convert_to_markup(
                        inner,
                        Markup::new(record.id.clone(), MarkupShape::DecorationInner, inner_style),
                    )?;
                    MarkupShape::Decorated { inner }
                }
                None => MarkupShape::Highlight,
            };
            self.tree.convert_to_markup(
                outer,
                Markup::new(record.id.clone(), shape, style.outer.clone()),
            )?;
            runs.push(outer);
        }

        debug!(id = %record.id, runs = runs.len(), "annotation adopted");
        self.registry.register(record.id.clone(), runs);
        self.records.insert(record.id.clone(), record);
        Ok(true)
    }

    /// The inline wrapper around `leaf` that can carry a run of `kind`, and
    /// the inner wrapper for decorations. A decoration's outer wrapper must
    /// hold nothing but the inner one.
    fn existing_wrapper(
        &self,
        leaf: NodeId,
        kind: AnnotationKind,
    ) -> Option<(NodeId, Option<NodeId>)> {
        let is_inline = |node: NodeId| self.tree.node_type(node) == Some(NodeType::Inline);

        let parent = self.tree.parent(leaf).filter(|&p| is_inline(p))?;
        if !kind.is_decoration() {
            return Some((parent, None));
        }
        let outer = self
            .tree
            .parent(parent)
            .filter(|&o| is_inline(o) && self.tree.children(o).len() == 1)?;
        Some((outer, Some(parent)))
    }

    /// Splice markup for a record paragraph by paragraph, in document order
    fn render_record(&mut self, record: &AnnotationRecord) -> Result<Vec<NodeId>> {
        let template = MarkupTemplate::new(
            record.id.clone(),
            record.style.markup_style(&self.config.text_color),
        );
        let mut runs = Vec::new();

        for (index, local) in self.offsets.split_range(record.range.clone()) {
            let paragraph = self.offsets.paragraphs()[index];
            let whole = self
                .offsets
                .range_of(index)
                .is_some_and(|r| local.start == 0 && local.end == r.len());

            let mut splicer = RangeSplicer::new(&mut self.tree, &template);
            let created = if whole {
                splicer.wrap_paragraph(paragraph)?
            } else {
                splicer.splice_local(paragraph, local)?
            };
            runs.extend(created);
        }
        Ok(runs)
    }

    /// Unwrap runs and merge the text leaves they leave behind
    fn remove_runs(&mut self, runs: &[NodeId]) -> Result<()> {
        let paragraphs: BTreeSet<NodeId> = runs
            .iter()
            .filter_map(|&run| self.tree.enclosing_paragraph(run))
            .collect();
        for &run in runs {
            if self.tree.contains(run) {
                self.tree.unwrap(run)?;
            }
        }
        for paragraph in paragraphs {
            self.tree.normalize(paragraph)?;
        }
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Handle a click on `target`, or on the background when `None`.
    ///
    /// Clicking an annotation selects it and notifies the host; clicking the
    /// selected annotation again, or anything that is not an annotation,
    /// deselects without notifying the host.
    pub fn click(&mut self, target: Option<NodeId>) -> ClickOutcome {
        let hit = target.and_then(|node| {
            let run = self.tree.markup_ancestor(node)?;
            let id = self.tree.markup(run)?.annotation_id.clone();
            self.records.contains_key(&id).then_some((id, run))
        });

        match hit {
            None => {
                if self.deselect() {
                    ClickOutcome::Deselected
                } else {
                    ClickOutcome::Ignored
                }
            }
            Some((id, _)) if self.selection.is_selected(&id) => {
                self.deselect();
                ClickOutcome::Deselected
            }
            Some((id, run)) => {
                self.deselect();
                self.select_with_anchor(&id, run);
                ClickOutcome::Selected(id)
            }
        }
    }

    /// Select an annotation programmatically; false if it is not loaded
    pub fn select(&mut self, id: &AnnotationId) -> bool {
        let Some(anchor) = self.registry.first(id) else {
            return false;
        };
        if self.selection.is_selected(id) {
            return true;
        }
        self.deselect();
        self.select_with_anchor(id, anchor)
    }

    fn select_with_anchor(&mut self, id: &AnnotationId, anchor: NodeId) -> bool {
        let Some(record) = self.records.get(id) else {
            return false;
        };
        apply_markers(&mut self.tree, self.registry.get(id), &self.config.markers);
        self.selection = SelectionState::Selected(ActiveSelection {
            id: id.clone(),
            color: record.style.color,
            opacity: record.style.opacity,
            anchor,
        });
        self.port.send(HostRequest::Selected {
            annotation: record.to_wire(),
        });
        debug!(id = %id, "annotation selected");
        true
    }

    /// Drop the current selection; false if nothing was selected
    pub fn deselect(&mut self) -> bool {
        let SelectionState::Selected(active) = std::mem::take(&mut self.selection) else {
            return false;
        };
        strip_markers(&mut self.tree, self.registry.get(&active.id), &self.config.markers);
        debug!(id = %active.id, "annotation deselected");
        true
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Ask the host to delete the selected annotation; false if none is
    /// selected. The tree is left alone until the host confirms.
    pub fn request_delete(&mut self) -> bool {
        let Some(id) = self.selection.selected_id().cloned() else {
            debug!("delete requested with no selection");
            return false;
        };
        self.pending_delete = Some(id.clone());
        self.port.send(HostRequest::Delete { id });
        true
    }

    /// Host confirmed a delete.
    ///
    /// The id must match the last delete request. The selection may have
    /// moved since; it is only cleared if it is the deleted annotation.
    pub fn on_delete_confirmed(&mut self, id: &AnnotationId) -> Result<Confirmation> {
        if self.pending_delete.as_ref() != Some(id) {
            warn!(
                "Delete confirmation for {} does not match pending delete {:?}",
                id, self.pending_delete
            );
            return Ok(Confirmation::Mismatched);
        }

        self.pending_delete = None;
        if self.pending_restyle.as_ref() == Some(id) {
            self.pending_restyle = None;
        }
        if self.selection.is_selected(id) {
            self.selection = SelectionState::Idle;
        }
        let runs = self.registry.clear(id);
        self.remove_runs(&runs)?;
        self.records.remove(id);
        info!(id = %id, "annotation deleted");
        Ok(Confirmation::Applied)
    }

    // =========================================================================
    // Restyle
    // =========================================================================

    /// Change the selected annotation's color and opacity.
    ///
    /// The record and selection state change immediately and the host is
    /// notified; markup is restyled once the host confirms.
    pub fn request_restyle(&mut self, color: Rgb, opacity: f32) -> bool {
        let SelectionState::Selected(active) = &mut self.selection else {
            debug!("restyle requested with no selection");
            return false;
        };
        let Some(record) = self.records.get_mut(&active.id) else {
            return false;
        };

        record.style = AnnotationStyle::new(record.style.kind, color, opacity);
        active.color = record.style.color;
        active.opacity = record.style.opacity;

        self.pending_restyle = Some(record.id.clone());
        self.port.send(HostRequest::Restyle {
            id: record.id.clone(),
            color: record.style.color.to_hex(),
            opacity: record.style.opacity,
        });
        true
    }

    /// Host confirmed a restyle of the annotation from the last restyle
    /// request, whether or not it is still selected
    pub fn on_restyle_confirmed(&mut self, id: &AnnotationId) -> Result<Confirmation> {
        let record = match self.records.get(id) {
            Some(record) if self.pending_restyle.as_ref() == Some(id) => record,
            _ => {
                warn!(
                    "Restyle confirmation for {} does not match pending restyle {:?}",
                    id, self.pending_restyle
                );
                return Ok(Confirmation::Mismatched);
            }
        };
        self.pending_restyle = None;

        let style = record.style.markup_style(&self.config.text_color);
        for &run in self.registry.get(id) {
            apply_style(&mut self.tree, run, &style)?;
        }
        debug!(id = %id, "annotation restyled");
        Ok(Confirmation::Applied)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Propose a new annotation over a platform selection.
    ///
    /// Returns the proposed global range, or `None` for a selection that
    /// covers no text. A newer request replaces one still waiting for the
    /// host.
    pub fn request_create(
        &mut self,
        selection: Selection,
        kind: AnnotationKind,
        color: Rgb,
        opacity: f32,
    ) -> Result<Option<Range<usize>>> {
        let range = selection.global_range(&self.tree, &self.offsets)?;
        let range = range.start..range.end.min(self.offsets.total_len());
        if range.is_empty() {
            debug!("create requested for an empty selection");
            return Ok(None);
        }

        let style = AnnotationStyle::new(kind, color, opacity);
        if self.pending_create.is_some() {
            debug!("replacing pending create request");
        }
        self.port.send(HostRequest::Create {
            annotation: style.proposal(&range),
        });
        self.pending_create = Some(PendingCreate {
            selection,
            range: range.clone(),
            style,
        });
        Ok(Some(range))
    }

    /// Host allocated an id for the pending create
    pub fn on_create_confirmed(&mut self, id: AnnotationId) -> Result<Confirmation> {
        let Some(pending) = self.pending_create.take() else {
            warn!("Create confirmation for {} with no pending request", id);
            return Ok(Confirmation::Mismatched);
        };
        if self.records.contains_key(&id) {
            warn!("Create confirmation reuses loaded id {}", id);
            return Ok(Confirmation::Mismatched);
        }

        let record = AnnotationRecord::new(id.clone(), pending.style, pending.range);
        if !self.insert_record(record)? {
            debug!(id = %id, "created annotation covers no text");
        }
        info!(id = %id, "annotation created");
        Ok(Confirmation::Applied)
    }

    /// Host refused the pending create; false if none was pending
    pub fn on_create_failed(&mut self, reason: &str) -> bool {
        match self.pending_create.take() {
            Some(_) => {
                warn!("Annotation create failed: {}", reason);
                true
            }
            None => {
                warn!("Create failure with no pending request: {}", reason);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{BlockSpec, InlineSpec, Position};

    fn wire(id: u64, kind: &str, ranges: Vec<usize>) -> WireAnnotation {
        WireAnnotation {
            id: Some(AnnotationId::from(id)),
            kind: kind.into(),
            color: "FFFF00".to_string(),
            opacity: 1.0,
            ranges,
        }
    }

    fn engine(paragraphs: &[&str]) -> AnnotationEngine {
        let tree = DocumentTree::from_paragraphs(paragraphs).unwrap();
        AnnotationEngine::new(tree, RecordingPort::new())
    }

    #[test]
    fn test_load_report() {
        let mut engine = engine(&["Hello world", "Goodbye"]);

        let report = engine.load_annotations(&[
            wire(1, "Highlight", vec![0, 4]),
            wire(2, "Circle", vec![0, 4]),
            wire(1, "Underline", vec![5, 6]),
            wire(3, "Highlight", vec![40, 50]),
        ]);

        assert_eq!(report.rendered, vec![AnnotationId::new("1")]);
        assert_eq!(report.dropped, vec![RecordError::UnknownKind("Circle".to_string())]);
        assert_eq!(report.skipped, vec![AnnotationId::new("1")]);
        assert_eq!(report.empty, vec![AnnotationId::new("3")]);
        assert_eq!(engine.registry().len(), 1);
        assert!(engine.record(&AnnotationId::new("3")).is_none());
    }

    #[test]
    fn test_whole_paragraph_uses_single_run() {
        let mut engine = engine(&["ab", "cd", "ef"]);

        engine.load_annotations(&[wire(1, "Highlight", vec![1, 4])]);

        let id = AnnotationId::new("1");
        let texts: Vec<String> = engine
            .registry()
            .get(&id)
            .iter()
            .map(|&r| engine.tree().text_content(r))
            .collect();
        assert_eq!(texts, vec!["b", "cd", "e"]);
        let middle = engine.offsets().paragraphs()[1];
        assert_eq!(engine.tree().children(middle), &engine.registry().get(&id)[1..2]);
    }

    #[test]
    fn test_clear_annotations_restores_text() {
        let mut engine = engine(&["Hello world", "Goodbye"]);
        engine.load_annotations(&[
            wire(1, "Highlight", vec![2, 12]),
            wire(2, "Squiggly", vec![4, 8]),
        ]);

        engine.clear_annotations().unwrap();

        assert!(engine.registry().is_empty());
        assert_eq!(engine.tree().plain_text(), "Hello worldGoodbye");
        for &paragraph in engine.offsets().paragraphs() {
            assert_eq!(engine.tree().children(paragraph).len(), 1);
        }
    }

    #[test]
    fn test_click_toggles_selection() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[wire(1, "Highlight", vec![0, 4])]);
        let id = AnnotationId::new("1");
        let run = engine.registry().get(&id)[0];
        let leaf = engine.tree().children(run)[0];

        assert_eq!(engine.click(Some(leaf)), ClickOutcome::Selected(id.clone()));
        assert!(matches!(
            engine.port().last(),
            Some(HostRequest::Selected { annotation }) if annotation.id == Some(id.clone())
        ));
        assert!(engine.tree().markup(run).unwrap().has_class("annotation-selected"));

        assert_eq!(engine.click(Some(run)), ClickOutcome::Deselected);
        assert_eq!(engine.selection_state(), &SelectionState::Idle);
        assert!(engine.tree().markup(run).unwrap().classes.is_empty());
        assert_eq!(engine.port().requests().len(), 1);
        assert_eq!(engine.click(None), ClickOutcome::Ignored);
    }

    #[test]
    fn test_click_switches_selection() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[
            wire(1, "Highlight", vec![0, 2]),
            wire(2, "Underline", vec![6, 8]),
        ]);
        let a = AnnotationId::new("1");
        let b = AnnotationId::new("2");
        let run_a = engine.registry().get(&a)[0];
        let run_b = engine.registry().get(&b)[0];

        engine.click(Some(run_a));
        let inner_b = engine.tree().markup(run_b).unwrap().inner().unwrap();
        assert_eq!(engine.click(Some(inner_b)), ClickOutcome::Selected(b.clone()));

        assert!(engine.tree().markup(run_a).unwrap().classes.is_empty());
        assert!(engine.tree().markup(run_b).unwrap().has_class("annotation-start"));
        assert!(engine.selection_state().is_selected(&b));
    }

    #[test]
    fn test_delete_round_trip() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[wire(1, "Strikeout", vec![3, 7])]);
        let id = AnnotationId::new("1");

        assert!(!engine.request_delete());
        assert!(engine.select(&id));
        assert!(engine.request_delete());
        assert_eq!(engine.port().last(), Some(&HostRequest::Delete { id: id.clone() }));
        assert!(engine.registry().contains(&id));

        assert_eq!(engine.on_delete_confirmed(&id).unwrap(), Confirmation::Applied);
        assert!(!engine.registry().contains(&id));
        assert!(engine.record(&id).is_none());
        assert!(engine.tree().markup_nodes(&id).is_empty());
        assert_eq!(engine.render_html(), "<p>Hello world</p>");
    }

    #[test]
    fn test_restyle_round_trip() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[wire(1, "Underline", vec![0, 4])]);
        let id = AnnotationId::new("1");
        let run = engine.registry().get(&id)[0];
        engine.select(&id);

        assert!(engine.request_restyle(Rgb::new(0, 0, 255), 0.25));
        assert_eq!(
            engine.port().last(),
            Some(&HostRequest::Restyle {
                id: id.clone(),
                color: "0000FF".to_string(),
                opacity: 0.25,
            })
        );
        assert_eq!(engine.record(&id).unwrap().style.color, Rgb::new(0, 0, 255));
        assert!(engine.tree().markup(run).unwrap().style.contains("255, 255, 0"));

        assert_eq!(
            engine.on_restyle_confirmed(&AnnotationId::new("2")).unwrap(),
            Confirmation::Mismatched
        );
        assert_eq!(engine.on_restyle_confirmed(&id).unwrap(), Confirmation::Applied);
        assert_eq!(
            engine.tree().markup(run).unwrap().style,
            "text-decoration: underline; color: rgba(0, 0, 255, 0.25)"
        );
    }

    #[test]
    fn test_create_round_trip() {
        let mut engine = engine(&["Hello world", "Goodbye"]);
        let paragraphs = engine.offsets().paragraphs().to_vec();
        let first = engine.tree().text_leaves(paragraphs[0])[0];
        let second = engine.tree().text_leaves(paragraphs[1])[0];
        let selection = Selection::new(Position::new(second, 4), Position::new(first, 6));

        let range = engine
            .request_create(selection, AnnotationKind::Highlight, Rgb::YELLOW, 0.5)
            .unwrap();

        assert_eq!(range, Some(6..15));
        let Some(HostRequest::Create { annotation }) = engine.port().last() else {
            panic!("expected a create request");
        };
        assert_eq!(annotation.id, None);
        assert_eq!(annotation.ranges, vec![6, 14]);
        assert!(engine.pending_create().is_some());

        let id = AnnotationId::new("77");
        assert_eq!(engine.on_create_confirmed(id.clone()).unwrap(), Confirmation::Applied);
        assert!(engine.pending_create().is_none());
        assert_eq!(engine.annotation_text(&id).as_deref(), Some("worldGood"));
        assert_eq!(
            engine.on_create_confirmed(AnnotationId::new("78")).unwrap(),
            Confirmation::Mismatched
        );
    }

    #[test]
    fn test_create_failure_discards_pending() {
        let mut engine = engine(&["Hello"]);
        let leaf = engine.tree().text_leaves(engine.offsets().paragraphs()[0])[0];
        let before = engine.render_html();

        engine
            .request_create(
                Selection::new(Position::new(leaf, 1), Position::new(leaf, 3)),
                AnnotationKind::Squiggly,
                Rgb::YELLOW,
                1.0,
            )
            .unwrap();

        assert!(engine.on_create_failed("quota exceeded"));
        assert!(engine.pending_create().is_none());
        assert!(!engine.on_create_failed("again"));
        assert_eq!(engine.render_html(), before);
    }

    #[test]
    fn test_collapsed_selection_creates_nothing() {
        let mut engine = engine(&["Hello"]);
        let leaf = engine.tree().text_leaves(engine.offsets().paragraphs()[0])[0];

        let range = engine
            .request_create(
                Selection::collapsed(Position::new(leaf, 2)),
                AnnotationKind::Highlight,
                Rgb::YELLOW,
                1.0,
            )
            .unwrap();

        assert_eq!(range, None);
        assert!(engine.port().requests().is_empty());
    }

    #[test]
    fn test_delete_confirmation_after_selection_moved() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[
            wire(1, "Highlight", vec![0, 3]),
            wire(2, "Underline", vec![6, 9]),
        ]);
        let first = AnnotationId::new("1");
        let second = AnnotationId::new("2");
        engine.select(&first);
        engine.request_delete();
        engine.select(&second);

        assert_eq!(engine.pending_delete(), Some(&first));
        assert_eq!(engine.on_delete_confirmed(&first).unwrap(), Confirmation::Applied);

        assert!(engine.record(&first).is_none());
        assert!(engine.pending_delete().is_none());
        assert!(engine.selection_state().is_selected(&second));
        assert_eq!(engine.on_delete_confirmed(&first).unwrap(), Confirmation::Mismatched);
    }

    #[test]
    fn test_restyle_confirmation_after_deselect() {
        let mut engine = engine(&["Hello world"]);
        engine.load_annotations(&[wire(1, "Highlight", vec![0, 4])]);
        let id = AnnotationId::new("1");
        let run = engine.registry().get(&id)[0];
        engine.select(&id);
        engine.request_restyle(Rgb::new(0, 255, 0), 0.5);
        engine.deselect();

        assert_eq!(engine.pending_restyle(), Some(&id));
        assert_eq!(engine.on_restyle_confirmed(&id).unwrap(), Confirmation::Applied);

        assert_eq!(
            engine.tree().markup(run).unwrap().style,
            "background-color: rgba(0, 255, 0, 0.5)"
        );
        assert!(engine.pending_restyle().is_none());
        assert_eq!(engine.on_restyle_confirmed(&id).unwrap(), Confirmation::Mismatched);
    }

    fn prerendered() -> AnnotationEngine {
        let tree = DocumentTree::from_blocks(&[
            BlockSpec::paragraph(vec![
                InlineSpec::text("Hello "),
                InlineSpec::element("span", vec![InlineSpec::text("world")]),
            ]),
            BlockSpec::paragraph(vec![
                InlineSpec::element(
                    "span",
                    vec![InlineSpec::element("span", vec![InlineSpec::text("Good")])],
                ),
                InlineSpec::text("bye"),
            ]),
        ])
        .unwrap();
        AnnotationEngine::new(tree, RecordingPort::new())
    }

    #[test]
    fn test_adopt_existing_wrappers() {
        let mut engine = prerendered();
        let nodes_before = engine.tree().node_count();

        let report = engine.adopt_annotations(&[
            wire(1, "Highlight", vec![6, 10]),
            wire(2, "Underline", vec![11, 14]),
            wire(3, "Highlight", vec![0, 3]),
        ]);

        let highlight = AnnotationId::new("1");
        let underline = AnnotationId::new("2");
        assert_eq!(report.rendered, vec![highlight.clone(), underline.clone()]);
        assert_eq!(report.empty, vec![AnnotationId::new("3")]);
        assert_eq!(engine.tree().node_count(), nodes_before);
        assert_eq!(engine.annotation_text(&highlight).as_deref(), Some("world"));
        assert_eq!(engine.annotation_text(&underline).as_deref(), Some("Good"));

        let run = engine.registry().get(&underline)[0];
        let markup = engine.tree().markup(run).unwrap();
        assert!(markup.style.starts_with("text-decoration: underline;"));
        let inner = markup.inner().unwrap();
        assert_eq!(engine.tree().markup(inner).unwrap().style, "color: #000000");
        assert_eq!(engine.tree().markup_nodes(&underline), vec![run]);
    }

    #[test]
    fn test_adopted_run_selects_and_deletes() {
        let mut engine = prerendered();
        engine.adopt_annotations(&[wire(1, "Highlight", vec![6, 10])]);
        let id = AnnotationId::new("1");
        let run = engine.registry().get(&id)[0];
        let leaf = engine.tree().children(run)[0];

        assert_eq!(engine.click(Some(leaf)), ClickOutcome::Selected(id.clone()));
        assert!(engine.request_delete());
        assert_eq!(engine.on_delete_confirmed(&id).unwrap(), Confirmation::Applied);

        let paragraph = engine.offsets().paragraphs()[0];
        assert_eq!(engine.tree().children(paragraph).len(), 1);
        assert_eq!(engine.tree().text_content(paragraph), "Hello world");
    }

    #[test]
    fn test_adopt_needs_a_dedicated_decoration_wrapper() {
        let tree = DocumentTree::from_blocks(&[BlockSpec::paragraph(vec![InlineSpec::element(
            "b",
            vec![
                InlineSpec::element("i", vec![InlineSpec::text("ab")]),
                InlineSpec::text("cd"),
            ],
        )])])
        .unwrap();
        let mut engine = AnnotationEngine::new(tree, RecordingPort::new());

        let report = engine.adopt_annotations(&[wire(1, "Squiggly", vec![0, 1])]);

        assert_eq!(report.empty, vec![AnnotationId::new("1")]);
        let tree = engine.tree();
        assert!(tree.preorder(tree.root_id()).iter().all(|&n| tree.markup(n).is_none()));
    }
}
