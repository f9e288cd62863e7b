//! Annotation registry: annotation id to the markup runs rendering it

use doc_model::{AnnotationId, NodeId};
use std::collections::HashMap;

/// Tracks which markup nodes render each annotation.
///
/// Node lists are kept in document order, so the first entry is the run
/// that starts the annotation and the last entry the run that ends it.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRegistry {
    entries: HashMap<AnnotationId, Vec<NodeId>>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the runs of an annotation, replacing any previous entry
    pub fn register(&mut self, id: AnnotationId, nodes: Vec<NodeId>) {
        self.entries.insert(id, nodes);
    }

    /// Runs of an annotation; empty if it is not registered
    pub fn get(&self, id: &AnnotationId) -> &[NodeId] {
        self.entries.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn first(&self, id: &AnnotationId) -> Option<NodeId> {
        self.get(id).first().copied()
    }

    pub fn last(&self, id: &AnnotationId) -> Option<NodeId> {
        self.get(id).last().copied()
    }

    /// Drop an annotation's entry, returning its runs
    pub fn clear(&mut self, id: &AnnotationId) -> Vec<NodeId> {
        self.entries.remove(id).unwrap_or_default()
    }

    /// Drop every entry, returning all runs
    pub fn clear_all(&mut self) -> Vec<(AnnotationId, Vec<NodeId>)> {
        self.entries.drain().collect()
    }

    /// Registered annotation ids, sorted
    pub fn ids(&self) -> Vec<AnnotationId> {
        let mut ids: Vec<AnnotationId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let mut registry = AnnotationRegistry::new();
        let id = AnnotationId::new("1");
        let nodes = vec![NodeId::new(), NodeId::new(), NodeId::new()];

        registry.register(id.clone(), nodes.clone());

        assert!(registry.contains(&id));
        assert_eq!(registry.get(&id), nodes.as_slice());
        assert_eq!(registry.first(&id), Some(nodes[0]));
        assert_eq!(registry.last(&id), Some(nodes[2]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_id_is_empty() {
        let registry = AnnotationRegistry::new();
        let id = AnnotationId::new("missing");

        assert!(registry.get(&id).is_empty());
        assert_eq!(registry.first(&id), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = AnnotationRegistry::new();
        let id = AnnotationId::new("1");
        registry.register(id.clone(), vec![NodeId::new()]);
        let replacement = vec![NodeId::new(), NodeId::new()];

        registry.register(id.clone(), replacement.clone());

        assert_eq!(registry.get(&id), replacement.as_slice());
    }

    #[test]
    fn test_clear() {
        let mut registry = AnnotationRegistry::new();
        let a = AnnotationId::new("a");
        let b = AnnotationId::new("b");
        let node = NodeId::new();
        registry.register(a.clone(), vec![node]);
        registry.register(b.clone(), vec![NodeId::new()]);

        assert_eq!(registry.clear(&a), vec![node]);
        assert!(!registry.contains(&a));
        assert!(registry.clear(&a).is_empty());
        assert_eq!(registry.ids(), vec![b]);

        assert_eq!(registry.clear_all().len(), 1);
        assert!(registry.is_empty());
    }
}
