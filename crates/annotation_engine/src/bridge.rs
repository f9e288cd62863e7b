//! Inbound host messages
//!
//! The host answers engine requests, and pushes annotation lists, as JSON
//! objects tagged by an `event` field.

use crate::engine::{AnnotationEngine, Confirmation, LoadReport};
use crate::port::HostPort;
use crate::record::WireAnnotation;
use crate::Result;
use doc_model::AnnotationId;
use serde::{Deserialize, Serialize};

/// A message from the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostMessage {
    LoadAnnotations { annotations: Vec<WireAnnotation> },
    /// Annotations whose markup is already in the document
    AdoptAnnotations { annotations: Vec<WireAnnotation> },
    CreateConfirmed { id: AnnotationId },
    CreateFailed { reason: String },
    DeleteConfirmed { id: AnnotationId },
    RestyleConfirmed { id: AnnotationId },
}

/// What handling a host message did
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Loaded(LoadReport),
    Confirmation(Confirmation),
    /// Whether a pending create was discarded
    CreateDiscarded(bool),
}

impl<P: HostPort> AnnotationEngine<P> {
    /// Route one host message to the matching engine callback
    pub fn handle_host_message(&mut self, message: HostMessage) -> Result<Dispatched> {
        let dispatched = match message {
            HostMessage::LoadAnnotations { annotations } => {
                Dispatched::Loaded(self.load_annotations(&annotations))
            }
            HostMessage::AdoptAnnotations { annotations } => {
                Dispatched::Loaded(self.adopt_annotations(&annotations))
            }
            HostMessage::CreateConfirmed { id } => {
                Dispatched::Confirmation(self.on_create_confirmed(id)?)
            }
            HostMessage::CreateFailed { reason } => {
                Dispatched::CreateDiscarded(self.on_create_failed(&reason))
            }
            HostMessage::DeleteConfirmed { id } => {
                Dispatched::Confirmation(self.on_delete_confirmed(&id)?)
            }
            HostMessage::RestyleConfirmed { id } => {
                Dispatched::Confirmation(self.on_restyle_confirmed(&id)?)
            }
        };
        Ok(dispatched)
    }

    /// Parse and route one JSON host message
    pub fn handle_host_json(&mut self, json: &str) -> Result<Dispatched> {
        let message: HostMessage = serde_json::from_str(json)?;
        self.handle_host_message(message)
    }
}
