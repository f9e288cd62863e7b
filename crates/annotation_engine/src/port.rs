//! Outbound messages to the host application
//!
//! Every annotation mutation is a request to the host, which owns the
//! persistent store and answers later with a confirmation. Requests are fire
//! and forget from the engine's point of view.

use crate::record::WireAnnotation;
use doc_model::AnnotationId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A request sent to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostRequest {
    /// Persist a new annotation; the host answers with its id
    Create { annotation: WireAnnotation },
    /// The user selected an annotation
    Selected { annotation: WireAnnotation },
    /// Delete an annotation
    Delete { id: AnnotationId },
    /// Change an annotation's color and opacity
    Restyle {
        id: AnnotationId,
        color: String,
        opacity: f32,
    },
}

/// Sink for host requests
pub trait HostPort {
    fn send(&mut self, request: HostRequest);
}

/// Port that keeps every request in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingPort {
    requests: Vec<HostRequest>,
}

impl RecordingPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[HostRequest] {
        &self.requests
    }

    pub fn last(&self) -> Option<&HostRequest> {
        self.requests.last()
    }

    /// Drain the recorded requests
    pub fn take(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl HostPort for RecordingPort {
    fn send(&mut self, request: HostRequest) {
        self.requests.push(request);
    }
}

/// Port that forwards requests over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelPort {
    sender: mpsc::UnboundedSender<HostRequest>,
}

impl ChannelPort {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn from_sender(sender: mpsc::UnboundedSender<HostRequest>) -> Self {
        Self { sender }
    }
}

impl HostPort for ChannelPort {
    fn send(&mut self, request: HostRequest) {
        if let Err(e) = self.sender.send(request) {
            tracing::warn!("Host channel closed, dropping request: {:?}", e.0);
        }
    }
}

impl<P: HostPort + ?Sized> HostPort for Box<P> {
    fn send(&mut self, request: HostRequest) {
        (**self).send(request)
    }
}
