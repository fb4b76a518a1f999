//! Typed canvas events

use crate::debounce::Debouncer;
use atlas_model::{DiagramId, GraphNode};
use std::time::Duration;
use tokio::sync::broadcast;

/// Events raised by the canvas and consumed by the navigator or tooling
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// A container was resized; `nodes` carries the affected nodes
    GroupResized {
        diagram_id: DiagramId,
        nodes: Vec<GraphNode>,
    },
    /// Preview requested for a node
    NodePreview { node_id: String },
    /// Run requested for a node
    NodeRun { node_id: String },
}

/// Broadcast bus with debounced resize notifications
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<CanvasEvent>,
    resize: Debouncer,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize, resize_window: Duration) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            resize: Debouncer::new(resize_window),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CanvasEvent> {
        self.tx.subscribe()
    }

    /// Publish `event`; returns `false` if it was debounced away
    ///
    /// An event published with no subscribers still counts as delivered.
    pub fn publish(&self, event: CanvasEvent) -> bool {
        if matches!(event, CanvasEvent::GroupResized { .. }) && !self.resize.admit() {
            tracing::debug!("group resize debounced");
            return false;
        }
        if self.tx.send(event).is_err() {
            tracing::trace!("canvas event without subscribers");
        }
        true
    }
}
