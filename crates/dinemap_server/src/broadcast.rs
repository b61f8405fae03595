//! Broadcast dispatcher.

use crate::registry::{ConnectionRegistry, Frame};
use dinemap_protocol::SyncEvent;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Fans events out to every open connection.
///
/// Delivery is best effort and never blocks: connections that are not
/// open are skipped, and a connection whose send fails is logged and
/// unregistered. Nothing is retried or queued on the caller's behalf.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    /// Creates a broadcaster over `registry`.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Encodes `event` once and sends it to every open connection.
    pub fn broadcast(&self, event: &SyncEvent) {
        let frame: Frame = match event.encode() {
            Ok(text) => Arc::from(text),
            Err(e) => {
                error!(kind = event.kind(), error = %e, "failed to encode event, not broadcasting");
                return;
            }
        };

        let mut delivered = 0usize;
        let mut skipped = 0usize;
        let mut dropped = 0usize;

        self.registry.for_each(|id, sink| {
            if !sink.is_open() {
                skipped += 1;
                return;
            }
            match sink.send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(connection = %id, error = %e, "send failed, dropping connection");
                    self.registry.unregister(id);
                    dropped += 1;
                }
            }
        });

        debug!(
            kind = event.kind(),
            record = ?event.record_id(),
            delivered,
            skipped,
            dropped,
            "broadcast event"
        );
    }
}
