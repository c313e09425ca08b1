use std::collections::HashMap;

use driftboard_shared::{SegmentError, ServerMessage, StrokeSegment};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::history::SessionHistory;

pub type PeerSender = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("rejected segment: {0}")]
    Invalid(#[from] SegmentError),
    #[error("connection {0} is not connected to this hub")]
    NotConnected(Uuid),
}

/// Outcome of an accepted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub position: usize,
    pub recipients: usize,
}

/// Serializes every append for one session and fans segments out to peers.
///
/// History and peer registry sit behind a single lock, so a connecting peer
/// either sees a segment in its history snapshot or receives it live, never
/// both and never neither.
pub struct Hub {
    inner: Mutex<HubInner>,
}

struct HubInner {
    history: SessionHistory,
    peers: HashMap<Uuid, PeerSender>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HubInner {
                history: SessionHistory::new(),
                peers: HashMap::new(),
            }),
        }
    }

    /// Queues the full history on `tx` and registers it for live fan-out.
    /// Returns the number of segments in the snapshot, or `None` if the
    /// receiving side is already gone.
    pub async fn connect(&self, connection_id: Uuid, tx: PeerSender) -> Option<usize> {
        let mut inner = self.inner.lock().await;
        let segments = inner.history.snapshot();
        let count = segments.len();
        tx.send(ServerMessage::LoadDrawings { segments }).ok()?;
        inner.peers.insert(connection_id, tx);
        Some(count)
    }

    /// Returns the number of peers still registered.
    pub async fn disconnect(&self, connection_id: Uuid) -> usize {
        let mut inner = self.inner.lock().await;
        inner.peers.remove(&connection_id);
        inner.peers.len()
    }

    pub async fn submit(
        &self,
        sender: Uuid,
        segment: StrokeSegment,
    ) -> Result<Delivery, SubmitError> {
        let segment = segment.validated()?;
        let mut inner = self.inner.lock().await;
        if !inner.peers.contains_key(&sender) {
            return Err(SubmitError::NotConnected(sender));
        }
        let position = inner.history.append(segment.clone());
        let recipients = broadcast_except(&mut inner.peers, sender, ServerMessage::Draw(segment));
        Ok(Delivery {
            position,
            recipients,
        })
    }

    #[cfg(test)]
    pub async fn history(&self) -> Vec<StrokeSegment> {
        self.inner.lock().await.history.snapshot()
    }

    pub async fn peer_count(&self) -> usize {
        self.inner.lock().await.peers.len()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Best-effort delivery: peers whose channel has closed are dropped silently.
fn broadcast_except(
    peers: &mut HashMap<Uuid, PeerSender>,
    sender: Uuid,
    message: ServerMessage,
) -> usize {
    let mut stale = Vec::new();
    let mut delivered = 0;
    for (id, tx) in peers.iter() {
        if *id == sender {
            continue;
        }
        if tx.send(message.clone()).is_err() {
            stale.push(*id);
        } else {
            delivered += 1;
        }
    }
    for id in stale {
        peers.remove(&id);
    }
    delivered
}
