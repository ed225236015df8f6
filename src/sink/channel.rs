// Hands snapshots to another task (the dashboard) through a watch channel; latest value wins.

use tokio::sync::watch;

use super::{SinkError, SnapshotSink};
use crate::models::Snapshot;

pub struct ChannelSink {
    name: String,
    tx: watch::Sender<Snapshot>,
}

impl ChannelSink {
    /// Creates the sink and the receiver end, seeded with `initial`.
    pub fn channel(name: impl Into<String>, initial: Snapshot) -> (Self, watch::Receiver<Snapshot>) {
        let (tx, rx) = watch::channel(initial);
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl SnapshotSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&mut self, snapshot: &Snapshot) -> Result<(), SinkError> {
        self.tx.send(snapshot.clone()).map_err(|_| SinkError::Closed)
    }
}
