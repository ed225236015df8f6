// Snapshot consumers: results log file and the dashboard hand-off channel.

mod channel;
mod log_file;

pub use channel::ChannelSink;
pub use log_file::{
    LOG_DELIMITER, LOG_QUEUE_CAPACITY, LogFileSink, LogWriter, render_log_block, render_record,
};

use thiserror::Error;

use crate::models::Snapshot;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("receiver closed")]
    Closed,

    #[error("writer backlog full, record dropped")]
    Backlog,
}

/// Receives every emitted snapshot. Called on the scheduler task, so implementations must
/// return promptly: copy or enqueue, never wait on a consumer.
pub trait SnapshotSink: Send {
    fn name(&self) -> &str;

    fn accept(&mut self, snapshot: &Snapshot) -> Result<(), SinkError>;
}
