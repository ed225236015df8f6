// Domain models: probe results and aggregated snapshots

mod duration;
mod probe;
mod snapshot;

pub use duration::format_duration;
pub use probe::{LeaseOutcome, ProbeKind, ProbeResult};
pub use snapshot::{RECENT_WINDOW, Snapshot};
