pub mod engine;
pub mod error;
pub mod fanout;
pub mod probe;
pub mod snapshot;
pub mod state;

pub use engine::Monitor;
pub use error::SchedulerError;
pub use fanout::run_cycle;
pub use probe::{probe, ContentPattern};
pub use snapshot::SnapshotStore;
pub use state::{CycleResult, MonitorState, SiteResult};
