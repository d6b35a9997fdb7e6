use thiserror::Error;

use super::state::MonitorState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("cannot start monitor: it is {0}")]
    InvalidState(MonitorState),
    #[error("cannot start monitor with a zero interval")]
    ZeroInterval,
}
