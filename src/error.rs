use thiserror::Error;

use crate::core::status::RouteStatus;

/// Route rule violations. Storage and I/O failures travel as `anyhow::Error`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Cannot start route {code}: route is {status}")]
    CannotStart { code: String, status: RouteStatus },

    #[error("Cannot end route {code}: route is {status}")]
    CannotEnd { code: String, status: RouteStatus },

    #[error("Unknown circuit: {0}")]
    UnknownCircuit(String),

    #[error("Stop {index} is out of range for circuit {code} ({len} stops)")]
    StopOutOfRange { code: String, index: usize, len: usize },
}
