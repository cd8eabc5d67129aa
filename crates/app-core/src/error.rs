//! Engine error taxonomy. Every variant is recoverable: callers keep their
//! previous configuration and the frame loop keeps running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A mode-switch request named a mode that is not registered.
    #[error("unknown visualization mode: {0}")]
    UnknownMode(String),
    /// A regeneration request arrived while another update held the guard.
    #[error("graph update already in progress")]
    UpdateInProgress,
}
