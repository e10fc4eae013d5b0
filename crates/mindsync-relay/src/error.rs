//! Relay error types.

use thiserror::Error;

/// Errors that can occur inside the change relay.
///
/// Only start-up failures are fatal to the relay process; per-event write
/// failures are logged and counted by the workers, never raised.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Client construction or feed setup failed.
    #[error("client error: {0}")]
    Client(#[from] mindsync_client::ClientError),

    /// An event's row image could not be keyed.
    #[error(transparent)]
    Id(#[from] mindsync_core::CoreError),
}
