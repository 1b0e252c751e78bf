use thiserror::Error;

use huddle_net::NetError;
use huddle_store::StoreError;

/// Errors that stop the client from starting. Errors during a session are
/// surfaced as notices instead.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network setup failed: {0}")]
    Net(#[from] NetError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
