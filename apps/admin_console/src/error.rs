use client_core::TransportError;
use thiserror::Error;

use crate::page::PageError;

/// Failures that stop an action before or outside the request cycle.
/// Server and network errors an action already surfaced on the page are
/// reported through its outcome instead.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no konnektor selected for deletion")]
    NoDeleteTarget,
}
