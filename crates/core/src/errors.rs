//! Shared error taxonomy.
//!
//! Client-caused errors are separated from internal failures so the
//! transport can answer protocol misuse with a 4xx instead of masking it as
//! a server fault. Oracle failures never reach the caller at all; they are
//! converted to a fallback utterance at the oracle boundary.

use thiserror::Error;

/// Protocol misuse by the caller. Rejected before any collaborator is
/// touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("sessionId is required")]
    MissingSessionId,
}

/// Internal failure while talking to the language-model oracle. Logged and
/// masked into a fallback utterance; never propagated to the dialogue
/// layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Transport(String),
    #[error("oracle response could not be decoded: {0}")]
    Decode(String),
    #[error("oracle response contained no choices")]
    EmptyResponse,
}
