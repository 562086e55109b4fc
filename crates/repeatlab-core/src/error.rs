//! Error type shared by every repeatlab-core component.

use thiserror::Error;

/// Errors raised at the API boundary of the sampler, aggregator, and sequence catalog.
///
/// All of these are deterministic input errors. Nothing here is transient, so
/// callers should not retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid sequence {sequence:?}: {reason}")]
    InvalidSequence { sequence: String, reason: String },

    #[error("sequence space {alphabet_size}^{length} is too large to enumerate")]
    CatalogTooLarge { alphabet_size: usize, length: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
