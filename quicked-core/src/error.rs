//! Error types for the QuickEd engine

use thiserror::Error;

/// Errors that can occur while configuring or running an alignment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuickedError {
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Band allocation failed ({cells} cells)")]
    AllocationFailure { cells: usize },

    #[error("Bound search exhausted after bound {bound} (cap {cap})")]
    BoundExhausted { bound: usize, cap: usize },

    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("No alignment available: {0}")]
    NoResult(&'static str),
}

impl QuickedError {
    pub fn invalid_sequence<S: Into<String>>(message: S) -> Self {
        Self::InvalidSequence(message.into())
    }

    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn invariant<S: Into<String>>(message: S) -> Self {
        Self::InternalInvariant(message.into())
    }

    /// Errors that must leave the previously cached result in place
    pub fn preserves_previous_result(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }
}

pub type QuickedResult<T> = Result<T, QuickedError>;

/// Reserve exactly `cells` entries, mapping allocator failure to an error.
pub(crate) fn try_alloc<T: Clone>(cells: usize, fill: T) -> QuickedResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(cells)
        .map_err(|_| QuickedError::AllocationFailure { cells })?;
    buffer.resize(cells, fill);
    Ok(buffer)
}
