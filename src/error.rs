//! Errors raised while building a sentinel from its props.

use thiserror::Error;

/// Invalid [`InfiniteLoadingProps`](crate::primitives::InfiniteLoadingProps).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropsError {
    #[error("offset must be a finite number of rows, got {0}")]
    NonFiniteOffset(f32),
    #[error("extra class name must not be empty")]
    EmptyClassName,
}
