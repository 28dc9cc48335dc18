use thiserror::Error;

/// Errors surfaced to callers.
///
/// Structural problems inside an algorithm (unknown rule names, digrams at a
/// list boundary) are invariant breaches, not recoverable conditions; those
/// panic instead of appearing here.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum Error {
    /// A grammar needs at least one terminal.
    #[error("input is empty; cannot induce a grammar from nothing")]
    EmptyInput,

    /// Similarity thresholds must fall in (0, 1].
    #[error("similarity threshold {0} is outside (0, 1]")]
    InvalidThreshold(f64),

    /// Cluster epsilons must fall in (0, 1].
    #[error("cluster epsilon {0} is outside (0, 1]")]
    InvalidEpsilon(f64),
}
