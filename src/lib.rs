//! # lossify - grammar induction, reduction, and lossy simplification
//!
//! Infers a context-free grammar that compactly regenerates an input
//! sequence (Sequitur), then optionally shrinks it exactly or simplifies it
//! lossily.
//!
//! Induction maintains two invariants online:
//! 1. **Digram uniqueness**: no pair of adjacent symbols occurs twice
//!    without overlapping
//! 2. **Rule utility**: every rule except the start rule is used at least
//!    twice
//!
//! The finalized [`Cfg`] supports memoized expansion and structural editing
//! (replace, inline, factor), on top of which sit the exact [`Reducer`] and
//! the lossy [`Similarity`]/[`Cluster`] engines, which merge rules whose
//! expansions are merely close in edit distance.
//!
//! ## Example
//!
//! ```
//! use lossify::{Reducer, Sequitur};
//!
//! let mut seq = Sequitur::new();
//! seq.extend("abcabcabc".chars());
//!
//! let cfg = seq.into_cfg().unwrap();
//! let mut reduced = Reducer::new(cfg).run();
//!
//! let restored: String = reduced.expand_start().into_iter().collect();
//! assert_eq!(restored, "abcabcabc");
//! ```
//!
//! ## Performance
//!
//! Induction is O(1) amortized per symbol over a slotmap arena. Reduction
//! and lossification are deliberately super-linear batch passes over the
//! finalized grammar.

mod cfg;
mod cfg_ops;
mod digram;
mod error;
mod grammar;
mod id_gen;
mod iter;
mod lossify;
mod reduce;
mod sequitur;
mod symbol;

#[cfg(test)]
mod tests;

pub use cfg::{Cfg, CfgSymbol};
pub use error::Error;
pub use iter::SequiturIter;
pub use lossify::{Cluster, Similarity, Strategy, DEFAULT_EPSILON, DEFAULT_THRESHOLD};
pub use reduce::Reducer;
pub use sequitur::{CompressionStats, Sequitur};
