//! ternfactor - Approximate Boolean Matrix Decomposition
//!
//! Copyright (c) 2025 Ternfactor Contributors
//! Licensed under MIT License
//!
//! Factors a matrix of three-valued booleans (F / U / T) into a combination
//! matrix `C` and a basis matrix `B` whose boolean product approximates the
//! original. U cells are "don't care": they never count as errors. Missed T
//! cells cost `ones_weight`, wrongly covered F cells cost 1.
//!
//! A decomposition runs three pluggable stages:
//! - [`CandidateGenerator`]: proposes candidate basis rows
//! - [`BasisSelector`]: picks `dimension` of them by local search
//! - [`Combinator`]: decides per original row which basis rows to combine
//!
//! ```
//! use ternfactor::{Decomposition, TernMatrix};
//!
//! let original: TernMatrix = "1100\n0011\n1111\n1100".parse().unwrap();
//! let mut decomposition = Decomposition::best_unconfigured().with_seed(7);
//! let f = decomposition.decompose(&original, 2).unwrap();
//! assert_eq!(f.basis.shape(), (2, 4));
//! assert_eq!(f.combination.shape(), (4, 2));
//! ```

pub mod cli;
pub mod combinator;
pub mod config;
pub mod cover;
pub mod decomposition;
pub mod error;
pub mod generator;
pub mod matrix;
pub mod selector;
pub mod synthetic;
pub mod ternary;

// Re-export main types for convenience
pub use combinator::{
    greedy_combine_row, Combinator, CombinatorPipeline, GreedyCombinator, IdentityCombinator, Iter,
};
pub use config::{CombinatorConfig, DecompositionConfig, GeneratorConfig, SelectorConfig};
pub use cover::{Cover, CoverDelta, NO_FOOTPRINT};
pub use decomposition::{Decomposition, Factorization};
pub use error::{DecompositionError, Result};
pub use generator::{
    AssociationGenerator, CandidateGenerator, IdentityGenerator, IntersectionGenerator,
    RestrictedIntersectionGenerator,
};
pub use matrix::{scale_accumulate, AddOp, Confusion, ElementCounts, TernMatrix};
pub use selector::{BasisSelector, FastLoc, GreedySelector, Selection};
pub use ternary::Tern;
