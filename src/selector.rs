//! Basis Selection by Local Search
//!
//! Second stage of a decomposition: choose `dimension` of the candidate rows
//! as the basis. The combination matrix that falls out of the search is
//! returned alongside and may seed the combinator stage.
//!
//! Both selectors share one swap step. Candidates are kept in a random
//! permutation whose first `dimension` entries are the current basis. For
//! slot `b` the occupant is taken out of every row cover it contributes to,
//! then each unselected candidate is scored by
//!
//! ```text
//! gain(cand) = Σ_{r ∈ relevant(cand)} max(0, cover[r].cover_change_on_inclusion(A[r], cand))
//! ```
//!
//! and the best one replaces the occupant if it scores strictly higher than
//! the occupant itself. Whichever pattern ends up in the slot is re-included
//! in every relevant row where it still helps.
//!
//! `relevant(cand)` lists the rows where the candidate has positive cover
//! density against an empty cover; it is computed once per search.

use crate::cover::Cover;
use crate::error::{DecompositionError, Result};
use crate::matrix::TernMatrix;
use crate::ternary::Tern;
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Output of a basis selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// `height x dimension`
    pub combination: TernMatrix,
    /// `dimension x width`, each row copied from the candidates
    pub basis: TernMatrix,
}

/// Chooses a basis among candidate rows.
pub trait BasisSelector: Send + Sync {
    /// Pick `dimension` rows of `candidates` as a basis for `original`.
    ///
    /// Randomness is drawn from `rng` only, so a seeded generator makes the
    /// result reproducible.
    ///
    /// # Errors
    ///
    /// - [`DecompositionError::DimensionTooHigh`] if `dimension` exceeds the
    ///   number of candidates
    /// - [`DecompositionError::DimensionMismatch`] if candidates and original
    ///   differ in width
    fn select_basis(
        &self,
        candidates: &TernMatrix,
        original: &TernMatrix,
        dimension: usize,
        ones_weight: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Selection>;
}

/// Single sweep over the basis slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreedySelector;

impl BasisSelector for GreedySelector {
    fn select_basis(
        &self,
        candidates: &TernMatrix,
        original: &TernMatrix,
        dimension: usize,
        ones_weight: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Selection> {
        let mut search = SwapSearch::new(candidates, original, dimension, ones_weight, rng)?;
        let swaps = search.sweep();
        debug!(selector = "Greedy", dimension, swaps, "basis selected");
        search.finish()
    }
}

/// Sweeps until a full pass over the slots swaps nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastLoc {
    /// Upper bound on sweeps before giving up with
    /// [`DecompositionError::NonConvergence`]
    pub max_sweeps: usize,
}

impl FastLoc {
    pub const DEFAULT_MAX_SWEEPS: usize = 1000;

    pub fn new(max_sweeps: usize) -> Self {
        FastLoc { max_sweeps }
    }
}

impl Default for FastLoc {
    fn default() -> Self {
        FastLoc::new(Self::DEFAULT_MAX_SWEEPS)
    }
}

impl BasisSelector for FastLoc {
    fn select_basis(
        &self,
        candidates: &TernMatrix,
        original: &TernMatrix,
        dimension: usize,
        ones_weight: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Selection> {
        let mut search = SwapSearch::new(candidates, original, dimension, ones_weight, rng)?;
        self.converge(&mut search)?;
        search.finish()
    }
}

impl FastLoc {
    /// Sweeps `search` until nothing moves; returns the number of sweeps.
    fn converge(&self, search: &mut SwapSearch<'_>) -> Result<usize> {
        let mut sweeps = 0;
        let mut total_swaps = 0;
        loop {
            if sweeps == self.max_sweeps {
                return Err(DecompositionError::NonConvergence {
                    algorithm: "FastLoc",
                    sweeps,
                });
            }
            let swaps = search.sweep();
            sweeps += 1;
            total_swaps += swaps;
            trace!(sweep = sweeps, swaps, "FastLoc sweep");
            if swaps == 0 {
                break;
            }
        }
        debug!(
            selector = "FastLoc",
            dimension = search.dimension,
            sweeps,
            swaps = total_swaps,
            "basis selected"
        );
        Ok(sweeps)
    }
}

/// Mutable state of one selection run.
struct SwapSearch<'a> {
    candidates: &'a TernMatrix,
    original: &'a TernMatrix,
    dimension: usize,
    /// Candidate indices; `permutation[..dimension]` is the basis
    permutation: Vec<usize>,
    /// One cover per original row
    covers: Vec<Cover>,
    /// Original rows each candidate can improve, per candidate index
    relevant: Vec<Vec<usize>>,
    combination: TernMatrix,
}

impl<'a> SwapSearch<'a> {
    fn new(
        candidates: &'a TernMatrix,
        original: &'a TernMatrix,
        dimension: usize,
        ones_weight: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self> {
        if dimension > candidates.height() {
            return Err(DecompositionError::DimensionTooHigh {
                requested: dimension,
                available: candidates.height(),
            });
        }
        if candidates.width() != original.width() {
            return Err(DecompositionError::DimensionMismatch {
                operation: "select_basis",
                expected: (candidates.height(), original.width()),
                got: candidates.shape(),
            });
        }

        let w = original.width();
        let h = original.height();
        let mut permutation: Vec<usize> = (0..candidates.height()).collect();
        permutation.shuffle(rng);

        let empty = Cover::new(w, ones_weight);
        let relevant: Vec<Vec<usize>> = candidates
            .rows()
            .map(|pattern| {
                (0..h)
                    .filter(|&r| empty.cover_change_density_on_inclusion(original.row_slice(r), pattern) > 0.0)
                    .collect()
            })
            .collect();

        Ok(SwapSearch {
            candidates,
            original,
            dimension,
            permutation,
            covers: vec![empty; h],
            relevant,
            combination: TernMatrix::new(h, dimension),
        })
    }

    /// One pass over all slots; returns the number of swaps made.
    fn sweep(&mut self) -> usize {
        (0..self.dimension).filter(|&slot| self.step(slot)).count()
    }

    fn step(&mut self, slot: usize) -> bool {
        let candidates = self.candidates;
        let original = self.original;

        let occupant = candidates.row_slice(self.permutation[slot]);
        for (r, cover) in self.covers.iter_mut().enumerate() {
            if self.combination[(r, slot)].is_true() {
                self.combination[(r, slot)] = Tern::F;
                cover.exclude(occupant);
            }
        }

        let mut best_index = slot;
        let mut best_gain = self.gain(self.permutation[slot]);
        for alternative in self.dimension..self.permutation.len() {
            let gain = self.gain(self.permutation[alternative]);
            if gain > best_gain {
                best_gain = gain;
                best_index = alternative;
            }
        }

        let swapped = best_index != slot;
        if swapped {
            trace!(
                slot,
                from = self.permutation[slot],
                to = self.permutation[best_index],
                gain = best_gain,
                "swap"
            );
            self.permutation.swap(slot, best_index);
        }

        let chosen = self.permutation[slot];
        let pattern = candidates.row_slice(chosen);
        for &r in &self.relevant[chosen] {
            let cover = &mut self.covers[r];
            if cover.cover_change_on_inclusion(original.row_slice(r), pattern) > 0.0 {
                cover.include(pattern);
                self.combination[(r, slot)] = Tern::T;
            }
        }
        swapped
    }

    fn gain(&self, candidate: usize) -> f64 {
        let pattern = self.candidates.row_slice(candidate);
        self.relevant[candidate]
            .iter()
            .map(|&r| {
                self.covers[r]
                    .cover_change_on_inclusion(self.original.row_slice(r), pattern)
                    .max(0.0)
            })
            .sum()
    }

    fn finish(self) -> Result<Selection> {
        let basis = self.candidates.select_rows(&self.permutation[..self.dimension])?;
        Ok(Selection {
            combination: self.combination,
            basis,
        })
    }
}
