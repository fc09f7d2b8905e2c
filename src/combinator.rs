//! Row Combinators
//!
//! Last stage of a decomposition: with the basis fixed, decide for every
//! original row which basis rows to OR together. Rows are independent of
//! each other, so [`Combinator::combine_matrix`] is a plain map over rows
//! (run on the rayon pool with the `parallel` feature).
//!
//! # Implementations
//!
//! - [`GreedyCombinator`]: builds each row from scratch, repeatedly adding
//!   the most useful remaining basis row
//! - [`Iter`]: flips bits of an existing combination while that does not
//!   increase the row error
//! - [`IdentityCombinator`]: keeps the incoming combination
//! - [`CombinatorPipeline`]: runs several combinators in sequence

use crate::cover::Cover;
use crate::error::{DecompositionError, Result};
use crate::matrix::TernMatrix;
use crate::ternary::Tern;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Computes the combination matrix for a fixed basis.
pub trait Combinator: Send + Sync {
    /// Combination row (length `basis.height()`) for one original row.
    ///
    /// `previous` is the combination obtained so far for this row; it is
    /// consumed and may be returned modified.
    fn combine_row(
        &self,
        row: &[Tern],
        previous: Vec<Tern>,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<Vec<Tern>>;

    /// Apply [`Combinator::combine_row`] to every row of `original`.
    ///
    /// # Errors
    ///
    /// [`DecompositionError::DimensionMismatch`] unless `previous` is
    /// `original.height() x basis.height()` and `basis` is as wide as
    /// `original`.
    fn combine_matrix(
        &self,
        original: &TernMatrix,
        previous: TernMatrix,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<TernMatrix> {
        if basis.width() != original.width() {
            return Err(DecompositionError::DimensionMismatch {
                operation: "combine_matrix",
                expected: (basis.height(), original.width()),
                got: basis.shape(),
            });
        }
        if previous.shape() != (original.height(), basis.height()) {
            return Err(DecompositionError::DimensionMismatch {
                operation: "combine_matrix",
                expected: (original.height(), basis.height()),
                got: previous.shape(),
            });
        }

        combine_rows(self, original, previous, basis, ones_weight)
    }
}

#[cfg(not(feature = "parallel"))]
fn combine_rows<C: Combinator + ?Sized>(
    combinator: &C,
    original: &TernMatrix,
    previous: TernMatrix,
    basis: &TernMatrix,
    ones_weight: f64,
) -> Result<TernMatrix> {
    let mut combination = previous;
    for r in 0..original.height() {
        let current = combination.row_slice(r).to_vec();
        let updated = combinator.combine_row(original.row_slice(r), current, basis, ones_weight)?;
        combination.set_row(r, &updated)?;
    }
    Ok(combination)
}

#[cfg(feature = "parallel")]
fn combine_rows<C: Combinator + ?Sized>(
    combinator: &C,
    original: &TernMatrix,
    previous: TernMatrix,
    basis: &TernMatrix,
    ones_weight: f64,
) -> Result<TernMatrix> {
    let rows = (0..original.height())
        .into_par_iter()
        .map(|r| {
            combinator.combine_row(
                original.row_slice(r),
                previous.row_slice(r).to_vec(),
                basis,
                ones_weight,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let mut combination = previous;
    for (r, row) in rows.iter().enumerate() {
        combination.set_row(r, row)?;
    }
    Ok(combination)
}

impl<C: Combinator + ?Sized> Combinator for Box<C> {
    fn combine_row(
        &self,
        row: &[Tern],
        previous: Vec<Tern>,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<Vec<Tern>> {
        (**self).combine_row(row, previous, basis, ones_weight)
    }
}

/// Rejects a row not as wide as `basis` or a combination row not as long as
/// `basis` is high.
fn check_row_shapes(operation: &'static str, row: &[Tern], previous: &[Tern], basis: &TernMatrix) -> Result<()> {
    if row.len() != basis.width() {
        return Err(DecompositionError::DimensionMismatch {
            operation,
            expected: (1, basis.width()),
            got: (1, row.len()),
        });
    }
    if previous.len() != basis.height() {
        return Err(DecompositionError::DimensionMismatch {
            operation,
            expected: (1, basis.height()),
            got: (1, previous.len()),
        });
    }
    Ok(())
}

/// Usefulness of including `pattern` into `cover` for `row`.
pub type Usefulness = fn(&Cover, &[Tern], &[Tern]) -> f64;

/// Greedy combination of one row, starting from nothing.
///
/// Repeatedly scores every basis row not yet taken, in index order, and takes
/// the first one with the highest score. Stops as soon as the best score is
/// not positive.
pub fn greedy_combine_row<F>(row: &[Tern], basis: &TernMatrix, ones_weight: f64, score: F) -> Vec<Tern>
where
    F: Fn(&Cover, &[Tern], &[Tern]) -> f64,
{
    let mut combination = vec![Tern::F; basis.height()];
    let mut cover = Cover::new(row.len(), ones_weight);
    loop {
        let mut best: Option<(usize, f64)> = None;
        for (k, pattern) in basis.rows().enumerate() {
            if combination[k].is_true() {
                continue;
            }
            let value = score(&cover, row, pattern);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((k, value));
            }
        }
        match best {
            Some((k, value)) if value > 0.0 => {
                cover.include(basis.row_slice(k));
                combination[k] = Tern::T;
            }
            _ => break,
        }
    }
    combination
}

/// Greedy combinator with a pluggable usefulness score.
#[derive(Clone, Copy)]
pub struct GreedyCombinator {
    name: &'static str,
    score: Usefulness,
}

impl GreedyCombinator {
    pub fn new(name: &'static str, score: Usefulness) -> Self {
        GreedyCombinator { name, score }
    }

    /// Scores by absolute weighted gain ("CoverGreedy").
    pub fn cover() -> Self {
        GreedyCombinator::new("CoverGreedy", Cover::cover_change_on_inclusion)
    }

    /// Scores by gain per unit of footprint ("DensityGreedy").
    pub fn density() -> Self {
        GreedyCombinator::new("DensityGreedy", Cover::cover_change_density_on_inclusion)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for GreedyCombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GreedyCombinator({})", self.name)
    }
}

impl Combinator for GreedyCombinator {
    fn combine_row(
        &self,
        row: &[Tern],
        previous: Vec<Tern>,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<Vec<Tern>> {
        // previous only fixes the shape; the row is rebuilt from scratch
        check_row_shapes("GreedyCombinator::combine_row", row, &previous, basis)?;
        Ok(greedy_combine_row(row, basis, ones_weight, self.score))
    }
}

/// Bit-flipping local search on an existing combination.
///
/// Sweeps the basis rows in order. An excluded row is included if that
/// strictly lowers the row error; an included row is excluded if that does
/// not raise it. Stops after the first sweep without a flip. U entries of the
/// incoming combination are left alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iter {
    pub max_sweeps: usize,
}

impl Iter {
    pub const DEFAULT_MAX_SWEEPS: usize = 1000;

    pub fn new(max_sweeps: usize) -> Self {
        Iter { max_sweeps }
    }
}

impl Default for Iter {
    fn default() -> Self {
        Iter::new(Self::DEFAULT_MAX_SWEEPS)
    }
}

impl Combinator for Iter {
    fn combine_row(
        &self,
        row: &[Tern],
        mut previous: Vec<Tern>,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<Vec<Tern>> {
        check_row_shapes("Iter::combine_row", row, &previous, basis)?;
        let mut cover = Cover::new(row.len(), ones_weight);
        for (k, pattern) in basis.rows().enumerate() {
            if previous[k].is_true() {
                cover.include(pattern);
            }
        }

        let mut sweeps = 0;
        loop {
            if sweeps == self.max_sweeps {
                return Err(DecompositionError::NonConvergence {
                    algorithm: "Iter",
                    sweeps,
                });
            }
            sweeps += 1;
            let mut changed = false;
            for (k, pattern) in basis.rows().enumerate() {
                match previous[k] {
                    Tern::F if cover.cover_change_on_inclusion(row, pattern) > 0.0 => {
                        cover.include(pattern);
                        previous[k] = Tern::T;
                        changed = true;
                    }
                    Tern::T if cover.cover_change_on_exclusion(row, pattern) >= 0.0 => {
                        cover.exclude(pattern);
                        previous[k] = Tern::F;
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return Ok(previous);
            }
        }
    }
}

/// Returns the incoming combination unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityCombinator;

impl Combinator for IdentityCombinator {
    fn combine_row(
        &self,
        _row: &[Tern],
        previous: Vec<Tern>,
        _basis: &TernMatrix,
        _ones_weight: f64,
    ) -> Result<Vec<Tern>> {
        Ok(previous)
    }
}

/// Runs combinators one after another on each row.
#[derive(Default)]
pub struct CombinatorPipeline {
    stages: Vec<Box<dyn Combinator>>,
}

impl CombinatorPipeline {
    pub fn new(stages: Vec<Box<dyn Combinator>>) -> Self {
        CombinatorPipeline { stages }
    }

    /// Append a stage.
    pub fn then<C: Combinator + 'static>(mut self, stage: C) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Combinator for CombinatorPipeline {
    fn combine_row(
        &self,
        row: &[Tern],
        previous: Vec<Tern>,
        basis: &TernMatrix,
        ones_weight: f64,
    ) -> Result<Vec<Tern>> {
        self.stages
            .iter()
            .try_fold(previous, |current, stage| stage.combine_row(row, current, basis, ones_weight))
    }
}
