//! Incremental Coverage Tracker
//!
//! A [`Cover`] belongs to one row of the original matrix and records, per
//! column, how many currently included basis patterns predict T and how many
//! predict U there. From these counts the effect of including or excluding
//! one more pattern on that row's weighted reconstruction error follows in
//! O(width), without recomputing the reconstruction.
//!
//! # Sign convention
//!
//! A *cover change* is the decrease of reconstruction error: positive values
//! are improvements.
//!
//! - inclusion: `ones_weight * newly_covered_ones - newly_covered_zeros`
//! - exclusion: `uncovered_zeros - ones_weight * uncovered_ones`
//!
//! A T cell of the row counts as covered once at least one included pattern
//! is T there. An F cell counts as (wrongly) covered once any included
//! pattern is non-F there.

use crate::ternary::Tern;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Density returned when a pattern touches no relevant cell of the row.
pub const NO_FOOTPRINT: f64 = -1.0;

/// Number of row cells whose coverage state would flip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverDelta {
    /// T cells of the row
    pub ones: usize,
    /// F cells of the row
    pub zeros: usize,
}

impl CoverDelta {
    pub const fn new(ones: usize, zeros: usize) -> Self {
        CoverDelta { ones, zeros }
    }
}

/// Per-row multiset of included basis patterns, projected onto columns.
#[derive(Clone, PartialEq)]
pub struct Cover {
    ones_weight: f64,
    trues: Vec<u32>,
    unknowns: Vec<u32>,
}

impl Cover {
    /// Empty cover for rows of `width` columns.
    pub fn new(width: usize, ones_weight: f64) -> Self {
        Cover {
            ones_weight,
            trues: vec![0; width],
            unknowns: vec![0; width],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.trues.len()
    }

    #[inline]
    pub fn ones_weight(&self) -> f64 {
        self.ones_weight
    }

    /// `(#T, #U)` of the included patterns at column `c`.
    #[inline]
    pub fn counts(&self, c: usize) -> (u32, u32) {
        (self.trues[c], self.unknowns[c])
    }

    /// True if nothing is included.
    pub fn is_empty(&self) -> bool {
        self.trues.iter().chain(&self.unknowns).all(|&n| n == 0)
    }

    /// Add one pattern to the cover.
    pub fn include(&mut self, pattern: &[Tern]) {
        assert_eq!(pattern.len(), self.width(), "Cover::include: width mismatch");
        for (c, &b) in pattern.iter().enumerate() {
            match b {
                Tern::T => self.trues[c] += 1,
                Tern::U => self.unknowns[c] += 1,
                Tern::F => {}
            }
        }
    }

    /// Remove one previously included pattern.
    ///
    /// # Panics
    ///
    /// Panics if the pattern was not included: a count would drop below zero.
    pub fn exclude(&mut self, pattern: &[Tern]) {
        assert_eq!(pattern.len(), self.width(), "Cover::exclude: width mismatch");
        for (c, &b) in pattern.iter().enumerate() {
            let slot = match b {
                Tern::T => &mut self.trues[c],
                Tern::U => &mut self.unknowns[c],
                Tern::F => continue,
            };
            assert!(
                *slot > 0,
                "Cover::exclude: pattern was not included (column {}, value {:?})",
                c,
                b
            );
            *slot -= 1;
        }
    }

    /// Cells of `row` that would become covered if `pattern` were included.
    pub fn covered_ones_and_zeros_on_inclusion(&self, row: &[Tern], pattern: &[Tern]) -> CoverDelta {
        debug_assert_eq!(row.len(), self.width());
        debug_assert_eq!(pattern.len(), self.width());
        let mut delta = CoverDelta::default();
        for c in 0..self.width() {
            match row[c] {
                Tern::T if self.trues[c] == 0 && pattern[c].is_true() => delta.ones += 1,
                Tern::F if self.trues[c] == 0 && self.unknowns[c] == 0 && !pattern[c].is_false() => {
                    delta.zeros += 1
                }
                _ => {}
            }
        }
        delta
    }

    /// Cells of `row` that would lose their only covering pattern if
    /// `pattern` were excluded.
    pub fn uncovered_ones_and_zeros_on_exclusion(&self, row: &[Tern], pattern: &[Tern]) -> CoverDelta {
        debug_assert_eq!(row.len(), self.width());
        debug_assert_eq!(pattern.len(), self.width());
        let mut delta = CoverDelta::default();
        for c in 0..self.width() {
            let (t, u) = (self.trues[c], self.unknowns[c]);
            match (row[c], pattern[c]) {
                (Tern::T, Tern::T) if t == 1 => delta.ones += 1,
                (Tern::F, Tern::T) if t == 1 && u == 0 => delta.zeros += 1,
                (Tern::F, Tern::U) if t == 0 && u == 1 => delta.zeros += 1,
                _ => {}
            }
        }
        delta
    }

    /// Weighted error decrease from including `pattern`.
    pub fn cover_change_on_inclusion(&self, row: &[Tern], pattern: &[Tern]) -> f64 {
        let d = self.covered_ones_and_zeros_on_inclusion(row, pattern);
        self.ones_weight * d.ones as f64 - d.zeros as f64
    }

    /// Weighted error decrease from excluding `pattern`.
    pub fn cover_change_on_exclusion(&self, row: &[Tern], pattern: &[Tern]) -> f64 {
        let d = self.uncovered_ones_and_zeros_on_exclusion(row, pattern);
        d.zeros as f64 - self.ones_weight * d.ones as f64
    }

    /// Inclusion gain per unit of weighted footprint, in `[-1, 1]`, or
    /// [`NO_FOOTPRINT`] when the pattern would change nothing.
    pub fn cover_change_density_on_inclusion(&self, row: &[Tern], pattern: &[Tern]) -> f64 {
        let d = self.covered_ones_and_zeros_on_inclusion(row, pattern);
        let ones = self.ones_weight * d.ones as f64;
        let denominator = ones + d.zeros as f64;
        if denominator == 0.0 {
            NO_FOOTPRINT
        } else {
            (ones - d.zeros as f64) / denominator
        }
    }

    /// Row predicted by the included patterns: T where any pattern is T,
    /// else U where any is U, else F.
    pub fn to_row(&self) -> Vec<Tern> {
        self.trues
            .iter()
            .zip(&self.unknowns)
            .map(|(&t, &u)| {
                if t > 0 {
                    Tern::T
                } else if u > 0 {
                    Tern::U
                } else {
                    Tern::F
                }
            })
            .collect()
    }
}

impl fmt::Debug for Cover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cover[w={}](", self.ones_weight)?;
        for (t, u) in self.trues.iter().zip(&self.unknowns) {
            write!(f, "({},{})", t, u)?;
        }
        write!(f, ")")
    }
}
