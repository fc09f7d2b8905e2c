//! Candidate Generators
//!
//! First stage of a decomposition: propose basis patterns. Each generator
//! maps the original matrix (and the target dimension, which most ignore) to
//! a matrix whose rows are candidate patterns. Candidates never contain U.

use crate::error::{DecompositionError, Result};
use crate::matrix::TernMatrix;
use crate::ternary::Tern;
use std::collections::BTreeSet;
use tracing::debug;

/// Produces candidate basis rows from an original matrix.
pub trait CandidateGenerator: Send + Sync {
    fn generate_candidates(&self, original: &TernMatrix, dimension: usize) -> TernMatrix;
}

/// One candidate per original row, with U replaced by F.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityGenerator;

impl CandidateGenerator for IdentityGenerator {
    fn generate_candidates(&self, original: &TernMatrix, _dimension: usize) -> TernMatrix {
        original.map(|t| Tern::from_bool(t.is_true()))
    }
}

/// Column-implication candidates.
///
/// For columns `r` and `c`, let `ones` be the number of rows with T in `r`
/// and `implications` those among them with T in `c` as well. Candidate `r`
/// has T at `c` iff `implications > confidence * ones`. The result is
/// `width x width`.
#[derive(Clone, Copy, Debug)]
pub struct AssociationGenerator {
    confidence: f64,
}

impl AssociationGenerator {
    /// `confidence` must lie strictly between 0 and 1.
    pub fn new(confidence: f64) -> Result<Self> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(DecompositionError::InvalidParameter {
                name: "confidence",
                value: confidence,
            });
        }
        Ok(AssociationGenerator { confidence })
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

impl CandidateGenerator for AssociationGenerator {
    fn generate_candidates(&self, original: &TernMatrix, _dimension: usize) -> TernMatrix {
        let w = original.width();
        // co[r][c] = #rows with T in both r and c; co[r][r] = #rows with T in r
        let mut co = vec![0usize; w * w];
        let mut trues = Vec::with_capacity(w);
        for row in original.rows() {
            trues.clear();
            trues.extend((0..w).filter(|&c| row[c].is_true()));
            for &r in &trues {
                for &c in &trues {
                    co[r * w + c] += 1;
                }
            }
        }
        let result = TernMatrix::from_fn(w, w, |r, c| {
            let ones = co[r * w + r] as f64;
            let implications = co[r * w + c] as f64;
            Tern::from_bool(implications > self.confidence * ones)
        });
        debug!(
            confidence = self.confidence,
            candidates = result.height(),
            density = result.density(),
            "association candidates"
        );
        result
    }
}

/// All pairwise T-intersections of original rows: `height²` candidates,
/// candidate `i * height + j` intersecting rows `i` and `j`.
///
/// Quadratic in the number of rows; only practical for small inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntersectionGenerator;

impl CandidateGenerator for IntersectionGenerator {
    fn generate_candidates(&self, original: &TernMatrix, _dimension: usize) -> TernMatrix {
        let h = original.height();
        let w = original.width();
        TernMatrix::from_fn(h * h, w, |r, c| {
            let (i, j) = (r / h, r % h);
            Tern::from_bool(original[(i, c)].is_true() && original[(j, c)].is_true())
        })
    }
}

/// Pairs each row with its best-overlapping available partner: exactly
/// `height` candidates.
///
/// Rows are visited in order. Row `i` picks, among the rows still available
/// and different from `i`, the one sharing the most T columns with it (later
/// rows win ties). Without a partner the row is paired with itself. Both rows
/// of a pair stop being available.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestrictedIntersectionGenerator;

impl CandidateGenerator for RestrictedIntersectionGenerator {
    fn generate_candidates(&self, original: &TernMatrix, _dimension: usize) -> TernMatrix {
        let h = original.height();
        let w = original.width();
        let mut available: BTreeSet<usize> = (0..h).collect();
        let mut result = TernMatrix::new(h, w);
        for i in 0..h {
            let row_i = original.row_slice(i);
            let mut best = i;
            let mut best_overlap = 0usize;
            for &j in available.iter().filter(|&&j| j != i) {
                let overlap = row_i
                    .iter()
                    .zip(original.row_slice(j))
                    .filter(|(a, b)| a.is_true() && b.is_true())
                    .count();
                if overlap >= best_overlap {
                    best_overlap = overlap;
                    best = j;
                }
            }
            let row_best = original.row_slice(best);
            for (c, dst) in result.row_slice_mut(i).iter_mut().enumerate() {
                *dst = Tern::from_bool(row_i[c].is_true() && row_best[c].is_true());
            }
            available.remove(&i);
            available.remove(&best);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> TernMatrix {
        s.parse().expect("valid matrix literal")
    }

    #[test]
    fn test_identity_replaces_unknowns() {
        let x = m("1?0\n??1\n010");
        let c = IdentityGenerator.generate_candidates(&x, 2);
        assert_eq!(c.shape(), x.shape());
        assert_eq!(c.to_string(), "100\n001\n010");
    }

    #[test]
    fn test_association_rejects_bad_confidence() {
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(
                AssociationGenerator::new(bad).is_err(),
                "confidence {} should be rejected",
                bad
            );
        }
        assert!(AssociationGenerator::new(0.5).is_ok());
    }

    #[test]
    fn test_association_implications() {
        // column 0 implies column 1 in 2 of 3 rows; column 1 implies column 0 in 2 of 2 rows
        let x = m("110\n110\n101\n001");
        let gen = AssociationGenerator::new(0.5).unwrap();
        let c = gen.generate_candidates(&x, 2);
        assert_eq!(c.shape(), (3, 3));
        // row 0: ones=3; col0 3>1.5, col1 2>1.5, col2 1>1.5 false
        assert_eq!(c.row(0).unwrap(), &[Tern::T, Tern::T, Tern::F]);
        // row 1: ones=2; col0 2>1, col1 2>1, col2 0
        assert_eq!(c.row(1).unwrap(), &[Tern::T, Tern::T, Tern::F]);
        // row 2: ones=2; col0 1>1 false, col1 0, col2 2>1
        assert_eq!(c.row(2).unwrap(), &[Tern::F, Tern::F, Tern::T]);

        let strict = AssociationGenerator::new(0.9).unwrap().generate_candidates(&x, 2);
        assert_eq!(strict.row(0).unwrap(), &[Tern::T, Tern::F, Tern::F]);
    }

    #[test]
    fn test_association_ignores_unknowns_and_empty_columns() {
        let x = m("?1\n??");
        let c = AssociationGenerator::new(0.5).unwrap().generate_candidates(&x, 1);
        assert_eq!(c.to_string(), "00\n01");
    }

    #[test]
    fn test_intersection_all_pairs() {
        let x = m("110\n011");
        let c = IntersectionGenerator.generate_candidates(&x, 1);
        assert_eq!(c.shape(), (4, 3));
        assert_eq!(c.to_string(), "110\n010\n010\n011");
    }

    #[test]
    fn test_restricted_intersection_pairs_best_overlap() {
        let x = m("1100\n0011\n1110\n0111");
        let c = RestrictedIntersectionGenerator.generate_candidates(&x, 2);
        assert_eq!(c.shape(), (4, 4));
        // row 0 overlaps row 2 most (2 columns) -> 1100
        assert_eq!(c.row(0).unwrap(), &[Tern::T, Tern::T, Tern::F, Tern::F]);
        // row 1 picks from {1, 3}: overlap with 3 is 2 -> 0011
        assert_eq!(c.row(1).unwrap(), &[Tern::F, Tern::F, Tern::T, Tern::T]);
        // row 2 has no partner left -> itself
        assert_eq!(c.row(2).unwrap(), &[Tern::T, Tern::T, Tern::T, Tern::F]);
        // row 3 likewise
        assert_eq!(c.row(3).unwrap(), &[Tern::F, Tern::T, Tern::T, Tern::T]);
    }

    #[test]
    fn test_generators_on_all_false() {
        let x = TernMatrix::new(3, 4);
        assert!(IdentityGenerator.generate_candidates(&x, 2).is_all_false());
        assert!(AssociationGenerator::new(0.3)
            .unwrap()
            .generate_candidates(&x, 2)
            .is_all_false());
        assert!(IntersectionGenerator.generate_candidates(&x, 2).is_all_false());
        assert!(RestrictedIntersectionGenerator
            .generate_candidates(&x, 2)
            .is_all_false());
    }
}
