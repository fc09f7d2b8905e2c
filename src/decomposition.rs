//! Decomposition Pipeline
//!
//! [`Decomposition`] chains the three stages:
//!
//! 1. the generator proposes candidate rows
//! 2. the selector picks `dimension` of them as the basis and derives an
//!    initial combination
//! 3. the combinator refines the combination row by row
//!
//! The result is a [`Factorization`] `(C, B)` with `C ⊗ B ≈ A`.

use crate::combinator::{Combinator, CombinatorPipeline, GreedyCombinator, Iter};
use crate::config::{validate_ones_weight, DecompositionConfig};
use crate::error::Result;
use crate::generator::{CandidateGenerator, IdentityGenerator};
use crate::matrix::TernMatrix;
use crate::selector::{BasisSelector, FastLoc, Selection};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Output of a decomposition: `combination ⊗ basis ≈ original`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factorization {
    /// `height x dimension`
    pub combination: TernMatrix,
    /// `dimension x width`
    pub basis: TernMatrix,
}

impl Factorization {
    pub fn dimension(&self) -> usize {
        self.basis.height()
    }

    /// Boolean (OR) product of the two factors.
    pub fn reconstruct(&self) -> Result<TernMatrix> {
        self.combination.boolean_product(&self.basis)
    }

    pub fn reconstruction_error(&self, original: &TernMatrix, ones_weight: f64) -> Result<f64> {
        original.reconstruction_error(&self.reconstruct()?, ones_weight)
    }

    pub fn relative_reconstruction_error(&self, original: &TernMatrix, ones_weight: f64) -> Result<f64> {
        original.relative_reconstruction_error(&self.reconstruct()?, ones_weight)
    }
}

/// Generator, selector and combinator with a weight and a random source.
pub struct Decomposition {
    generator: Box<dyn CandidateGenerator>,
    selector: Box<dyn BasisSelector>,
    combinator: Box<dyn Combinator>,
    ones_weight: f64,
    rng: StdRng,
    label: Option<String>,
}

impl Decomposition {
    /// Assemble a decomposition from components, seeded from OS entropy.
    ///
    /// Fails with `InvalidParameter` unless `ones_weight` is finite and
    /// positive.
    pub fn new(
        generator: Box<dyn CandidateGenerator>,
        selector: Box<dyn BasisSelector>,
        combinator: Box<dyn Combinator>,
        ones_weight: f64,
    ) -> Result<Self> {
        validate_ones_weight(ones_weight)?;
        Ok(Decomposition {
            generator,
            selector,
            combinator,
            ones_weight,
            rng: StdRng::from_entropy(),
            label: None,
        })
    }

    /// Build the components a configuration describes.
    pub fn from_config(config: &DecompositionConfig) -> Result<Self> {
        config.validate()?;
        let mut decomposition = Decomposition::new(
            config.generator.build()?,
            config.selector.build(config.max_sweeps),
            config.combinator.build(config.max_sweeps),
            config.ones_weight,
        )?;
        if let Some(seed) = config.seed {
            decomposition = decomposition.with_seed(seed);
        }
        decomposition.label = Some(config.label());
        Ok(decomposition)
    }

    /// Replace the random source with a seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Identity + FastLoc + Iter, weight 1.
    pub fn loc_iter() -> Self {
        Decomposition {
            generator: Box::new(IdentityGenerator),
            selector: Box::new(FastLoc::default()),
            combinator: Box::new(Iter::default()),
            ones_weight: 1.0,
            rng: StdRng::from_entropy(),
            label: Some(DecompositionConfig::loc_iter().label()),
        }
    }

    /// Association + Greedy, keeping the selector's combination.
    pub fn dbp(confidence: f64) -> Result<Self> {
        Self::from_config(&DecompositionConfig::dbp(confidence))
    }

    /// Identity + FastLoc + DensityGreedy + Iter, weight 1.
    pub fn best_unconfigured() -> Self {
        Decomposition {
            generator: Box::new(IdentityGenerator),
            selector: Box::new(FastLoc::default()),
            combinator: Box::new(
                CombinatorPipeline::default()
                    .then(GreedyCombinator::density())
                    .then(Iter::default()),
            ),
            ones_weight: 1.0,
            rng: StdRng::from_entropy(),
            label: Some(DecompositionConfig::best_unconfigured().label()),
        }
    }

    /// Association + FastLoc + DensityGreedy + Iter.
    pub fn best_configured(confidence: f64) -> Result<Self> {
        Self::from_config(&DecompositionConfig::best_configured(confidence))
    }

    pub fn ones_weight(&self) -> f64 {
        self.ones_weight
    }

    /// Display name such as `Identity+FastLoc+Iter`; `None` when assembled
    /// from bare components.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Factor `original` into `dimension` basis rows.
    ///
    /// # Errors
    ///
    /// Propagates selector and combinator errors, most notably
    /// `DimensionTooHigh` when the generator yields fewer than `dimension`
    /// candidates.
    pub fn decompose(&mut self, original: &TernMatrix, dimension: usize) -> Result<Factorization> {
        let candidates = self.generator.generate_candidates(original, dimension);
        debug!(
            height = original.height(),
            width = original.width(),
            candidates = candidates.height(),
            "generated candidates"
        );

        let Selection { combination, basis } =
            self.selector
                .select_basis(&candidates, original, dimension, self.ones_weight, &mut self.rng)?;

        let combination = self
            .combinator
            .combine_matrix(original, combination, &basis, self.ones_weight)?;

        let factorization = Factorization { combination, basis };
        let error = factorization.relative_reconstruction_error(original, self.ones_weight)?;
        info!(
            algorithm = self.label.as_deref().unwrap_or("custom"),
            dimension,
            relative_error = error,
            "decomposition finished"
        );
        Ok(factorization)
    }
}

impl std::fmt::Debug for Decomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decomposition")
            .field("label", &self.label)
            .field("ones_weight", &self.ones_weight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::IdentityCombinator;
    use crate::error::DecompositionError;
    use crate::selector::GreedySelector;

    fn m(s: &str) -> TernMatrix {
        s.parse().expect("valid matrix literal")
    }

    #[test]
    fn test_rejects_bad_ones_weight() {
        for bad in [0.0, -2.0, f64::NAN] {
            let result = Decomposition::new(
                Box::new(IdentityGenerator),
                Box::new(GreedySelector),
                Box::new(IdentityCombinator),
                bad,
            );
            assert!(matches!(
                result,
                Err(DecompositionError::InvalidParameter { name: "ones_weight", .. })
            ));
        }
    }

    #[test]
    fn test_all_false_matrix_has_zero_error() {
        let original = TernMatrix::new(4, 5);
        let mut d = Decomposition::loc_iter().with_seed(1);
        let f = d.decompose(&original, 2).unwrap();
        assert_eq!(f.combination.shape(), (4, 2));
        assert_eq!(f.basis.shape(), (2, 5));
        assert_eq!(f.reconstruction_error(&original, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_dimension() {
        let original = m("101\n010");
        let mut d = Decomposition::best_unconfigured().with_seed(5);
        let f = d.decompose(&original, 0).unwrap();
        assert_eq!(f.dimension(), 0);
        assert_eq!(f.combination.shape(), (2, 0));
        assert!(f.reconstruct().unwrap().is_all_false());
    }

    #[test]
    fn test_dimension_too_high_propagates() {
        let original = m("101\n010");
        let mut d = Decomposition::loc_iter().with_seed(5);
        assert!(matches!(
            d.decompose(&original, 3),
            Err(DecompositionError::DimensionTooHigh {
                requested: 3,
                available: 2
            })
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Decomposition::loc_iter().label(), Some("Identity+FastLoc+Iter"));
        assert_eq!(
            Decomposition::dbp(0.5).unwrap().label(),
            Some("Association[0.5]+Greedy+Identity")
        );
        let custom = Decomposition::new(
            Box::new(IdentityGenerator),
            Box::new(GreedySelector),
            Box::new(IdentityCombinator),
            1.0,
        )
        .unwrap();
        assert_eq!(custom.label(), None);
    }

    #[test]
    fn test_from_config_uses_seed() {
        let original = m("110010\n011001\n110011\n001100\n111111");
        let config = DecompositionConfig::loc_iter().with_seed(11);
        let a = Decomposition::from_config(&config)
            .unwrap()
            .decompose(&original, 3)
            .unwrap();
        let b = Decomposition::from_config(&config)
            .unwrap()
            .decompose(&original, 3)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dbp_rejects_bad_confidence() {
        assert!(Decomposition::dbp(0.0).is_err());
        assert!(Decomposition::best_configured(1.0).is_err());
    }
}
