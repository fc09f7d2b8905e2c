//! Decomposition Configuration
//!
//! Serializable description of a decomposition: which generator, selector
//! and combinator to run, with their parameters. A configuration is plain
//! data; [`Decomposition::from_config`](crate::Decomposition::from_config)
//! turns it into runnable components.
//!
//! ```json
//! {
//!   "generator": { "kind": "association", "confidence": 0.5 },
//!   "selector": { "kind": "fast_loc" },
//!   "combinator": {
//!     "kind": "pipeline",
//!     "stages": [{ "kind": "density_greedy" }, { "kind": "iter" }]
//!   },
//!   "ones_weight": 1.0,
//!   "seed": 42
//! }
//! ```

use crate::combinator::{Combinator, CombinatorPipeline, GreedyCombinator, IdentityCombinator, Iter};
use crate::error::{DecompositionError, Result};
use crate::generator::{
    AssociationGenerator, CandidateGenerator, IdentityGenerator, IntersectionGenerator,
    RestrictedIntersectionGenerator,
};
use crate::selector::{BasisSelector, FastLoc, GreedySelector};
use serde::{Deserialize, Serialize};

/// Default bound on FastLoc and Iter sweeps
pub const DEFAULT_MAX_SWEEPS: usize = 1000;

/// Candidate generation stage
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    Identity,
    Association { confidence: f64 },
    Intersection,
    RestrictedIntersection,
}

impl GeneratorConfig {
    pub fn label(&self) -> String {
        match self {
            GeneratorConfig::Identity => "Identity".to_string(),
            GeneratorConfig::Association { confidence } => format!("Association[{}]", confidence),
            GeneratorConfig::Intersection => "Intersection".to_string(),
            GeneratorConfig::RestrictedIntersection => "RestrictedIntersection".to_string(),
        }
    }

    pub fn build(&self) -> Result<Box<dyn CandidateGenerator>> {
        Ok(match *self {
            GeneratorConfig::Identity => Box::new(IdentityGenerator),
            GeneratorConfig::Association { confidence } => Box::new(AssociationGenerator::new(confidence)?),
            GeneratorConfig::Intersection => Box::new(IntersectionGenerator),
            GeneratorConfig::RestrictedIntersection => Box::new(RestrictedIntersectionGenerator),
        })
    }
}

/// Basis selection stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectorConfig {
    Greedy,
    FastLoc,
}

impl SelectorConfig {
    pub fn label(&self) -> String {
        match self {
            SelectorConfig::Greedy => "Greedy".to_string(),
            SelectorConfig::FastLoc => "FastLoc".to_string(),
        }
    }

    pub fn build(&self, max_sweeps: usize) -> Box<dyn BasisSelector> {
        match self {
            SelectorConfig::Greedy => Box::new(GreedySelector),
            SelectorConfig::FastLoc => Box::new(FastLoc::new(max_sweeps)),
        }
    }
}

/// Combination stage
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombinatorConfig {
    Identity,
    CoverGreedy,
    DensityGreedy,
    Iter,
    Pipeline { stages: Vec<CombinatorConfig> },
}

impl CombinatorConfig {
    /// Density greedy seeding followed by Iter
    pub fn density_then_iter() -> Self {
        CombinatorConfig::Pipeline {
            stages: vec![CombinatorConfig::DensityGreedy, CombinatorConfig::Iter],
        }
    }

    pub fn label(&self) -> String {
        match self {
            CombinatorConfig::Identity => "Identity".to_string(),
            CombinatorConfig::CoverGreedy => "CoverGreedy".to_string(),
            CombinatorConfig::DensityGreedy => "DensityGreedy".to_string(),
            CombinatorConfig::Iter => "Iter".to_string(),
            CombinatorConfig::Pipeline { stages } => stages
                .iter()
                .map(CombinatorConfig::label)
                .collect::<Vec<_>>()
                .join("+"),
        }
    }

    pub fn build(&self, max_sweeps: usize) -> Box<dyn Combinator> {
        match self {
            CombinatorConfig::Identity => Box::new(IdentityCombinator),
            CombinatorConfig::CoverGreedy => Box::new(GreedyCombinator::cover()),
            CombinatorConfig::DensityGreedy => Box::new(GreedyCombinator::density()),
            CombinatorConfig::Iter => Box::new(Iter::new(max_sweeps)),
            CombinatorConfig::Pipeline { stages } => Box::new(CombinatorPipeline::new(
                stages.iter().map(|s| s.build(max_sweeps)).collect(),
            )),
        }
    }
}

/// Full decomposition configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    pub generator: GeneratorConfig,
    pub selector: SelectorConfig,
    pub combinator: CombinatorConfig,
    /// Cost of a missed T relative to a wrongly set F
    pub ones_weight: f64,
    /// Seed of the selector's permutation; fresh entropy when absent
    pub seed: Option<u64>,
    /// Sweep bound for FastLoc and Iter
    pub max_sweeps: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self::best_unconfigured()
    }
}

impl DecompositionConfig {
    /// Identity + FastLoc + Iter
    pub fn loc_iter() -> Self {
        DecompositionConfig {
            generator: GeneratorConfig::Identity,
            selector: SelectorConfig::FastLoc,
            combinator: CombinatorConfig::Iter,
            ones_weight: 1.0,
            seed: None,
            max_sweeps: DEFAULT_MAX_SWEEPS,
        }
    }

    /// Association + Greedy, keeping the selector's combination
    pub fn dbp(confidence: f64) -> Self {
        DecompositionConfig {
            generator: GeneratorConfig::Association { confidence },
            selector: SelectorConfig::Greedy,
            combinator: CombinatorConfig::Identity,
            ..Self::loc_iter()
        }
    }

    /// Identity + FastLoc + DensityGreedy + Iter
    pub fn best_unconfigured() -> Self {
        DecompositionConfig {
            combinator: CombinatorConfig::density_then_iter(),
            ..Self::loc_iter()
        }
    }

    /// Association + FastLoc + DensityGreedy + Iter
    pub fn best_configured(confidence: f64) -> Self {
        DecompositionConfig {
            generator: GeneratorConfig::Association { confidence },
            combinator: CombinatorConfig::density_then_iter(),
            ..Self::loc_iter()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_ones_weight(mut self, ones_weight: f64) -> Self {
        self.ones_weight = ones_weight;
        self
    }

    /// Check every numeric parameter.
    pub fn validate(&self) -> Result<()> {
        validate_ones_weight(self.ones_weight)?;
        if self.max_sweeps == 0 {
            return Err(DecompositionError::InvalidParameter {
                name: "max_sweeps",
                value: 0.0,
            });
        }
        if let GeneratorConfig::Association { confidence } = self.generator {
            AssociationGenerator::new(confidence)?;
        }
        Ok(())
    }

    /// `generator+selector+combinator`
    pub fn label(&self) -> String {
        format!(
            "{}+{}+{}",
            self.generator.label(),
            self.selector.label(),
            self.combinator.label()
        )
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn validate_ones_weight(ones_weight: f64) -> Result<()> {
    if ones_weight.is_finite() && ones_weight > 0.0 {
        Ok(())
    } else {
        Err(DecompositionError::InvalidParameter {
            name: "ones_weight",
            value: ones_weight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_labels() {
        assert_eq!(DecompositionConfig::loc_iter().label(), "Identity+FastLoc+Iter");
        assert_eq!(
            DecompositionConfig::dbp(0.5).label(),
            "Association[0.5]+Greedy+Identity"
        );
        assert_eq!(
            DecompositionConfig::best_unconfigured().label(),
            "Identity+FastLoc+DensityGreedy+Iter"
        );
        assert_eq!(
            DecompositionConfig::best_configured(0.3).label(),
            "Association[0.3]+FastLoc+DensityGreedy+Iter"
        );
    }

    #[test]
    fn test_default_is_best_unconfigured() {
        assert_eq!(DecompositionConfig::default(), DecompositionConfig::best_unconfigured());
    }

    #[test]
    fn test_validate() {
        assert!(DecompositionConfig::default().validate().is_ok());
        assert!(DecompositionConfig::dbp(0.5).validate().is_ok());
        assert!(DecompositionConfig::dbp(1.5).validate().is_err());
        for bad in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let config = DecompositionConfig::default().with_ones_weight(bad);
            assert!(config.validate().is_err(), "ones_weight {} accepted", bad);
        }
        let config = DecompositionConfig {
            max_sweeps: 0,
            ..DecompositionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DecompositionError::InvalidParameter { name: "max_sweeps", .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = DecompositionConfig::best_configured(0.4).with_seed(9);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"kind\": \"association\""));
        assert!(json.contains("\"density_greedy\""));
        let back = DecompositionConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_defaults_missing_fields() {
        let config = DecompositionConfig::from_json(
            r#"{ "generator": { "kind": "intersection" }, "selector": { "kind": "greedy" } }"#,
        )
        .unwrap();
        assert_eq!(config.generator, GeneratorConfig::Intersection);
        assert_eq!(config.selector, SelectorConfig::Greedy);
        assert_eq!(config.combinator, CombinatorConfig::density_then_iter());
        assert_eq!(config.ones_weight, 1.0);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_sweeps, DEFAULT_MAX_SWEEPS);
    }

    #[test]
    fn test_build_rejects_bad_confidence() {
        assert!(GeneratorConfig::Association { confidence: 0.0 }.build().is_err());
        assert!(GeneratorConfig::RestrictedIntersection.build().is_ok());
    }
}
