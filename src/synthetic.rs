//! Synthetic Matrices
//!
//! Seeded random data for tests, benches and the `synth` command: uniform
//! random matrices, and "planted" matrices built as a boolean product of
//! random factors, optionally disturbed by bit flips and missing values.

use crate::error::{DecompositionError, Result};
use crate::matrix::TernMatrix;
use crate::ternary::Tern;
use rand::Rng;
use serde::{Deserialize, Serialize};

fn check_probability(name: &'static str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(DecompositionError::InvalidParameter { name, value: p })
    }
}

/// `height x width` matrix of known cells, each T with probability `density`.
pub fn random_matrix<R: Rng + ?Sized>(height: usize, width: usize, density: f64, rng: &mut R) -> Result<TernMatrix> {
    check_probability("density", density)?;
    Ok(TernMatrix::from_fn(height, width, |_, _| Tern::from_bool(rng.gen_bool(density))))
}

/// Copy of `matrix` with every known cell negated with probability `probability`.
pub fn flip_randomly<R: Rng + ?Sized>(matrix: &TernMatrix, probability: f64, rng: &mut R) -> Result<TernMatrix> {
    check_probability("flip probability", probability)?;
    Ok(matrix.map(|t| {
        if t.is_known() && rng.gen_bool(probability) {
            !t
        } else {
            t
        }
    }))
}

/// Copy of `matrix` with every cell replaced by U with probability `probability`.
pub fn insert_randomly<R: Rng + ?Sized>(matrix: &TernMatrix, probability: f64, rng: &mut R) -> Result<TernMatrix> {
    check_probability("unknown probability", probability)?;
    Ok(matrix.map(|t| if rng.gen_bool(probability) { Tern::U } else { t }))
}

/// Shape and noise of a planted matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantedParams {
    pub height: usize,
    pub width: usize,
    /// Number of planted basis rows
    pub rank: usize,
    /// Probability of T in a basis cell
    pub basis_density: f64,
    /// Probability that a row uses a given basis row
    pub inclusion: f64,
    /// Probability of flipping a known cell of the product
    pub noise: f64,
    /// Probability of hiding a cell of the product as U
    pub unknown: f64,
}

impl Default for PlantedParams {
    fn default() -> Self {
        PlantedParams {
            height: 40,
            width: 30,
            rank: 4,
            basis_density: 0.3,
            inclusion: 0.3,
            noise: 0.0,
            unknown: 0.0,
        }
    }
}

/// Planted factors and the matrices built from them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planted {
    pub combination: TernMatrix,
    pub basis: TernMatrix,
    /// `combination ⊗ basis`
    pub clean: TernMatrix,
    /// `clean` after flips and missing values
    pub matrix: TernMatrix,
}

/// Draw random factors and multiply them.
///
/// Noise is applied first, then missing values.
pub fn random_product_matrix<R: Rng + ?Sized>(params: &PlantedParams, rng: &mut R) -> Result<Planted> {
    let combination = random_matrix(params.height, params.rank, params.inclusion, rng)?;
    let basis = random_matrix(params.rank, params.width, params.basis_density, rng)?;
    let clean = combination.boolean_product(&basis)?;
    let noisy = flip_randomly(&clean, params.noise, rng)?;
    let matrix = insert_randomly(&noisy, params.unknown, rng)?;
    Ok(Planted {
        combination,
        basis,
        clean,
        matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_matrix_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(random_matrix(5, 7, 0.0, &mut rng).unwrap().is_all_false());
        let full = random_matrix(5, 7, 1.0, &mut rng).unwrap();
        assert_eq!(full.element_counts().trues, 35);
        assert!(random_matrix(2, 2, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_random_matrix_density_is_plausible() {
        let mut rng = StdRng::seed_from_u64(2);
        let x = random_matrix(100, 100, 0.25, &mut rng).unwrap();
        let d = x.density();
        assert!(d > 0.2 && d < 0.3, "density {}", d);
    }

    #[test]
    fn test_flip_keeps_unknowns() {
        let mut rng = StdRng::seed_from_u64(3);
        let x: TernMatrix = "1?0\n??1".parse().unwrap();
        let flipped = flip_randomly(&x, 1.0, &mut rng).unwrap();
        assert_eq!(flipped.to_string(), "0?1\n??0");
    }

    #[test]
    fn test_insert_all_unknown() {
        let mut rng = StdRng::seed_from_u64(4);
        let x = TernMatrix::new(3, 3);
        let hidden = insert_randomly(&x, 1.0, &mut rng).unwrap();
        assert_eq!(hidden.missing_density(), 1.0);
        assert_eq!(insert_randomly(&x, 0.0, &mut rng).unwrap(), x);
    }

    #[test]
    fn test_planted_without_noise_is_exact_product() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = random_product_matrix(&PlantedParams::default(), &mut rng).unwrap();
        assert_eq!(p.combination.shape(), (40, 4));
        assert_eq!(p.basis.shape(), (4, 30));
        assert_eq!(p.matrix, p.clean);
        assert_eq!(p.clean, p.combination.boolean_product(&p.basis).unwrap());
    }

    #[test]
    fn test_planted_is_reproducible() {
        let params = PlantedParams {
            noise: 0.05,
            unknown: 0.1,
            ..PlantedParams::default()
        };
        let a = random_product_matrix(&params, &mut StdRng::seed_from_u64(6)).unwrap();
        let b = random_product_matrix(&params, &mut StdRng::seed_from_u64(6)).unwrap();
        assert_eq!(a, b);
    }
}
