//! CLI interface for ternfactor
//!
//! Provides command-line interface for:
//! - Generating planted synthetic matrices
//! - Decomposing a matrix with a named preset or a JSON configuration

use crate::config::DecompositionConfig;
use crate::decomposition::{Decomposition, Factorization};
use crate::matrix::TernMatrix;
use crate::synthetic::{random_product_matrix, PlantedParams};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ternfactor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Approximate boolean matrix decomposition with unknown values")]
#[command(
    long_about = "ternfactor - approximate boolean matrix decomposition over three-valued data\n\n\
    A matrix of 0 / 1 / ? cells is factored into a combination matrix C and a basis\n\
    matrix B so that the boolean product C x B reproduces the known cells as closely\n\
    as possible. Missed 1s are weighted by --ones-weight, wrongly set 0s cost 1.\n\n\
    Matrices are read as text, one row per line ('0', '1', '?'), or as JSON.\n\n\
    Examples:\n\
      ternfactor synth --height 20 --width 12 --rank 3 --seed 7 > planted.txt\n\
      ternfactor decompose planted.txt -k 3 --preset best-unconfigured --seed 1\n\
      ternfactor decompose data.json -k 5 --config assoc.json --json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Named algorithm combinations
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Identity + FastLoc + Iter
    LocIter,
    /// Association + Greedy, selector combination kept
    Dbp,
    /// Identity + FastLoc + DensityGreedy + Iter
    BestUnconfigured,
    /// Association + FastLoc + DensityGreedy + Iter
    BestConfigured,
}

impl Preset {
    pub fn config(self, confidence: f64) -> DecompositionConfig {
        match self {
            Preset::LocIter => DecompositionConfig::loc_iter(),
            Preset::Dbp => DecompositionConfig::dbp(confidence),
            Preset::BestUnconfigured => DecompositionConfig::best_unconfigured(),
            Preset::BestConfigured => DecompositionConfig::best_configured(confidence),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a random matrix with a planted low-rank structure
    #[command(
        long_about = "Print a random matrix with a planted low-rank structure\n\n\
        Draws a random combination (height x rank) and basis (rank x width), multiplies\n\
        them, flips known cells with probability --noise and finally hides cells as '?'\n\
        with probability --unknown.\n\n\
        Example:\n\
          ternfactor synth --height 40 --width 30 --rank 4 --noise 0.02 --seed 3"
    )]
    Synth {
        #[arg(long, default_value_t = 40)]
        height: usize,

        #[arg(long, default_value_t = 30)]
        width: usize,

        /// Number of planted basis rows
        #[arg(long, default_value_t = 4)]
        rank: usize,

        /// Probability of a 1 in a planted basis cell
        #[arg(long, default_value_t = 0.3)]
        basis_density: f64,

        /// Probability that a row uses a planted basis row
        #[arg(long, default_value_t = 0.3)]
        inclusion: f64,

        /// Probability of flipping a known cell
        #[arg(long, default_value_t = 0.0)]
        noise: f64,

        /// Probability of hiding a cell as '?'
        #[arg(long, default_value_t = 0.0)]
        unknown: f64,

        /// Random seed (fresh entropy when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Print the matrix and its planted factors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Factor a matrix into combination and basis
    #[command(
        long_about = "Factor a matrix into combination and basis\n\n\
        The input is a text grid or a JSON matrix; '-' reads standard input.\n\
        The algorithm comes from --config (a JSON DecompositionConfig) or --preset;\n\
        --ones-weight, --seed and --max-sweeps override either.\n\n\
        Example:\n\
          ternfactor decompose matrix.txt -k 4 --preset dbp --confidence 0.6 -v"
    )]
    Decompose {
        /// Matrix file, or '-' for standard input
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Number of basis rows
        #[arg(short = 'k', long)]
        dimension: usize,

        /// Algorithm preset (ignored when --config is given)
        #[arg(short, long, value_enum, default_value_t = Preset::BestUnconfigured)]
        preset: Preset,

        /// Association confidence for the dbp and best-configured presets
        #[arg(long, default_value_t = 0.5)]
        confidence: f64,

        /// JSON configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Weight of a missed 1 relative to a wrong 0
        #[arg(short = 'w', long)]
        ones_weight: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        /// Sweep bound for FastLoc and Iter
        #[arg(long)]
        max_sweeps: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Machine-readable decomposition result
#[derive(Serialize)]
struct Report<'a> {
    algorithm: String,
    dimension: usize,
    ones_weight: f64,
    reconstruction_error: f64,
    one_zero_error: f64,
    zero_one_error: f64,
    #[serde(flatten)]
    factorization: &'a Factorization,
}

fn read_matrix(path: &Path) -> Result<TernMatrix> {
    let mut text = String::new();
    if path.as_os_str() == "-" {
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read matrix from stdin")?;
    } else {
        text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    }
    parse_matrix(&text).with_context(|| format!("failed to parse matrix {}", path.display()))
}

fn parse_matrix(text: &str) -> Result<TernMatrix> {
    if text.trim_start().starts_with('{') {
        Ok(serde_json::from_str(text)?)
    } else {
        Ok(text.parse::<TernMatrix>()?)
    }
}

/// Text grid, or JSON when a side is empty and the grid would lose the shape.
fn render_matrix(matrix: &TernMatrix) -> Result<String> {
    if matrix.height() == 0 || matrix.width() == 0 {
        Ok(serde_json::to_string(matrix)?)
    } else {
        Ok(matrix.to_string())
    }
}

fn resolve_config(
    preset: Preset,
    confidence: f64,
    config: Option<&Path>,
    ones_weight: Option<f64>,
    seed: Option<u64>,
    max_sweeps: Option<usize>,
) -> Result<DecompositionConfig> {
    let mut resolved = match config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            DecompositionConfig::from_json(&json).with_context(|| format!("invalid configuration {}", path.display()))?
        }
        None => preset.config(confidence),
    };
    if let Some(w) = ones_weight {
        resolved.ones_weight = w;
    }
    if seed.is_some() {
        resolved.seed = seed;
    }
    if let Some(n) = max_sweeps {
        resolved.max_sweeps = n;
    }
    resolved.validate()?;
    Ok(resolved)
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Synth {
            height,
            width,
            rank,
            basis_density,
            inclusion,
            noise,
            unknown,
            seed,
            json,
        } => {
            let params = PlantedParams {
                height,
                width,
                rank,
                basis_density,
                inclusion,
                noise,
                unknown,
            };
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            let planted = random_product_matrix(&params, &mut rng)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&planted)?);
            } else {
                println!("{}", render_matrix(&planted.matrix)?);
            }
            Ok(())
        }

        Commands::Decompose {
            input,
            dimension,
            preset,
            confidence,
            config,
            ones_weight,
            seed,
            max_sweeps,
            json,
            verbose,
        } => {
            let config = resolve_config(preset, confidence, config.as_deref(), ones_weight, seed, max_sweeps)?;
            let original = read_matrix(&input)?;

            if verbose {
                println!("ternfactor v{} - Decomposition", env!("CARGO_PKG_VERSION"));
                println!("=================================");
                println!("Algorithm: {}", config.label());
                println!(
                    "Input: {} x {}, density {:.4}, missing {:.4}",
                    original.height(),
                    original.width(),
                    original.density(),
                    original.missing_density()
                );
            }

            let mut decomposition = Decomposition::from_config(&config)?;
            let factorization = decomposition
                .decompose(&original, dimension)
                .with_context(|| format!("decomposition into {} basis rows failed", dimension))?;

            let reconstruction = factorization.reconstruct()?;
            let error = original.reconstruction_error(&reconstruction, config.ones_weight)?;
            let (one_zero, zero_one) =
                original.relative_one_zero_zero_one_error(&reconstruction, config.ones_weight)?;

            if json {
                let report = Report {
                    algorithm: config.label(),
                    dimension,
                    ones_weight: config.ones_weight,
                    reconstruction_error: error,
                    one_zero_error: one_zero,
                    zero_one_error: zero_one,
                    factorization: &factorization,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Basis ({} x {}):", factorization.basis.height(), factorization.basis.width());
            println!("{}", render_matrix(&factorization.basis)?);
            println!();
            println!(
                "Combination ({} x {}):",
                factorization.combination.height(),
                factorization.combination.width()
            );
            println!("{}", render_matrix(&factorization.combination)?);
            println!();
            println!("Reconstruction error: {}", error);
            println!(
                "Relative error: {:.4} (1->0 {:.4}, 0->1 {:.4})",
                one_zero + zero_one,
                one_zero,
                zero_one
            );
            if verbose {
                let confusion = original.confusion(&reconstruction)?;
                println!(
                    "Cells: tp {}  tn {}  fp {}  fn {}",
                    confusion.true_positives,
                    confusion.true_negatives,
                    confusion.false_positives,
                    confusion.false_negatives
                );
            }
            Ok(())
        }
    }
}
