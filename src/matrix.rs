//! Dense Three-Valued Boolean Matrix
//!
//! [`TernMatrix`] stores `height x width` cells of [`Tern`] in a single
//! row-major `Vec`. Rows are handed out as borrowed slices into that store
//! (`&[Tern]` / `&mut [Tern]`) or as owned copies (`Vec<Tern>`); two matrices
//! never share storage.
//!
//! # Boolean product
//!
//! `(C ⊗ B)[r][c] = ⊕_k (C[r][k] AND B[k][c])` where `⊕` is OR by default
//! and XOR on request ([`AddOp`]). Row `r` of the product is built by the
//! fused [`scale_accumulate`] kernel, one call per non-false entry of `C[r]`.
//!
//! # Error metrics
//!
//! Every metric walks the *original* matrix (`self`) and compares it with a
//! reconstruction of the same shape. U cells of the original are skipped.
//! A T cell reconstructed as anything but T costs `ones_weight`; an F cell
//! reconstructed as anything but F costs `1`.

use crate::error::{DecompositionError, Result};
use crate::ternary::Tern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Additive operator of the boolean product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddOp {
    /// Logical OR, the reconstruction rule of the decomposition
    #[default]
    Or,
    /// Exclusive or
    Xor,
}

impl AddOp {
    #[inline]
    pub const fn apply(self, a: Tern, b: Tern) -> Tern {
        match self {
            AddOp::Or => a.or(b),
            AddOp::Xor => a.xor(b),
        }
    }
}

/// Fused row kernel: `dst[c] = dst[c] ⊕ (alpha AND src[c])`.
///
/// A false `alpha` leaves `dst` untouched for both operators.
///
/// # Panics
///
/// Panics if the two rows differ in length.
#[inline]
pub fn scale_accumulate(dst: &mut [Tern], alpha: Tern, src: &[Tern], op: AddOp) {
    assert_eq!(dst.len(), src.len(), "scale_accumulate: row length mismatch");
    if alpha.is_false() {
        return;
    }
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = op.apply(*d, alpha.and(s));
    }
}

/// Number of F, U and T cells in a matrix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub falses: usize,
    pub unknowns: usize,
    pub trues: usize,
}

impl ElementCounts {
    pub fn total(&self) -> usize {
        self.falses + self.unknowns + self.trues
    }
}

/// Cell-level agreement between an original and its reconstruction, over
/// the known cells of the original.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    /// T reconstructed as T
    pub true_positives: usize,
    /// F reconstructed as F
    pub true_negatives: usize,
    /// F reconstructed as non-F
    pub false_positives: usize,
    /// T reconstructed as non-T
    pub false_negatives: usize,
}

/// Dense `height x width` matrix of [`Tern`] values.
///
/// Shape is fixed at construction; only contents change.
///
/// # Examples
///
/// ```
/// use ternfactor::{Tern, TernMatrix};
///
/// let combination: TernMatrix = "10\n01\n11".parse().unwrap();
/// let basis: TernMatrix = "110\n011".parse().unwrap();
/// let product = combination.boolean_product(&basis).unwrap();
/// assert_eq!(product.to_string(), "110\n011\n111");
/// assert_eq!(product.get(2, 1).unwrap(), Tern::T);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix", into = "RawMatrix")]
pub struct TernMatrix {
    height: usize,
    width: usize,
    cells: Vec<Tern>,
}

/// Serialized form; validated on the way back in.
#[derive(Clone, Serialize, Deserialize)]
struct RawMatrix {
    height: usize,
    width: usize,
    cells: Vec<Tern>,
}

impl TryFrom<RawMatrix> for TernMatrix {
    type Error = DecompositionError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        let expected = raw.height.saturating_mul(raw.width);
        if raw.cells.len() != expected {
            return Err(DecompositionError::DimensionMismatch {
                operation: "deserialize",
                expected: (expected, 1),
                got: (raw.cells.len(), 1),
            });
        }
        Ok(TernMatrix {
            height: raw.height,
            width: raw.width,
            cells: raw.cells,
        })
    }
}

impl From<TernMatrix> for RawMatrix {
    fn from(m: TernMatrix) -> Self {
        RawMatrix {
            height: m.height,
            width: m.width,
            cells: m.cells,
        }
    }
}

impl TernMatrix {
    /// All-false matrix
    pub fn new(height: usize, width: usize) -> Self {
        Self::filled(height, width, Tern::F)
    }

    pub fn filled(height: usize, width: usize, value: Tern) -> Self {
        TernMatrix {
            height,
            width,
            cells: vec![value; height * width],
        }
    }

    /// Build from explicit rows. All rows must have equal length; an empty
    /// row list yields a `0 x 0` matrix.
    pub fn from_rows(rows: Vec<Vec<Tern>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(height * width);
        for row in rows {
            if row.len() != width {
                return Err(DecompositionError::DimensionMismatch {
                    operation: "from_rows",
                    expected: (1, width),
                    got: (1, row.len()),
                });
            }
            cells.extend(row);
        }
        Ok(TernMatrix {
            height,
            width,
            cells,
        })
    }

    /// Build cell by cell from `f(row, column)`.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Tern,
    {
        let mut cells = Vec::with_capacity(height * width);
        for r in 0..height {
            for c in 0..width {
                cells.push(f(r, c));
            }
        }
        TernMatrix {
            height,
            width,
            cells,
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    fn check_cell(&self, row: usize, column: usize) -> Result<usize> {
        if row < self.height && column < self.width {
            Ok(row * self.width + column)
        } else {
            Err(self.out_of_bounds(row, column))
        }
    }

    fn out_of_bounds(&self, row: usize, column: usize) -> DecompositionError {
        DecompositionError::IndexOutOfBounds {
            row,
            column,
            height: self.height,
            width: self.width,
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Result<Tern> {
        self.check_cell(row, column).map(|i| self.cells[i])
    }

    pub fn set(&mut self, row: usize, column: usize, value: Tern) -> Result<()> {
        let i = self.check_cell(row, column)?;
        self.cells[i] = value;
        Ok(())
    }

    /// Borrowed view of one row.
    pub fn row(&self, row: usize) -> Result<&[Tern]> {
        if row < self.height {
            Ok(self.row_slice(row))
        } else {
            Err(self.out_of_bounds(row, 0))
        }
    }

    pub fn row_mut(&mut self, row: usize) -> Result<&mut [Tern]> {
        if row < self.height {
            let w = self.width;
            Ok(&mut self.cells[row * w..(row + 1) * w])
        } else {
            Err(self.out_of_bounds(row, 0))
        }
    }

    /// Replace one row with a copy of `values`.
    pub fn set_row(&mut self, row: usize, values: &[Tern]) -> Result<()> {
        if values.len() != self.width {
            return Err(DecompositionError::DimensionMismatch {
                operation: "set_row",
                expected: (1, self.width),
                got: (1, values.len()),
            });
        }
        self.row_mut(row)?.copy_from_slice(values);
        Ok(())
    }

    /// Copy of one column.
    pub fn column(&self, column: usize) -> Result<Vec<Tern>> {
        if column >= self.width {
            return Err(self.out_of_bounds(0, column));
        }
        Ok((0..self.height)
            .map(|r| self.cells[r * self.width + column])
            .collect())
    }

    /// New matrix made of copies of the given rows, in order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<TernMatrix> {
        let mut cells = Vec::with_capacity(indices.len() * self.width);
        for &r in indices {
            cells.extend_from_slice(self.row(r)?);
        }
        Ok(TernMatrix {
            height: indices.len(),
            width: self.width,
            cells,
        })
    }

    /// Unchecked-by-`Result` row view; panics past the last row like a slice.
    #[inline]
    pub(crate) fn row_slice(&self, row: usize) -> &[Tern] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    #[inline]
    pub(crate) fn row_slice_mut(&mut self, row: usize) -> &mut [Tern] {
        let w = self.width;
        &mut self.cells[row * w..(row + 1) * w]
    }

    /// Iterator over borrowed rows.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Tern]> + '_ {
        (0..self.height).map(move |r| self.row_slice(r))
    }

    /// Flat row-major cells.
    pub fn cells(&self) -> &[Tern] {
        &self.cells
    }

    /// Boolean product with OR as the additive operator.
    pub fn boolean_product(&self, other: &TernMatrix) -> Result<TernMatrix> {
        self.boolean_product_with(other, AddOp::Or)
    }

    /// Boolean product with a chosen additive operator.
    pub fn boolean_product_with(&self, other: &TernMatrix, op: AddOp) -> Result<TernMatrix> {
        if self.width != other.height {
            return Err(DecompositionError::DimensionMismatch {
                operation: "boolean_product",
                expected: (self.width, other.width),
                got: other.shape(),
            });
        }
        let mut result = TernMatrix::new(self.height, other.width);
        for r in 0..self.height {
            let dst = result.row_slice_mut(r);
            for k in 0..self.width {
                let alpha = self.cells[r * self.width + k];
                scale_accumulate(dst, alpha, other.row_slice(k), op);
            }
        }
        Ok(result)
    }

    /// Fraction of T among known cells; `0.0` if there are none.
    pub fn density(&self) -> f64 {
        let counts = self.element_counts();
        let known = counts.trues + counts.falses;
        if known == 0 {
            0.0
        } else {
            counts.trues as f64 / known as f64
        }
    }

    /// Fraction of U among all cells; `0.0` for an empty matrix.
    pub fn missing_density(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.element_counts().unknowns as f64 / self.cells.len() as f64
        }
    }

    pub fn element_counts(&self) -> ElementCounts {
        let mut counts = ElementCounts::default();
        for &t in &self.cells {
            match t {
                Tern::F => counts.falses += 1,
                Tern::U => counts.unknowns += 1,
                Tern::T => counts.trues += 1,
            }
        }
        counts
    }

    /// Deep transpose.
    pub fn transpose(&self) -> TernMatrix {
        TernMatrix::from_fn(self.width, self.height, |r, c| {
            self.cells[c * self.width + r]
        })
    }

    /// Pointwise map into a new matrix of the same shape.
    pub fn map<F>(&self, mut f: F) -> TernMatrix
    where
        F: FnMut(Tern) -> Tern,
    {
        TernMatrix {
            height: self.height,
            width: self.width,
            cells: self.cells.iter().map(|&t| f(t)).collect(),
        }
    }

    /// Pointwise negation.
    pub fn not(&self) -> TernMatrix {
        self.map(Tern::not)
    }

    /// True if no cell is T.
    pub fn is_all_false(&self) -> bool {
        !self.cells.iter().any(|t| t.is_true())
    }

    fn check_same_shape(&self, other: &TernMatrix, operation: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(DecompositionError::DimensionMismatch {
                operation,
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    /// Weighted count of wrongly reconstructed known cells.
    ///
    /// `self` is the original. Each T not reconstructed as T costs
    /// `ones_weight`, each F not reconstructed as F costs `1`.
    pub fn reconstruction_error(&self, reconstruction: &TernMatrix, ones_weight: f64) -> Result<f64> {
        self.check_same_shape(reconstruction, "reconstruction_error")?;
        let mut total = 0.0;
        for (&a, &b) in self.cells.iter().zip(&reconstruction.cells) {
            match a {
                Tern::F if !b.is_false() => total += 1.0,
                Tern::T if !b.is_true() => total += ones_weight,
                _ => {}
            }
        }
        Ok(total)
    }

    /// Relative `1 -> 0` and `0 -> 1` errors.
    ///
    /// Both components are divided by the total weighted mass of the known
    /// cells of `self`, `ones_weight * #T + #F`, so that their sum is the
    /// relative reconstruction error. Returns `(0.0, 0.0)` when `self` has
    /// no known cell.
    pub fn relative_one_zero_zero_one_error(
        &self,
        reconstruction: &TernMatrix,
        ones_weight: f64,
    ) -> Result<(f64, f64)> {
        self.check_same_shape(reconstruction, "relative_one_zero_zero_one_error")?;
        let mut one_zero = 0.0;
        let mut zero_one = 0.0;
        let mut total_weight = 0.0;
        for (&a, &b) in self.cells.iter().zip(&reconstruction.cells) {
            match a {
                Tern::F => {
                    total_weight += 1.0;
                    if !b.is_false() {
                        zero_one += 1.0;
                    }
                }
                Tern::T => {
                    total_weight += ones_weight;
                    if !b.is_true() {
                        one_zero += ones_weight;
                    }
                }
                Tern::U => {}
            }
        }
        if total_weight == 0.0 {
            return Ok((0.0, 0.0));
        }
        Ok((one_zero / total_weight, zero_one / total_weight))
    }

    /// Sum of the pair returned by [`Self::relative_one_zero_zero_one_error`].
    pub fn relative_reconstruction_error(&self, reconstruction: &TernMatrix, ones_weight: f64) -> Result<f64> {
        let (one_zero, zero_one) = self.relative_one_zero_zero_one_error(reconstruction, ones_weight)?;
        Ok(one_zero + zero_one)
    }

    pub fn confusion(&self, reconstruction: &TernMatrix) -> Result<Confusion> {
        self.check_same_shape(reconstruction, "confusion")?;
        let mut out = Confusion::default();
        for (&a, &b) in self.cells.iter().zip(&reconstruction.cells) {
            match (a, b.is_true(), b.is_false()) {
                (Tern::T, true, _) => out.true_positives += 1,
                (Tern::T, false, _) => out.false_negatives += 1,
                (Tern::F, _, true) => out.true_negatives += 1,
                (Tern::F, _, false) => out.false_positives += 1,
                (Tern::U, _, _) => {}
            }
        }
        Ok(out)
    }
}

impl std::ops::Index<(usize, usize)> for TernMatrix {
    type Output = Tern;

    #[inline]
    fn index(&self, (row, column): (usize, usize)) -> &Tern {
        assert!(
            row < self.height && column < self.width,
            "index ({}, {}) out of bounds for {} x {} matrix",
            row,
            column,
            self.height,
            self.width
        );
        &self.cells[row * self.width + column]
    }
}

impl std::ops::IndexMut<(usize, usize)> for TernMatrix {
    #[inline]
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut Tern {
        assert!(
            row < self.height && column < self.width,
            "index ({}, {}) out of bounds for {} x {} matrix",
            row,
            column,
            self.height,
            self.width
        );
        &mut self.cells[row * self.width + column]
    }
}

impl fmt::Debug for TernMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TernMatrix[{} x {}]", self.height, self.width)?;
        write!(f, "{}", self)
    }
}

/// Rows on separate lines, no trailing newline. Only matrices with at least
/// one row and one column read back through [`FromStr`] with their shape.
impl fmt::Display for TernMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for t in row {
                write!(f, "{}", t.to_char())?;
            }
        }
        Ok(())
    }
}

impl FromStr for TernMatrix {
    type Err = DecompositionError;

    /// One row per non-blank line, one cell per `0`/`.`, `?` or `1`;
    /// other whitespace inside a line is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mut rows: Vec<Vec<Tern>> = Vec::new();
        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::with_capacity(line.len());
            for ch in line.chars().filter(|c| !c.is_whitespace()) {
                let t = Tern::from_char(ch).ok_or_else(|| DecompositionError::Parse {
                    line: i + 1,
                    message: format!("unexpected character {:?}", ch),
                })?;
                row.push(t);
            }
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(DecompositionError::Parse {
                        line: i + 1,
                        message: format!("expected {} cells, found {}", first.len(), row.len()),
                    });
                }
            }
            rows.push(row);
        }
        TernMatrix::from_rows(rows)
    }
}
