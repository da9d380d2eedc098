//! Cauchy generator matrices and Gauss-Jordan elimination over GF(256)
//!
//! The generator for `k` originals and `m` recovery blocks is the `m × k`
//! Cauchy matrix `G[r][c] = 1 / (x_r ^ y_c)` with column parameters
//! `y_c = c` and row parameters `x_r = k + r`. The two parameter ranges are
//! disjoint, so no entry divides by zero, and every square submatrix of a
//! Cauchy matrix is invertible. Stacked under the `k × k` identity this gives
//! an MDS code: any `k` surviving blocks determine the originals.
//!
//! Decoding solves a small square system. [`SquareMatrix::elimination_plan`]
//! runs Gauss-Jordan on the coefficients alone and records every row
//! operation, so a singular system is detected before any block buffer is
//! touched. The recorded [`EliminationPlan`] is then replayed over the
//! recovery buffers.

use super::galois::Gf256;
use crate::error::{CodecError, Result};
use crate::params::{EncoderParams, MAX_BLOCKS};
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};

// ============================================================================
// Generator Matrix
// ============================================================================

/// Row-major `recovery_count × original_count` Cauchy generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorMatrix {
    original_count: usize,
    recovery_count: usize,
    coefficients: Vec<u8>,
}

impl GeneratorMatrix {
    /// Build the generator for `original_count` originals and `recovery_count` recovery rows
    ///
    /// A single original degenerates to replication: every coefficient is 1.
    pub fn build(field: &Gf256, original_count: usize, recovery_count: usize) -> Result<Self> {
        if original_count == 0 || original_count > MAX_BLOCKS {
            return Err(CodecError::InvalidOriginalCount(original_count));
        }
        if original_count + recovery_count > MAX_BLOCKS {
            return Err(CodecError::TooManyBlocks {
                original: original_count,
                recovery: recovery_count,
            });
        }

        let mut coefficients = Vec::with_capacity(original_count * recovery_count);

        if original_count == 1 {
            coefficients.resize(recovery_count, 1);
        } else {
            for r in 0..recovery_count {
                let x = (original_count + r) as u8;
                for c in 0..original_count {
                    let y = c as u8;
                    let entry = field
                        .inv(x ^ y)
                        .ok_or(CodecError::SingularMatrix { column: c })?;
                    coefficients.push(entry);
                }
            }
        }

        log::debug!(
            "Built {}x{} Cauchy generator",
            recovery_count,
            original_count
        );

        Ok(Self {
            original_count,
            recovery_count,
            coefficients,
        })
    }

    #[inline]
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    #[inline]
    pub fn recovery_count(&self) -> usize {
        self.recovery_count
    }

    /// True when there are no recovery rows
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.recovery_count == 0
    }

    /// Confirm this generator was built for the block counts in `params`
    ///
    /// # Errors
    /// `GeneratorMismatch` when either count differs.
    pub fn check_shape(&self, params: &EncoderParams) -> Result<()> {
        if self.original_count != params.original_count()
            || self.recovery_count != params.recovery_count()
        {
            return Err(CodecError::GeneratorMismatch {
                expected_original: params.original_count(),
                expected_recovery: params.recovery_count(),
                original: self.original_count,
                recovery: self.recovery_count,
            });
        }
        Ok(())
    }

    /// Coefficient applied to original `column` when producing recovery `row`
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> u8 {
        self.coefficients[row * self.original_count + column]
    }

    /// All coefficients of one recovery row
    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        let start = row * self.original_count;
        &self.coefficients[start..start + self.original_count]
    }

    /// Cauchy parameter `x_r` of a recovery row (its block index)
    #[inline]
    pub fn row_parameter(&self, row: usize) -> u8 {
        (self.original_count + row) as u8
    }

    /// Cauchy parameter `y_c` of an original column (its block index)
    #[inline]
    pub fn column_parameter(&self, column: usize) -> u8 {
        column as u8
    }

    /// Square submatrix picking `rows` of the generator and `columns` of each row
    ///
    /// `rows` and `columns` must have the same length.
    pub fn submatrix(&self, rows: &[usize], columns: &[usize]) -> SquareMatrix {
        debug_assert_eq!(rows.len(), columns.len());
        let mut sub = SquareMatrix::zero(rows.len());
        for (i, &r) in rows.iter().enumerate() {
            for (j, &c) in columns.iter().enumerate() {
                sub.set(i, j, self.get(r, c));
            }
        }
        sub
    }
}

// ============================================================================
// Square Matrix
// ============================================================================

/// Dense square matrix over GF(256)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareMatrix {
    size: usize,
    data: Vec<u8>,
}

impl SquareMatrix {
    pub fn zero(size: usize) -> Self {
        Self {
            size,
            data: vec![0; size * size],
        }
    }

    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::zero(size);
        for i in 0..size {
            matrix.set(i, i, 1);
        }
        matrix
    }

    /// Build from row-major coefficients
    ///
    /// Returns `None` unless `data.len() == size * size`.
    pub fn from_rows(size: usize, data: Vec<u8>) -> Option<Self> {
        (data.len() == size * size).then_some(Self { size, data })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.size + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.size + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.data[row * self.size..(row + 1) * self.size]
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.size {
            self.data.swap(a * self.size + col, b * self.size + col);
        }
    }

    /// `row[target] ^= factor * row[source]`
    fn eliminate_row(&mut self, field: &Gf256, target: usize, source: usize, factor: u8) {
        let size = self.size;
        let (target_row, source_row) = pair_mut(&mut self.data, size, target, source);
        field.mul_add_slice(target_row, source_row, factor);
    }

    /// Run Gauss-Jordan elimination and record the row operations
    ///
    /// Leaves `self` unchanged. The recorded plan turns the matrix into the
    /// identity; replaying it over the right-hand side of `M x = b` yields `x`.
    ///
    /// # Errors
    /// `SingularMatrix` naming the first column without a usable pivot.
    pub fn elimination_plan(&self, field: &Gf256) -> Result<EliminationPlan> {
        let n = self.size;
        let mut work = self.clone();
        let mut steps = Vec::with_capacity(n * n);

        for col in 0..n {
            let pivot = (col..n)
                .find(|&r| work.get(r, col) != 0)
                .ok_or(CodecError::SingularMatrix { column: col })?;

            if pivot != col {
                work.swap_rows(col, pivot);
                steps.push(EliminationStep::Swap(col, pivot));
            }

            let pivot_value = work.get(col, col);
            if pivot_value != 1 {
                let factor = field
                    .inv(pivot_value)
                    .ok_or(CodecError::SingularMatrix { column: col })?;
                field.mul_slice_in_place(work.row_mut(col), factor);
                steps.push(EliminationStep::Scale { row: col, factor });
            }

            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = work.get(row, col);
                if factor != 0 {
                    work.eliminate_row(field, row, col, factor);
                    steps.push(EliminationStep::Eliminate {
                        target: row,
                        source: col,
                        factor,
                    });
                }
            }
        }

        Ok(EliminationPlan { size: n, steps })
    }

    pub fn invert(&self, field: &Gf256) -> Result<SquareMatrix> {
        let plan = self.elimination_plan(field)?;
        let mut inverse = SquareMatrix::identity(self.size);
        plan.apply_to_matrix(field, &mut inverse);
        Ok(inverse)
    }

    pub fn is_invertible(&self, field: &Gf256) -> bool {
        self.elimination_plan(field).is_ok()
    }

    /// Matrix product `self * other`
    pub fn mul(&self, field: &Gf256, other: &SquareMatrix) -> SquareMatrix {
        debug_assert_eq!(self.size, other.size);
        let n = self.size;
        let mut product = SquareMatrix::zero(n);
        for i in 0..n {
            for k in 0..n {
                let a = self.get(i, k);
                if a != 0 {
                    field.mul_add_slice(product.row_mut(i), other.row(k), a);
                }
            }
        }
        product
    }
}

/// Two distinct rows of a row-major buffer, the first mutable
fn pair_mut(data: &mut [u8], width: usize, target: usize, source: usize) -> (&mut [u8], &[u8]) {
    debug_assert_ne!(target, source);
    if target < source {
        let (head, tail) = data.split_at_mut(source * width);
        (&mut head[target * width..(target + 1) * width], &tail[..width])
    } else {
        let (head, tail) = data.split_at_mut(target * width);
        (&mut tail[..width], &head[source * width..(source + 1) * width])
    }
}

// ============================================================================
// Elimination Plan
// ============================================================================

/// One recorded Gauss-Jordan row operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EliminationStep {
    /// Exchange two rows
    Swap(usize, usize),
    /// `row *= factor`
    Scale { row: usize, factor: u8 },
    /// `target ^= factor * source`
    Eliminate {
        target: usize,
        source: usize,
        factor: u8,
    },
}

/// Row operations that reduce a specific square matrix to the identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationPlan {
    size: usize,
    steps: Vec<EliminationStep>,
}

impl EliminationPlan {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn steps(&self) -> &[EliminationStep] {
        &self.steps
    }

    pub fn apply_to_matrix(&self, field: &Gf256, matrix: &mut SquareMatrix) {
        debug_assert_eq!(matrix.size, self.size);
        for step in &self.steps {
            match *step {
                EliminationStep::Swap(a, b) => matrix.swap_rows(a, b),
                EliminationStep::Scale { row, factor } => {
                    field.mul_slice_in_place(matrix.row_mut(row), factor)
                }
                EliminationStep::Eliminate {
                    target,
                    source,
                    factor,
                } => matrix.eliminate_row(field, target, source, factor),
            }
        }
    }

    /// Replay the plan over one buffer per matrix row
    ///
    /// Swaps exchange the row handles themselves, so anything carried
    /// alongside the buffer (such as the slot it belongs to) moves with it.
    /// Afterwards `rows[i]` holds the solution for matrix column `i`.
    pub fn apply_to_rows<R: AsMut<[u8]>>(&self, field: &Gf256, rows: &mut [R]) {
        debug_assert_eq!(rows.len(), self.size);
        for step in &self.steps {
            match *step {
                EliminationStep::Swap(a, b) => rows.swap(a, b),
                EliminationStep::Scale { row, factor } => {
                    field.mul_slice_in_place(rows[row].as_mut(), factor)
                }
                EliminationStep::Eliminate {
                    target,
                    source,
                    factor,
                } => {
                    let (target_row, source_row) = if target < source {
                        let (head, tail) = rows.split_at_mut(source);
                        (&mut head[target], &mut tail[0])
                    } else {
                        let (head, tail) = rows.split_at_mut(target);
                        (&mut tail[0], &mut head[source])
                    };
                    field.mul_add_slice(target_row.as_mut(), source_row.as_mut(), factor);
                }
            }
        }
    }
}

// ============================================================================
// Generator Cache
// ============================================================================

/// Generators keyed by `(original_count, recovery_count)`
///
/// Safe under concurrent first use: two threads may both build a missing
/// generator, but only the first insert is kept and both get the same `Arc`.
#[derive(Debug, Default)]
pub struct MatrixCache {
    entries: RwLock<FxHashMap<(usize, usize), Arc<GeneratorMatrix>>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        field: &Gf256,
        original_count: usize,
        recovery_count: usize,
    ) -> Result<Arc<GeneratorMatrix>> {
        let key = (original_count, recovery_count);

        if let Some(cached) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(cached));
        }

        log::debug!(
            "Generator cache miss for k={}, m={}",
            original_count,
            recovery_count
        );
        let built = Arc::new(GeneratorMatrix::build(field, original_count, recovery_count)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(built)))
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
