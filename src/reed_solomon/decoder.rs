//! In-place reconstruction of erased original blocks
//!
//! The caller hands over exactly `original_count` tagged slots. Slots tagged
//! with an original index are trusted as-is; slots tagged with a recovery
//! index are turned into the missing originals:
//!
//! 1. Subtract every known original's contribution from each recovery block,
//!    leaving `b = M x` where `x` are the erased originals and `M` is the
//!    generator submatrix (supplied recovery rows × erased columns).
//! 2. Replay the Gauss-Jordan plan for `M` over the recovery buffers.
//!
//! Slot positions are free: the slots can arrive in any order. The `n`-th
//! recovery slot left after elimination receives the `n`-th smallest erased
//! index, and its tag is rewritten to that index.

use super::galois::Gf256;
use super::matrix::GeneratorMatrix;
use crate::error::{CodecError, Result};
use crate::params::{Block, EncoderParams, MAX_BLOCKS};
use smallvec::SmallVec;

type IndexList = SmallVec<[usize; 32]>;

/// Which originals are missing and which recovery blocks stand in for them
///
/// Built fresh for every decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverySet {
    erased: IndexList,
    recovery_rows: IndexList,
    recovery_slots: IndexList,
}

impl RecoverySet {
    /// Validate the slot tags and work out the erasure pattern
    ///
    /// # Errors
    /// `IndexOutOfRange`, `DuplicateIndex` or `ErasureMismatch`.
    pub fn build(params: &EncoderParams, blocks: &[Block<'_>]) -> Result<Self> {
        let k = params.original_count();
        let limit = params.total_count();
        let mut present = [false; MAX_BLOCKS];
        let mut recovery_rows = IndexList::new();
        let mut recovery_slots = IndexList::new();

        for (slot, block) in blocks.iter().enumerate() {
            let index = block.index as usize;
            if index >= limit {
                return Err(CodecError::IndexOutOfRange { index, limit });
            }
            if present[index] {
                return Err(CodecError::DuplicateIndex(index));
            }
            present[index] = true;

            if index >= k {
                recovery_rows.push(index - k);
                recovery_slots.push(slot);
            }
        }

        let erased: IndexList = (0..k).filter(|&i| !present[i]).collect();

        if erased.len() != recovery_rows.len() {
            return Err(CodecError::ErasureMismatch {
                erased: erased.len(),
                recovery: recovery_rows.len(),
            });
        }
        // distinct recovery tags below `k + m` bound the erasures by `m`
        debug_assert!(erased.len() <= params.recovery_count());

        Ok(Self {
            erased,
            recovery_rows,
            recovery_slots,
        })
    }

    /// Missing original indices, ascending
    pub fn erased(&self) -> &[usize] {
        &self.erased
    }

    /// Generator rows of the supplied recovery blocks, in slot order
    pub fn recovery_rows(&self) -> &[usize] {
        &self.recovery_rows
    }

    /// Slot positions holding recovery blocks
    pub fn recovery_slots(&self) -> &[usize] {
        &self.recovery_slots
    }

    /// True when nothing is erased
    pub fn is_empty(&self) -> bool {
        self.erased.is_empty()
    }
}

/// A recovery buffer on its way to becoming an original
struct RecoveryRow<'a> {
    slot: usize,
    row: usize,
    data: &'a mut [u8],
}

impl AsMut<[u8]> for RecoveryRow<'_> {
    fn as_mut(&mut self) -> &mut [u8] {
        self.data
    }
}

/// Reconstruct every erased original in place
///
/// All validation and the elimination plan complete before any buffer is
/// written, so on error every block is left exactly as it was. Slots already
/// holding originals are never written.
///
/// # Errors
/// - `GeneratorMismatch` if `generator` was built for other block counts
/// - `BlockCountMismatch` unless exactly `original_count` slots are given
/// - `BlockSizeMismatch` for a buffer of the wrong length
/// - the tag errors of [`RecoverySet::build`]
/// - `SingularMatrix` if the generator submatrix cannot be inverted
pub fn decode(
    field: &Gf256,
    generator: &GeneratorMatrix,
    params: &EncoderParams,
    blocks: &mut [Block<'_>],
) -> Result<()> {
    generator.check_shape(params)?;
    let k = params.original_count();
    if blocks.len() != k {
        return Err(CodecError::BlockCountMismatch {
            expected: k,
            actual: blocks.len(),
        });
    }
    for (position, block) in blocks.iter().enumerate() {
        params.check_block_len(position, block.data.len())?;
    }

    let set = RecoverySet::build(params, blocks)?;
    if set.is_empty() {
        return Ok(());
    }

    log::debug!(
        "Decoding {} erased of {} originals (recovery rows {:?})",
        set.erased.len(),
        k,
        set.recovery_rows
    );

    let matrix = generator.submatrix(&set.recovery_rows, &set.erased);
    let plan = matrix.elimination_plan(field).inspect_err(|err| {
        log::error!(
            "Cauchy submatrix for rows {:?} and columns {:?} is singular: {}",
            set.recovery_rows,
            set.erased,
            err
        );
    })?;

    let mut originals: SmallVec<[(usize, &[u8]); 32]> = SmallVec::new();
    let mut rows: SmallVec<[RecoveryRow<'_>; 32]> = SmallVec::new();
    for (slot, block) in blocks.iter_mut().enumerate() {
        let index = block.index as usize;
        if index < k {
            originals.push((index, &*block.data));
        } else {
            rows.push(RecoveryRow {
                slot,
                row: index - k,
                data: &mut *block.data,
            });
        }
    }

    for row in rows.iter_mut() {
        let coefficients = generator.row(row.row);
        for &(column, data) in &originals {
            field.mul_add_slice(row.data, data, coefficients[column]);
        }
    }

    plan.apply_to_rows(field, rows.as_mut_slice());

    let recovered_slots: SmallVec<[usize; 32]> = rows.iter().map(|row| row.slot).collect();
    drop(rows);
    drop(originals);
    for (&slot, &index) in recovered_slots.iter().zip(&set.erased) {
        blocks[slot].index = index as u8;
    }

    Ok(())
}
