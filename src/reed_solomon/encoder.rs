//! Recovery block generation
//!
//! Recovery block `r` is `sum_c G[r][c] * original[c]`. The first term is
//! written directly, the rest are accumulated, so recovery buffers need no
//! zeroing beforehand.

use super::galois::Gf256;
use super::matrix::GeneratorMatrix;
use crate::error::{CodecError, Result};
use crate::params::EncoderParams;

/// Fill every recovery buffer from the original blocks
///
/// Originals are never written. Shape is fully validated before the first
/// recovery buffer is touched.
///
/// # Errors
/// - `GeneratorMismatch` if `generator` was built for other block counts
/// - `OriginalCountMismatch` / `RecoveryCountMismatch` for wrong buffer counts
/// - `BlockSizeMismatch` if any buffer is not `block_bytes` long (positions
///   are block indices: originals first, then recovery blocks)
pub fn encode<O, R>(
    field: &Gf256,
    generator: &GeneratorMatrix,
    params: &EncoderParams,
    originals: &[O],
    recovery: &mut [R],
) -> Result<()>
where
    O: AsRef<[u8]>,
    R: AsMut<[u8]>,
{
    generator.check_shape(params)?;
    check_originals(params, originals)?;

    if recovery.len() != params.recovery_count() {
        return Err(CodecError::RecoveryCountMismatch {
            expected: params.recovery_count(),
            actual: recovery.len(),
        });
    }
    for (r, block) in recovery.iter_mut().enumerate() {
        params.check_block_len(params.original_count() + r, block.as_mut().len())?;
    }

    for (r, block) in recovery.iter_mut().enumerate() {
        encode_row(field, generator, originals, r, block.as_mut());
    }

    Ok(())
}

/// Produce the single recovery block `recovery_index`
///
/// # Errors
/// - `RecoveryIndexOutOfRange` unless `recovery_index < recovery_count`
/// - the shape errors of [`encode`]
pub fn encode_block<O>(
    field: &Gf256,
    generator: &GeneratorMatrix,
    params: &EncoderParams,
    originals: &[O],
    recovery_index: usize,
    out: &mut [u8],
) -> Result<()>
where
    O: AsRef<[u8]>,
{
    generator.check_shape(params)?;
    if recovery_index >= params.recovery_count() {
        return Err(CodecError::RecoveryIndexOutOfRange {
            index: recovery_index,
            recovery_count: params.recovery_count(),
        });
    }
    check_originals(params, originals)?;
    params.check_block_len(params.original_count() + recovery_index, out.len())?;

    encode_row(field, generator, originals, recovery_index, out);
    Ok(())
}

fn check_originals<O: AsRef<[u8]>>(params: &EncoderParams, originals: &[O]) -> Result<()> {
    if originals.len() != params.original_count() {
        return Err(CodecError::OriginalCountMismatch {
            expected: params.original_count(),
            actual: originals.len(),
        });
    }
    for (position, block) in originals.iter().enumerate() {
        params.check_block_len(position, block.as_ref().len())?;
    }
    Ok(())
}

fn encode_row<O: AsRef<[u8]>>(
    field: &Gf256,
    generator: &GeneratorMatrix,
    originals: &[O],
    row: usize,
    out: &mut [u8],
) {
    let coefficients = generator.row(row);

    field.mul_slice(out, originals[0].as_ref(), coefficients[0]);
    for (original, &coefficient) in originals.iter().zip(coefficients).skip(1) {
        field.mul_add_slice(out, original.as_ref(), coefficient);
    }

    log::trace!("Encoded recovery row {} from {} originals", row, originals.len());
}
