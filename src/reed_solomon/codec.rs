//! Codec: a field context plus a cache of generator matrices
//!
//! [`Codec`] borrows an immutable [`Gf256`] and owns the generator cache, so
//! one instance serves any number of threads and parameter sets. A
//! process-wide default built on first use backs the free functions in the
//! crate root.

use super::decoder;
use super::encoder;
use super::galois::Gf256;
use super::matrix::{GeneratorMatrix, MatrixCache};
use crate::error::Result;
use crate::params::{Block, EncoderParams};
use std::sync::{Arc, OnceLock};

/// Encoder/decoder bound to one field context
#[derive(Debug)]
pub struct Codec<'f> {
    field: &'f Gf256,
    matrices: MatrixCache,
}

impl<'f> Codec<'f> {
    pub fn new(field: &'f Gf256) -> Self {
        Self {
            field,
            matrices: MatrixCache::new(),
        }
    }

    #[inline]
    pub fn field(&self) -> &'f Gf256 {
        self.field
    }

    /// Cached generator for `params`
    pub fn generator(&self, params: &EncoderParams) -> Result<Arc<GeneratorMatrix>> {
        self.matrices
            .get_or_build(self.field, params.original_count(), params.recovery_count())
    }

    /// Number of distinct generators built so far
    pub fn cached_generators(&self) -> usize {
        self.matrices.len()
    }

    /// Compute all recovery blocks
    ///
    /// See [`encoder::encode`] for the error conditions.
    pub fn encode<O, R>(
        &self,
        params: &EncoderParams,
        originals: &[O],
        recovery: &mut [R],
    ) -> Result<()>
    where
        O: AsRef<[u8]>,
        R: AsMut<[u8]>,
    {
        let generator = self.generator(params)?;
        encoder::encode(self.field, &generator, params, originals, recovery)
    }

    /// Compute the single recovery block `recovery_index`
    pub fn encode_block<O>(
        &self,
        params: &EncoderParams,
        originals: &[O],
        recovery_index: usize,
        out: &mut [u8],
    ) -> Result<()>
    where
        O: AsRef<[u8]>,
    {
        let generator = self.generator(params)?;
        encoder::encode_block(self.field, &generator, params, originals, recovery_index, out)
    }

    /// Reconstruct erased originals in place
    ///
    /// See [`decoder::decode`] for the slot contract and error conditions.
    pub fn decode(&self, params: &EncoderParams, blocks: &mut [Block<'_>]) -> Result<()> {
        let generator = self.generator(params)?;
        decoder::decode(self.field, &generator, params, blocks)
    }
}

static DEFAULT_FIELD: OnceLock<Result<Gf256>> = OnceLock::new();
static DEFAULT_CODEC: OnceLock<Result<Codec<'static>>> = OnceLock::new();

/// Build the process-wide field tables and codec
///
/// Safe to call from many threads at once; only the first call does any
/// work and every later call returns the same codec (or the same error).
pub fn initialize() -> Result<&'static Codec<'static>> {
    DEFAULT_CODEC
        .get_or_init(|| {
            let field = DEFAULT_FIELD.get_or_init(Gf256::new).as_ref().map_err(Clone::clone)?;
            Ok(Codec::new(field))
        })
        .as_ref()
        .map_err(Clone::clone)
}
