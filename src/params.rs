//! Encoder parameters and index-tagged blocks
//!
//! `EncoderParams` is validated once at construction, so every encode or decode
//! call can rely on `OriginalCount + RecoveryCount <= 256` and a non-zero block size.

use crate::error::{CodecError, Result};

/// Number of distinct block indices available in GF(256)
pub const MAX_BLOCKS: usize = 256;

/// Shape of one frame of erasure-coded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderParams {
    block_bytes: usize,
    original_count: usize,
    recovery_count: usize,
}

impl EncoderParams {
    /// Validate and create encoder parameters
    ///
    /// # Errors
    /// - `ZeroBlockBytes` if `block_bytes == 0`
    /// - `InvalidOriginalCount` unless `1 <= original_count <= 256`
    /// - `TooManyBlocks` if `original_count + recovery_count > 256`
    pub fn new(block_bytes: usize, original_count: usize, recovery_count: usize) -> Result<Self> {
        if block_bytes == 0 {
            return Err(CodecError::ZeroBlockBytes);
        }
        if original_count == 0 || original_count > MAX_BLOCKS {
            return Err(CodecError::InvalidOriginalCount(original_count));
        }
        if original_count + recovery_count > MAX_BLOCKS {
            return Err(CodecError::TooManyBlocks {
                original: original_count,
                recovery: recovery_count,
            });
        }

        Ok(Self {
            block_bytes,
            original_count,
            recovery_count,
        })
    }

    #[inline]
    pub fn block_bytes(&self) -> usize {
        self.block_bytes
    }

    #[inline]
    pub fn original_count(&self) -> usize {
        self.original_count
    }

    #[inline]
    pub fn recovery_count(&self) -> usize {
        self.recovery_count
    }

    /// Total number of distinct block indices this frame uses
    #[inline]
    pub fn total_count(&self) -> usize {
        self.original_count + self.recovery_count
    }

    /// Index tag a framing layer should attach to original block `original_index`
    ///
    /// # Panics
    /// If `original_index >= original_count`.
    #[inline]
    pub fn original_block_index(&self, original_index: usize) -> u8 {
        assert!(
            original_index < self.original_count,
            "original index {} out of range (original count {})",
            original_index,
            self.original_count
        );
        original_index as u8
    }

    /// Index tag a framing layer should attach to recovery block `recovery_index`
    ///
    /// # Panics
    /// If `recovery_index >= recovery_count`.
    #[inline]
    pub fn recovery_block_index(&self, recovery_index: usize) -> u8 {
        assert!(
            recovery_index < self.recovery_count,
            "recovery index {} out of range (recovery count {})",
            recovery_index,
            self.recovery_count
        );
        (self.original_count + recovery_index) as u8
    }

    /// Whether `index` names an original block
    #[inline]
    pub fn is_original_index(&self, index: usize) -> bool {
        index < self.original_count
    }

    pub(crate) fn check_block_len(&self, position: usize, len: usize) -> Result<()> {
        if len != self.block_bytes {
            return Err(CodecError::BlockSizeMismatch {
                position,
                expected: self.block_bytes,
                actual: len,
            });
        }
        Ok(())
    }
}

/// A block buffer tagged with the index it carries
///
/// During decode a slot tagged with a recovery index is overwritten with the
/// original block it stands in for, and its `index` is rewritten to match.
#[derive(Debug)]
pub struct Block<'a> {
    pub data: &'a mut [u8],
    pub index: u8,
}

impl<'a> Block<'a> {
    #[inline]
    pub fn new(index: u8, data: &'a mut [u8]) -> Self {
        Self { data, index }
    }

    /// Whether this slot currently holds an original block
    #[inline]
    pub fn is_original(&self, params: &EncoderParams) -> bool {
        params.is_original_index(self.index as usize)
    }
}
