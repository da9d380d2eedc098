//! Error types for erasure coding operations

use crate::reed_solomon::simd::SimdLevel;
use thiserror::Error;

/// Errors that can occur while building the field, encoding or decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Block size of zero bytes
    #[error("Block size must be at least one byte")]
    ZeroBlockBytes,

    /// Original block count outside 1..=256
    #[error("Original block count {0} must be between 1 and 256")]
    InvalidOriginalCount(usize),

    /// Original and recovery blocks together need more indices than the field has elements
    #[error("{original} original + {recovery} recovery blocks exceeds the 256 available indices")]
    TooManyBlocks { original: usize, recovery: usize },

    /// Encoder received the wrong number of original blocks
    #[error("Expected {expected} original blocks, got {actual}")]
    OriginalCountMismatch { expected: usize, actual: usize },

    /// Encoder received the wrong number of recovery buffers
    #[error("Expected {expected} recovery buffers, got {actual}")]
    RecoveryCountMismatch { expected: usize, actual: usize },

    /// Decoder must be handed exactly one slot per original block
    #[error("Decode needs exactly {expected} blocks, got {actual}")]
    BlockCountMismatch { expected: usize, actual: usize },

    /// A buffer does not have the configured block length
    #[error("Block {position} is {actual} bytes, expected {expected}")]
    BlockSizeMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },

    /// Index tag beyond the last recovery block
    #[error("Block index {index} is out of range (limit {limit})")]
    IndexOutOfRange { index: usize, limit: usize },

    /// Same index tag supplied twice
    #[error("Block index {0} supplied more than once")]
    DuplicateIndex(usize),

    /// Number of substitute recovery blocks does not match the erased originals
    #[error("{erased} original blocks are missing but {recovery} recovery blocks were supplied")]
    ErasureMismatch { erased: usize, recovery: usize },

    /// Generator matrix was built for a different code shape than the parameters
    #[error(
        "Generator is {original}+{recovery} but parameters are {expected_original}+{expected_recovery}"
    )]
    GeneratorMismatch {
        expected_original: usize,
        expected_recovery: usize,
        original: usize,
        recovery: usize,
    },

    /// Single-block encode asked for a row that does not exist
    #[error("Recovery row {index} does not exist (recovery count {recovery_count})")]
    RecoveryIndexOutOfRange { index: usize, recovery_count: usize },

    /// A Cauchy submatrix turned out singular. This is a construction bug, never bad input.
    #[error("Internal invariant violated: recovery submatrix is singular at column {column}")]
    SingularMatrix { column: usize },

    /// Field tables could not be built
    #[error("Failed to initialize GF(256) tables: {0}")]
    FieldInitialization(String),

    /// Requested vector kernel is not available on this CPU
    #[error("SIMD level {0:?} is not supported on this CPU")]
    UnsupportedSimd(SimdLevel),
}

/// Result type for erasure coding operations
pub type Result<T> = std::result::Result<T, CodecError>;
