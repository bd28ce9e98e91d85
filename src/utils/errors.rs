use thiserror::Error;

/// Errors raised by the kernel when a precondition is violated.
///
/// Degenerate numeric inputs (empty vectors, all-NaN data, too few paired
/// observations) are never errors; they produce `NaN` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// Element access outside of the valid range
    #[error("Index {index} out of range; valid range is 0..{len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Vectors that must be paired have different lengths
    #[error("Vectors have different lengths: {lengths:?}")]
    LengthMismatch { lengths: Vec<usize> },

    /// A row/column source is shorter than the matrix dimension
    #[error("Source of length {found} is shorter than the required {required}")]
    SourceTooShort { required: usize, found: usize },

    /// Two matrices do not share the same shape
    #[error("Matrices have different dimensions: {nrows_a}x{ncols_a} != {nrows_b}x{ncols_b}")]
    DimensionMismatch {
        nrows_a: usize,
        ncols_a: usize,
        nrows_b: usize,
        ncols_b: usize,
    },

    /// Rows passed to a matrix constructor differ in length
    #[error("Row {row} has {found} elements, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// More distinct draws requested than the population holds
    #[error("Cannot draw {k} distinct samples from a population of {population}")]
    InvalidSampleSize { k: usize, population: usize },

    /// A NaN was found where the caller promised NaN-free input
    #[error("Unexpected NaN at position {index}")]
    UnexpectedNan { index: usize },

    /// A position list contains the same entry twice
    #[error("Duplicate position {index}")]
    DuplicateIndex { index: usize },

    /// A cohort operation received no vectors
    #[error("Cohort is empty")]
    EmptyCohort,

    /// A string token does not name any known variant
    #[error("Unknown {kind}: '{token}'")]
    UnknownVariant { kind: &'static str, token: String },
}

/// Result type used across the kernel.
pub type KernelResult<T> = Result<T, KernelError>;
