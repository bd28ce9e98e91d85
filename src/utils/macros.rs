///////////////////
// Matrix macros //
///////////////////

/// Early return with a `DimensionMismatch` error if two matrices do not have
/// the same shape.
#[macro_export]
macro_rules! ensure_same_dims {
    ($matrix1:expr, $matrix2:expr) => {
        if ($matrix1.nrows(), $matrix1.ncols()) != ($matrix2.nrows(), $matrix2.ncols()) {
            return Err($crate::utils::errors::KernelError::DimensionMismatch {
                nrows_a: $matrix1.nrows(),
                ncols_a: $matrix1.ncols(),
                nrows_b: $matrix2.nrows(),
                ncols_b: $matrix2.ncols(),
            });
        }
    };
}

///////////////////
// Vector macros //
///////////////////

/// Early return with a `LengthMismatch` error if the vectors do not all have
/// the same length.
#[macro_export]
macro_rules! ensure_same_len {
    ($($vec:expr),+ $(,)?) => {
        {
            let lengths: Vec<usize> = vec![$($vec.len()),+];
            let first_len = lengths[0];

            if !lengths.iter().all(|&len| len == first_len) {
                return Err($crate::utils::errors::KernelError::LengthMismatch { lengths });
            }
        }
    };
}

/// Early return with an `IndexOutOfRange` error if `index >= len`.
#[macro_export]
macro_rules! ensure_in_bounds {
    ($index:expr, $len:expr) => {
        if $index >= $len {
            return Err($crate::utils::errors::KernelError::IndexOutOfRange {
                index: $index,
                len: $len,
            });
        }
    };
}
