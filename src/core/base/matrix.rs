use faer::{Mat, MatRef};
use rayon::prelude::*;

use crate::core::base::vector::NumericVector;
use crate::utils::errors::{KernelError, KernelResult};
use crate::utils::general::{array_max_nan_safe, array_min_nan_safe};
use crate::{ensure_in_bounds, ensure_same_dims};

/////////////
// Helpers //
/////////////

/// Check that a row/column source covers the required dimension
fn ensure_long_enough(required: usize, found: usize) -> KernelResult<()> {
    if found < required {
        return Err(KernelError::SourceTooShort { required, found });
    }
    Ok(())
}

/// Column-wise NaN-safe extrema of a matrix
///
/// ### Params
///
/// * `mat` - The matrix
///
/// ### Returns
///
/// Tuple of the column maxes and the column mins.
fn column_extrema(mat: &MatRef<f32>) -> (Vec<f32>, Vec<f32>) {
    let nrows = mat.nrows();
    (0..mat.ncols())
        .into_par_iter()
        .map(|j| {
            let col: Vec<f32> = (0..nrows).map(|i| mat[(i, j)]).collect();
            (array_max_nan_safe(&col).0, array_min_nan_safe(&col).0)
        })
        .unzip()
}

/////////////
// Builder //
/////////////

/// Owned, mutable dense `f32` matrix
///
/// Consumed by [`MatrixBuilder::freeze`] into a read-only [`NumericMatrix`].
#[derive(Clone, Debug)]
pub struct MatrixBuilder {
    data: Mat<f32>,
}

impl MatrixBuilder {
    /// Zero-filled matrix of the given shape
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            data: Mat::from_fn(nrows, ncols, |_, _| 0_f32),
        }
    }

    /// Build a matrix from row-major nested vectors
    ///
    /// ### Params
    ///
    /// * `rows` - The rows; all must have the same length.
    ///
    /// ### Returns
    ///
    /// The builder, or `RaggedRows` on uneven input.
    pub fn from_rows(rows: &[Vec<f32>]) -> KernelResult<Self> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(KernelError::RaggedRows {
                row,
                expected: ncols,
                found: r.len(),
            });
        }
        Ok(Self {
            data: Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j]),
        })
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Bounds-checked element access
    pub fn get_element(&self, row: usize, col: usize) -> KernelResult<f32> {
        ensure_in_bounds!(row, self.nrows());
        ensure_in_bounds!(col, self.ncols());
        Ok(self.data[(row, col)])
    }

    /// Bounds-checked element update
    pub fn set_element(&mut self, row: usize, col: usize, value: f32) -> KernelResult<()> {
        ensure_in_bounds!(row, self.nrows());
        ensure_in_bounds!(col, self.ncols());
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Overwrite a row
    ///
    /// ### Params
    ///
    /// * `row` - Row to overwrite
    /// * `values` - At least `ncols` values; anything past `ncols` is ignored
    pub fn set_row(&mut self, row: usize, values: &[f32]) -> KernelResult<()> {
        ensure_in_bounds!(row, self.nrows());
        ensure_long_enough(self.ncols(), values.len())?;
        for (j, &v) in values.iter().take(self.ncols()).enumerate() {
            self.data[(row, j)] = v;
        }
        Ok(())
    }

    /// Overwrite a column
    ///
    /// ### Params
    ///
    /// * `col` - Column to overwrite
    /// * `values` - At least `nrows` values; anything past `nrows` is ignored
    pub fn set_column(&mut self, col: usize, values: &[f32]) -> KernelResult<()> {
        ensure_in_bounds!(col, self.ncols());
        ensure_long_enough(self.nrows(), values.len())?;
        for (i, &v) in values.iter().take(self.nrows()).enumerate() {
            self.data[(i, col)] = v;
        }
        Ok(())
    }

    /// Overwrite a row from a vector (see [`MatrixBuilder::set_row`])
    pub fn set_row_vector(&mut self, row: usize, values: &NumericVector) -> KernelResult<()> {
        self.set_row(row, values.as_slice())
    }

    /// Overwrite a column from a vector (see [`MatrixBuilder::set_column`])
    pub fn set_column_vector(&mut self, col: usize, values: &NumericVector) -> KernelResult<()> {
        self.set_column(col, values.as_slice())
    }

    /// Consume the builder into a frozen matrix
    pub fn freeze(self) -> NumericMatrix {
        NumericMatrix::from_mat(self.data)
    }
}

////////////
// Matrix //
////////////

/// Read-only dense `f32` matrix
///
/// ### Fields
///
/// * `data` - The values
/// * `column_maxes` - NaN-safe maximum per column
/// * `column_mins` - NaN-safe minimum per column
#[derive(Clone, Debug)]
pub struct NumericMatrix {
    data: Mat<f32>,
    column_maxes: NumericVector,
    column_mins: NumericVector,
}

impl NumericMatrix {
    /// Freeze an existing faer matrix
    pub fn from_mat(data: Mat<f32>) -> Self {
        let (maxes, mins) = column_extrema(&data.as_ref());
        Self {
            data,
            column_maxes: NumericVector::from_vec(maxes),
            column_mins: NumericVector::from_vec(mins),
        }
    }

    /// Zero-filled matrix of the given shape
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        MatrixBuilder::zeros(nrows, ncols).freeze()
    }

    /// Deep copy into a new builder; the copy is always mutable
    pub fn to_builder(&self) -> MatrixBuilder {
        MatrixBuilder {
            data: self.data.clone(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying faer matrix
    pub fn as_mat_ref(&self) -> MatRef<'_, f32> {
        self.data.as_ref()
    }

    /// Bounds-checked element access
    pub fn get_element(&self, row: usize, col: usize) -> KernelResult<f32> {
        ensure_in_bounds!(row, self.nrows());
        ensure_in_bounds!(col, self.ncols());
        Ok(self.data[(row, col)])
    }

    /// Independent copy of a row
    pub fn row(&self, row: usize) -> KernelResult<NumericVector> {
        ensure_in_bounds!(row, self.nrows());
        let values: Vec<f32> = (0..self.ncols()).map(|j| self.data[(row, j)]).collect();
        Ok(NumericVector::from_vec(values))
    }

    /// Independent copy of a column
    pub fn column(&self, col: usize) -> KernelResult<NumericVector> {
        ensure_in_bounds!(col, self.ncols());
        let values: Vec<f32> = (0..self.nrows()).map(|i| self.data[(i, col)]).collect();
        Ok(NumericVector::from_vec(values))
    }

    /// NaN-safe maximum of every column (NaN for all-NaN columns)
    pub fn column_maxes(&self) -> &NumericVector {
        &self.column_maxes
    }

    /// NaN-safe minimum of every column (NaN for all-NaN columns)
    pub fn column_mins(&self) -> &NumericVector {
        &self.column_mins
    }

    /// Elementwise division
    ///
    /// ### Params
    ///
    /// * `other` - The denominators; must have the same shape.
    /// * `treat_div_by_zero_as_zero` - If `true`, a zero denominator yields
    ///   `0.0`. Otherwise IEEE semantics apply (±Inf or NaN).
    ///
    /// ### Returns
    ///
    /// The quotient matrix.
    pub fn divide(
        &self,
        other: &NumericMatrix,
        treat_div_by_zero_as_zero: bool,
    ) -> KernelResult<NumericMatrix> {
        ensure_same_dims!(self, other);

        let res = Mat::from_fn(self.nrows(), self.ncols(), |i, j| {
            let denominator = other.data[(i, j)];
            if treat_div_by_zero_as_zero && denominator == 0.0 {
                0.0
            } else {
                self.data[(i, j)] / denominator
            }
        });

        Ok(NumericMatrix::from_mat(res))
    }

    /// Sub-matrix with the given rows, in the given order
    pub fn extract_rows(&self, rows: &[usize]) -> KernelResult<NumericMatrix> {
        for &r in rows {
            ensure_in_bounds!(r, self.nrows());
        }
        let res = Mat::from_fn(rows.len(), self.ncols(), |i, j| self.data[(rows[i], j)]);
        Ok(NumericMatrix::from_mat(res))
    }

    /// Sub-matrix with the given columns, in the given order
    pub fn extract_columns(&self, cols: &[usize]) -> KernelResult<NumericMatrix> {
        for &c in cols {
            ensure_in_bounds!(c, self.ncols());
        }
        let res = Mat::from_fn(self.nrows(), cols.len(), |i, j| self.data[(i, cols[j])]);
        Ok(NumericMatrix::from_mat(res))
    }

    pub fn transpose(&self) -> NumericMatrix {
        let res = Mat::from_fn(self.ncols(), self.nrows(), |i, j| self.data[(j, i)]);
        NumericMatrix::from_mat(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NumericMatrix {
        MatrixBuilder::from_rows(&[
            vec![1.0, -2.0, f32::NAN],
            vec![4.0, 5.0, f32::NAN],
            vec![-7.0, 8.0, f32::NAN],
        ])
        .unwrap()
        .freeze()
    }

    #[test]
    fn test_zero_filled() {
        let m = NumericMatrix::zeros(2, 3);
        assert_eq!((m.nrows(), m.ncols()), (2, 3));
        assert_eq!(m.get_element(1, 2), Ok(0.0));
        assert_eq!(m.column_maxes().as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bounds_checks() {
        let m = sample();
        assert_eq!(
            m.get_element(3, 0),
            Err(KernelError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(m.row(5).is_err());
        assert!(m.column(3).is_err());
    }

    #[test]
    fn test_row_and_column_copies() {
        let m = sample();
        assert_eq!(m.row(1).unwrap().as_slice()[..2], [4.0, 5.0]);
        assert_eq!(m.column(0).unwrap().as_slice(), &[1.0, 4.0, -7.0]);
    }

    #[test]
    fn test_column_extrema() {
        let m = sample();
        assert_eq!(&m.column_maxes().as_slice()[..2], &[4.0, 8.0]);
        assert_eq!(&m.column_mins().as_slice()[..2], &[-7.0, -2.0]);
        assert!(m.column_maxes().as_slice()[2].is_nan());
        assert!(m.column_mins().as_slice()[2].is_nan());
    }

    #[test]
    fn test_set_row_and_column() {
        let mut b = MatrixBuilder::zeros(2, 3);
        b.set_row(0, &[1.0, 2.0, 3.0, 99.0]).unwrap();
        b.set_column_vector(2, &NumericVector::from_slice(&[7.0, 8.0]))
            .unwrap();
        assert_eq!(
            b.set_row(1, &[1.0]),
            Err(KernelError::SourceTooShort {
                required: 3,
                found: 1
            })
        );
        assert!(b.set_element(2, 0, 1.0).is_err());
        let m = b.freeze();
        assert_eq!(m.row(0).unwrap().as_slice(), &[1.0, 2.0, 7.0]);
        assert_eq!(m.row(1).unwrap().as_slice(), &[0.0, 0.0, 8.0]);
    }

    #[test]
    fn test_copy_is_independent_and_mutable() {
        let m = sample();
        let mut b = m.to_builder();
        b.set_element(0, 0, 100.0).unwrap();
        let m2 = b.freeze();
        assert_eq!(m.get_element(0, 0), Ok(1.0));
        assert_eq!(m2.get_element(0, 0), Ok(100.0));
        assert_eq!(m2.column_maxes().as_slice()[0], 100.0);
    }

    #[test]
    fn test_ragged_rows() {
        let res = MatrixBuilder::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            res.unwrap_err(),
            KernelError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_divide() {
        let a = MatrixBuilder::from_rows(&[vec![1.0, 2.0], vec![3.0, 0.0]])
            .unwrap()
            .freeze();
        let b = MatrixBuilder::from_rows(&[vec![2.0, 0.0], vec![3.0, 0.0]])
            .unwrap()
            .freeze();

        let zeroed = a.divide(&b, true).unwrap();
        assert_eq!(zeroed.row(0).unwrap().as_slice(), &[0.5, 0.0]);
        assert_eq!(zeroed.row(1).unwrap().as_slice(), &[1.0, 0.0]);

        let ieee = a.divide(&b, false).unwrap();
        assert_eq!(ieee.get_element(0, 1), Ok(f32::INFINITY));
        assert!(ieee.get_element(1, 1).unwrap().is_nan());

        let c = NumericMatrix::zeros(3, 2);
        assert!(matches!(
            a.divide(&c, true),
            Err(KernelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_extract_and_transpose() {
        let m = sample();
        let rows = m.extract_rows(&[2, 0]).unwrap();
        assert_eq!(rows.column(0).unwrap().as_slice(), &[-7.0, 1.0]);
        let cols = m.extract_columns(&[1]).unwrap();
        assert_eq!(cols.ncols(), 1);
        assert_eq!(cols.column(0).unwrap().as_slice(), &[-2.0, 5.0, 8.0]);
        assert!(m.extract_rows(&[3]).is_err());

        let t = m.transpose();
        assert_eq!((t.nrows(), t.ncols()), (3, 3));
        assert_eq!(t.row(0).unwrap().as_slice(), &[1.0, 4.0, -7.0]);
    }
}
