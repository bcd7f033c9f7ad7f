use super::*;

/// Computes a matrix multiplication on two row-major slices, storing the result in `values`.
///
/// # Arguments
///
/// `values` - The result values slice, initialized to zeros.
/// `matmul_dimensions` - The dimensions to compute from: `(output_rows, output_cols, sum_len)`.
/// `a` - The LHS matrix.
/// `b` - The RHS matrix.
fn matmul_slice(
    values: &mut [Float],
    matmul_dimensions: (usize, usize, usize),
    a: &[Float],
    b: &[Float],
) {
    let (output_rows, output_cols, sum_len) = matmul_dimensions;
    for r in 0..output_rows {
        for j in 0..output_cols {
            let mut sum = 0.0;
            for k in 0..sum_len {
                sum += a[r * sum_len + k] * b[k * output_cols + j];
            }

            values[r * output_cols + j] += sum;
        }
    }
}

impl Matrix {
    /// Computes the matrix product `a x b`, storing it in `result`.
    ///
    /// Fails without writing if the inner dimensions of `a`, and `b` differ, or if `result` is not
    /// `a.rows()` by `b.cols()`. The product is computed before it is written, so `result` may
    /// share values with either operand.
    ///
    /// # Examples
    ///
    /// ```
    /// # use synapse::tensor::*;
    /// let a = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    /// let b = Matrix::from_rows(vec![vec![6.0, 5.0], vec![4.0, 3.0], vec![2.0, 1.0]]).unwrap();
    /// let c = Matrix::zeros(2, 2);
    ///
    /// Matrix::matmul(&a, &b, &c).unwrap();
    /// assert_eq!(c.to_vec(), vec![20.0, 14.0, 56.0, 41.0]);
    /// ```
    pub fn matmul(a: &Matrix, b: &Matrix, result: &Matrix) -> Result<()> {
        if a.cols != b.rows {
            return Err(Error::DimensionMismatch {
                operation: "matmul",
                left: a.shape(),
                right: b.shape(),
            });
        }

        if result.rows != a.rows || result.cols != b.cols {
            return Err(Error::DimensionMismatch {
                operation: "matmul",
                left: vec![a.rows, b.cols],
                right: result.shape(),
            });
        }

        let mut values = vec![0.0; a.rows * b.cols];
        matmul_slice(
            &mut values,
            (a.rows, b.cols, a.cols),
            &a.values(),
            &b.values(),
        );

        result.storage.assign(&values);
        Ok(())
    }
}
