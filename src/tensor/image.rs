use super::*;

/// Returns the sum of the kernel values, or `EPSILON` if they sum to exactly zero.
pub(crate) fn normalizer(kernel: &[Float]) -> Float {
    let total: Float = kernel.iter().sum();
    if total == 0.0 {
        EPSILON
    } else {
        total
    }
}

/// Checks that a square kernel of `size` fits within `input`, returning the dimensions of the
/// correlation output.
pub(crate) fn correlation_dimensions(
    input: (usize, usize),
    size: usize,
) -> Result<(usize, usize)> {
    let (rows, cols) = input;
    if size == 0 || size > rows || size > cols {
        return Err(Error::InvalidKernel { size, rows, cols });
    }

    Ok((rows - size + 1, cols - size + 1))
}

/// Correlates `input` with a square `kernel`, with a stride of one, and no padding, storing the result in
/// `output`. The kernel is not flipped. Each output value is divided by the sum of the kernel values.
///
/// The output must be `input.rows() - k + 1` by `input.cols() - k + 1`, for a `k` by `k` kernel.
///
/// # Examples
///
/// ```
/// # use synapse::tensor::*;
/// let input = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
/// let kernel = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
/// let output = Matrix::zeros(1, 2);
///
/// correlate(&input, &output, &kernel).unwrap();
/// assert_eq!(output.to_vec(), vec![3.0, 4.0]);
/// ```
pub fn correlate(input: &Matrix, output: &Matrix, kernel: &Matrix) -> Result<()> {
    if kernel.rows != kernel.cols {
        return Err(Error::DimensionMismatch {
            operation: "correlate",
            left: kernel.shape(),
            right: vec![kernel.rows, kernel.rows],
        });
    }

    let size = kernel.rows;
    let (output_rows, output_cols) = correlation_dimensions((input.rows, input.cols), size)?;
    if output.rows != output_rows || output.cols != output_cols {
        return Err(Error::DimensionMismatch {
            operation: "correlate",
            left: vec![output_rows, output_cols],
            right: output.shape(),
        });
    }

    let values = {
        let image = input.values();
        let kernel = kernel.values();
        let total = normalizer(&kernel);

        let mut values = vec![0.0; output_rows * output_cols];
        for i in 0..output_rows {
            for j in 0..output_cols {
                let mut sum = 0.0;
                for p in 0..size {
                    for q in 0..size {
                        sum += kernel[p * size + q] * image[(i + p) * input.cols + j + q];
                    }
                }

                values[i * output_cols + j] = sum / total;
            }
        }

        values
    };

    output.storage.assign(&values);
    Ok(())
}

/// Computes the maximum of each non-overlapping `size` by `size` window of `input`, storing the result in
/// `output`, which must be `input.rows() / size` by `input.cols() / size`.
///
/// Returns the row-major index into `input` of the maximum of each window, in the order of `output`. The
/// first maximum is chosen when a window contains ties.
pub fn max_pool(input: &Matrix, output: &Matrix, size: usize) -> Result<Vec<usize>> {
    let (rows, cols) = (input.rows, input.cols);
    if size == 0 || rows % size != 0 || cols % size != 0 {
        return Err(Error::InvalidPool { size, rows, cols });
    }

    let (output_rows, output_cols) = (rows / size, cols / size);
    if output.rows != output_rows || output.cols != output_cols {
        return Err(Error::DimensionMismatch {
            operation: "max_pool",
            left: vec![output_rows, output_cols],
            right: output.shape(),
        });
    }

    let (values, positions) = {
        let image = input.values();
        let mut values = Vec::with_capacity(output_rows * output_cols);
        let mut positions = Vec::with_capacity(output_rows * output_cols);

        for i in 0..output_rows {
            for j in 0..output_cols {
                let mut position = i * size * cols + j * size;
                for s in 0..size {
                    for t in 0..size {
                        let index = (i * size + s) * cols + j * size + t;
                        if image[index] > image[position] {
                            position = index;
                        }
                    }
                }

                values.push(image[position]);
                positions.push(position);
            }
        }

        (values, positions)
    };

    output.storage.assign(&values);
    Ok(positions)
}
