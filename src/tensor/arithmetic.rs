use super::*;

/// Applies `op` to each pair of values in `x`, and `y`. The results are collected before any write, so
/// the destination may be a view of either operand.
fn zip_values(x: &Storage, y: &Storage, op: impl Fn(Float, Float) -> Float) -> Vec<Float> {
    let x = x.read();
    let y = y.read();
    x.iter().zip(y.iter()).map(|(&a, &b)| op(a, b)).collect()
}

fn check_element_wise(
    operation: &'static str,
    shapes: (Vec<usize>, Vec<usize>, Vec<usize>),
) -> Result<()> {
    let (x, y, result) = shapes;
    if x != y {
        return Err(Error::DimensionMismatch {
            operation,
            left: x,
            right: y,
        });
    }

    if x != result {
        return Err(Error::DimensionMismatch {
            operation,
            left: x,
            right: result,
        });
    }

    Ok(())
}

impl Vector {
    /// Computes the element-wise sum `x + y`, storing it in `result`.
    pub fn add(x: &Vector, y: &Vector, result: &Vector) -> Result<()> {
        check_element_wise("add", (x.shape(), y.shape(), result.shape()))?;
        let values = zip_values(&x.storage, &y.storage, |a, b| a + b);
        result.storage.assign(&values);
        Ok(())
    }

    /// Computes the element-wise product `x * y`, storing it in `result`.
    pub fn mul(x: &Vector, y: &Vector, result: &Vector) -> Result<()> {
        check_element_wise("mul", (x.shape(), y.shape(), result.shape()))?;
        let values = zip_values(&x.storage, &y.storage, |a, b| a * b);
        result.storage.assign(&values);
        Ok(())
    }

    /// Takes a gradient descent step, `self -= learning_rate * gradient`.
    pub fn descend(&self, gradient: &Vector, learning_rate: Float) -> Result<()> {
        check_element_wise("descend", (self.shape(), gradient.shape(), self.shape()))?;
        let values = zip_values(&self.storage, &gradient.storage, |x, g| {
            x - learning_rate * g
        });
        self.storage.assign(&values);
        Ok(())
    }

    /// Replaces each value `x` with `clamp(x)`.
    pub fn clamp(&self) {
        self.storage.write().iter_mut().for_each(|x| *x = clamp(*x));
    }

    /// Applies `op` to each value of `self`, storing the results in `result`, which must have the same
    /// length.
    pub fn map_into(&self, result: &Vector, op: impl Fn(Float) -> Float) -> Result<()> {
        check_element_wise("map", (self.shape(), result.shape(), result.shape()))?;
        let values = self.values().iter().map(|&x| op(x)).collect::<Vec<Float>>();
        result.storage.assign(&values);
        Ok(())
    }
}

impl Matrix {
    /// Computes the element-wise sum `x + y`, storing it in `result`, which may be either operand.
    pub fn add(x: &Matrix, y: &Matrix, result: &Matrix) -> Result<()> {
        check_element_wise("add", (x.shape(), y.shape(), result.shape()))?;
        let values = zip_values(&x.storage, &y.storage, |a, b| a + b);
        result.storage.assign(&values);
        Ok(())
    }

    /// Takes a gradient descent step, `self -= learning_rate * gradient`.
    pub fn descend(&self, gradient: &Matrix, learning_rate: Float) -> Result<()> {
        self.to_vector()
            .descend(&gradient.to_vector(), learning_rate)
            .map_err(|_| Error::DimensionMismatch {
                operation: "descend",
                left: self.shape(),
                right: gradient.shape(),
            })
    }
}

impl Stack {
    /// Takes a gradient descent step, `self -= learning_rate * gradient`.
    pub fn descend(&self, gradient: &Stack, learning_rate: Float) -> Result<()> {
        if self.shape() != gradient.shape() {
            return Err(Error::DimensionMismatch {
                operation: "descend",
                left: self.shape(),
                right: gradient.shape(),
            });
        }

        self.to_vector().descend(&gradient.to_vector(), learning_rate)
    }
}
