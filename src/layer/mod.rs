//! Implementations of neural network layers.
//!
//! Layers own their buffers, and are chained by aliasing: the output of one layer becomes the input of the
//! next, and the outgoing gradient of the next becomes the incoming gradient of the first. See `connect`.
//! Forward passes must then run from the first layer to the last, and backward passes from the last layer
//! to the first, each backward pass immediately following a forward pass on the same input.

pub mod conv;
pub mod dense;
pub mod pool;

pub use self::conv::Conv;
pub use self::dense::Dense;
pub use self::pool::Pool;

use crate::error::{Error, Result};
use crate::numbers::*;
use crate::tensor::Vector;

/// A layer of a neural network, which implements a forward, and backward pass over its own buffers.
pub trait Layer {
    /// Computes the output of the layer from its current input.
    fn forward(&mut self) -> Result<()>;

    /// Computes the gradients of the layer from its incoming gradient, writes the outgoing gradient for the
    /// previous layer, and takes a gradient descent step on any parameters.
    fn backward(&mut self, learning_rate: Float) -> Result<()>;

    /// Returns a flat view of the input buffer.
    fn input(&self) -> Vector;

    /// Returns a flat view of the output buffer.
    fn output(&self) -> Vector;

    /// Returns a flat view of the gradient of the loss with respect to the output.
    fn incoming_gradient(&self) -> Vector;

    /// Returns a flat view of the gradient of the loss with respect to the input.
    fn outgoing_gradient(&self) -> Vector;

    /// Replaces the input buffer with a view of `input`, which must have the length of the input.
    fn bind_input(&mut self, input: Vector) -> Result<()>;

    /// Replaces the incoming gradient buffer with a view of `gradient`, which must have the length of the
    /// output.
    fn bind_incoming_gradient(&mut self, gradient: Vector) -> Result<()>;
}

/// Checks that a replacement buffer has the length of the buffer it replaces.
pub(crate) fn check_binding(current: &Vector, replacement: &Vector) -> Result<()> {
    if current.len() != replacement.len() {
        return Err(Error::ShapeMismatch {
            expected: current.len(),
            actual: replacement.len(),
        });
    }

    Ok(())
}

/// Chains `next` after `previous`, so that `next` reads the output of `previous`, and `previous` reads the
/// outgoing gradient of `next`. No values are copied.
pub fn connect(previous: &mut dyn Layer, next: &mut dyn Layer) -> Result<()> {
    check_binding(&next.input(), &previous.output())?;
    check_binding(&previous.incoming_gradient(), &next.outgoing_gradient())?;

    next.bind_input(previous.output())?;
    previous.bind_incoming_gradient(next.outgoing_gradient())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Identity;

    #[test]
    fn test_connect() {
        let mut first = Dense::new(2, 3, Identity).unwrap();
        let mut second = Dense::new(3, 1, Identity).unwrap();

        connect(&mut first, &mut second).unwrap();
        assert!(second.input().shares_values_with(&first.output()));
        assert!(first
            .incoming_gradient()
            .shares_values_with(&second.outgoing_gradient()));
    }

    #[test]
    fn test_connect_mismatch() {
        let mut first = Dense::new(2, 3, Identity).unwrap();
        let mut second = Dense::new(4, 1, Identity).unwrap();

        assert_eq!(
            connect(&mut first, &mut second).unwrap_err(),
            Error::ShapeMismatch {
                expected: 4,
                actual: 3
            }
        );
        assert!(!second.input().shares_values_with(&first.output()));
    }
}
