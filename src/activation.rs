//! An activation function is a non-linear function applied to the output of a layer.
//!
//! Each activation writes its transform of a vector into another vector of the same length, and
//! provides the element-wise derivative of the transform for the backward pass.

use crate::error::{Error, Result};
use crate::numbers::*;
use crate::tensor::Vector;

/// An activation function, and its derivative, which a layer applies to its linear transformation.
pub trait Activation {
    /// Computes the activation of `input`, storing it in `output`, which must have the same length.
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()>;

    /// Computes the derivative of the activation with respect to each value of `input`, storing it in
    /// `derivative`, which must have the same length.
    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()>;

    /// Computes the gradient of the loss with respect to `input`, given the gradient `incoming` with
    /// respect to the output, storing it in `delta`. `derivative` is scratch space of the same length.
    ///
    /// The default multiplies the element-wise derivative with the incoming gradient.
    fn backward(
        &self,
        input: &Vector,
        incoming: &Vector,
        derivative: &Vector,
        delta: &Vector,
    ) -> Result<()> {
        self.derivative(input, derivative)?;
        Vector::mul(incoming, derivative, delta)
    }
}

/// The identity, `f(x) = x`, for layers without a non-linearity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// The rectified linear unit, `f(x) = max(0, x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Relu;

/// The leaky rectified linear unit, `f(x) = x` for positive `x`, and `0.01x` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeakyRelu;

/// The logistic function, `f(x) = 1 / (1 + e^-x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sigmoid;

/// Normalizes the exponentials of the input to sum to one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Softmax;

const LEAKY_SLOPE: Float = 0.01;

fn sigmoid(x: Float) -> Float {
    1.0 / (1.0 + (-x).exp())
}

impl Activation for Identity {
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
        input.map_into(output, |x| x)
    }

    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()> {
        input.map_into(derivative, |_| 1.0)
    }
}

impl Activation for Relu {
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
        input.map_into(output, |x| if x > 0.0 { x } else { 0.0 })
    }

    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()> {
        input.map_into(derivative, |x| if x > 0.0 { 1.0 } else { 0.0 })
    }
}

impl Activation for LeakyRelu {
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
        input.map_into(output, |x| if x > 0.0 { x } else { LEAKY_SLOPE * x })
    }

    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()> {
        input.map_into(derivative, |x| if x > 0.0 { 1.0 } else { LEAKY_SLOPE })
    }
}

impl Activation for Sigmoid {
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
        input.map_into(output, sigmoid)
    }

    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()> {
        input.map_into(derivative, |x| {
            let s = sigmoid(x);
            s * (1.0 - s)
        })
    }
}

impl Activation for Softmax {
    fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
        // shift by the maximum so the largest exponential is one
        let max = input
            .values()
            .iter()
            .cloned()
            .fold(Float::NEG_INFINITY, Float::max);

        input.map_into(output, |x| (x - max).exp())?;

        let total: Float = output.values().iter().sum();
        output.map_into(output, |x| x / total)
    }

    /// The diagonal of the softmax Jacobian, `s(1 - s)`.
    fn derivative(&self, input: &Vector, derivative: &Vector) -> Result<()> {
        self.forward(input, derivative)?;
        derivative.map_into(derivative, |s| s * (1.0 - s))
    }

    /// The product of the full Jacobian with the incoming gradient, `s * (g - <g, s>)`.
    fn backward(
        &self,
        input: &Vector,
        incoming: &Vector,
        derivative: &Vector,
        delta: &Vector,
    ) -> Result<()> {
        // the scratch buffer holds the softmax itself
        self.forward(input, derivative)?;
        if incoming.len() != derivative.len() {
            return Err(Error::DimensionMismatch {
                operation: "softmax",
                left: incoming.shape(),
                right: derivative.shape(),
            });
        }

        let dot: Float = incoming
            .values()
            .iter()
            .zip(derivative.values().iter())
            .map(|(g, s)| g * s)
            .sum();

        incoming.map_into(delta, |g| g - dot)?;
        Vector::mul(delta, derivative, delta)
    }
}
