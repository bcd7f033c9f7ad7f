//! Cost functions compute the loss given a target, and the gradient a caller hands to the output layer.

use crate::error::{Error, Result};
use crate::numbers::*;
use crate::tensor::Vector;

fn check_lengths(label: &Vector, prediction: &Vector) -> Result<()> {
    if label.len() != prediction.len() {
        return Err(Error::DimensionMismatch {
            operation: "cross_entropy",
            left: label.shape(),
            right: prediction.shape(),
        });
    }

    Ok(())
}

/// Computes the cross-entropy of a prediction against a label.
///
/// A label of length one is a binary label, and the prediction is the probability of the positive class:
/// `-y ln(p) - (1 - y) ln(1 - p)`. Longer labels are one-hot, and the loss is `-sum(y ln(p))`.
pub fn cross_entropy(label: &Vector, prediction: &Vector) -> Result<Float> {
    check_lengths(label, prediction)?;

    let label = label.values();
    let prediction = prediction.values();
    if label.len() == 1 {
        let (y, p) = (label[0], prediction[0]);
        return Ok(-y * p.ln() - (1.0 - y) * (1.0 - p).ln());
    }

    Ok(-label
        .iter()
        .zip(prediction.iter())
        .map(|(y, p)| y * p.ln())
        .sum::<Float>())
}

/// Computes the derivative of `cross_entropy` with respect to each value of the prediction, storing it in
/// `derivative`. Each denominator is offset by `EPSILON`.
pub fn cross_entropy_derivative(
    label: &Vector,
    prediction: &Vector,
    derivative: &Vector,
) -> Result<()> {
    check_lengths(label, prediction)?;

    if label.len() == 1 {
        let (y, p) = (label.get(0)?, prediction.get(0)?);
        let gradient = -(y / (p + EPSILON) - (1.0 - y) / (1.0 - p + EPSILON));
        return prediction.map_into(derivative, |_| gradient);
    }

    let gradient = label
        .values()
        .iter()
        .zip(prediction.values().iter())
        .map(|(y, p)| -y / (p + EPSILON))
        .collect::<Vec<Float>>();

    derivative.copy_from_slice(&gradient)
}

/// Computes the squared error of a single output, `(label - output)^2`.
pub fn mse(label: Float, output: Float) -> Float {
    (label - output) * (label - output)
}

/// Computes the derivative of `mse` with respect to the output, `-2(label - output)`.
pub fn mse_derivative(label: Float, output: Float) -> Float {
    -2.0 * (label - output)
}
