//! A fully-connected neural network layer, which applies y = activation(Wx + b).

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layer::{check_binding, Layer};
use crate::numbers::*;
use crate::tensor::{Matrix, Vector};

/// A fully-connected neural network layer, storing the parameters of the layer, and the buffers of its
/// most recent forward, and backward pass.
pub struct Dense {
    input: Vector,
    linear: Vector,
    output: Vector,
    weights: Matrix,
    biases: Vector,
    weights_gradient: Matrix,
    biases_gradient: Vector,
    incoming_gradient: Vector,
    outgoing_gradient: Vector,
    activation_gradient: Vector,
    activation: Box<dyn Activation>,
}

impl Dense {
    /// Constructs a new dense layer, with a given input, and output size.
    ///
    /// Weights are initialized uniformly in `[-sqrt(6 / (input_size + output_size)), sqrt(6 / (input_size + output_size))]`,
    /// and every other buffer, including the biases, starts at zero.
    pub fn new<A>(input_size: usize, output_size: usize, activation: A) -> Result<Dense>
    where
        A: Activation + 'static,
    {
        if input_size == 0 || output_size == 0 {
            return Err(Error::EmptyShape);
        }

        log::debug!("dense layer: {} -> {}", input_size, output_size);

        Ok(Dense {
            input: Vector::zeros(input_size),
            linear: Vector::zeros(output_size),
            output: Vector::zeros(output_size),
            weights: Matrix::xavier(output_size, input_size),
            biases: Vector::zeros(output_size),
            weights_gradient: Matrix::zeros(output_size, input_size),
            biases_gradient: Vector::zeros(output_size),
            incoming_gradient: Vector::zeros(output_size),
            outgoing_gradient: Vector::zeros(input_size),
            activation_gradient: Vector::zeros(output_size),
            activation: Box::new(activation),
        })
    }

    /// Returns the size of the input.
    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    /// Returns the size of the output.
    pub fn output_size(&self) -> usize {
        self.weights.rows()
    }

    /// Returns a view of the `output_size` by `input_size` weights.
    pub fn weights(&self) -> Matrix {
        self.weights.clone()
    }

    /// Returns a view of the biases.
    pub fn biases(&self) -> Vector {
        self.biases.clone()
    }

    /// Returns a view of the linear transformation, `Wx + b`, of the last forward pass.
    pub fn linear(&self) -> Vector {
        self.linear.clone()
    }

    /// Returns a view of the weight gradients of the last backward pass.
    pub fn weights_gradient(&self) -> Matrix {
        self.weights_gradient.clone()
    }

    /// Returns a view of the bias gradients of the last backward pass.
    pub fn biases_gradient(&self) -> Vector {
        self.biases_gradient.clone()
    }
}

impl Layer for Dense {
    fn forward(&mut self) -> Result<()> {
        let (input_size, output_size) = (self.input_size(), self.output_size());

        // broadcast the vectors to column matrices for the product
        let input = self.input.to_matrix(input_size, 1)?;
        let linear = self.linear.to_matrix(output_size, 1)?;

        Matrix::matmul(&self.weights, &input, &linear)?;
        Vector::add(&self.linear, &self.biases, &self.linear)?;

        self.activation.forward(&self.linear, &self.output)
    }

    fn backward(&mut self, learning_rate: Float) -> Result<()> {
        let (input_size, output_size) = (self.input_size(), self.output_size());

        // the bias gradient is also the delta of the linear transformation
        let delta_column = self.biases_gradient.to_matrix(output_size, 1)?;
        let delta_row = self.biases_gradient.to_matrix(1, output_size)?;
        let input_row = self.input.to_matrix(1, input_size)?;
        let outgoing_row = self.outgoing_gradient.to_matrix(1, input_size)?;

        self.activation.backward(
            &self.linear,
            &self.incoming_gradient,
            &self.activation_gradient,
            &self.biases_gradient,
        )?;

        Matrix::matmul(&delta_column, &input_row, &self.weights_gradient)?;
        Matrix::matmul(&delta_row, &self.weights, &outgoing_row)?;

        // parameters are only updated once every gradient is computed
        self.biases.descend(&self.biases_gradient, learning_rate)?;
        self.weights.descend(&self.weights_gradient, learning_rate)
    }

    fn input(&self) -> Vector {
        self.input.clone()
    }

    fn output(&self) -> Vector {
        self.output.clone()
    }

    fn incoming_gradient(&self) -> Vector {
        self.incoming_gradient.clone()
    }

    fn outgoing_gradient(&self) -> Vector {
        self.outgoing_gradient.clone()
    }

    fn bind_input(&mut self, input: Vector) -> Result<()> {
        check_binding(&self.input, &input)?;
        self.input = input;
        Ok(())
    }

    fn bind_incoming_gradient(&mut self, gradient: Vector) -> Result<()> {
        check_binding(&self.incoming_gradient, &gradient)?;
        self.incoming_gradient = gradient;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::activation::{Identity, Relu, Sigmoid, Softmax};
    use crate::cost;

    fn fixture() -> Dense {
        let dense = Dense::new(2, 2, Identity).unwrap();
        dense
            .weights()
            .to_vector()
            .copy_from_slice(&[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        dense
    }

    /// An activation whose derivative always fails.
    struct Broken;

    impl Activation for Broken {
        fn forward(&self, input: &Vector, output: &Vector) -> Result<()> {
            Identity.forward(input, output)
        }

        fn derivative(&self, _: &Vector, _: &Vector) -> Result<()> {
            Err(Error::EmptyShape)
        }
    }

    #[test]
    fn test_new() {
        let dense = Dense::new(3, 2, Relu).unwrap();
        let bound = (6.0 / 5.0 as Float).sqrt();

        assert_eq!(dense.weights().shape(), vec![2, 3]);
        assert!(dense.weights().values().iter().all(|x| x.abs() <= bound));
        assert_eq!(dense.biases(), Vector::zeros(2));
        assert_eq!(dense.input().len(), 3);
        assert_eq!(dense.outgoing_gradient().len(), 3);
        assert_eq!(dense.incoming_gradient().len(), 2);

        assert_eq!(Dense::new(0, 2, Relu).err(), Some(Error::EmptyShape));
    }

    #[test]
    fn test_forward() {
        let mut dense = fixture();
        dense.biases().copy_from_slice(&[0.5, -0.5]).unwrap();
        dense.input().copy_from_slice(&[1.0, 1.0]).unwrap();

        dense.forward().unwrap();
        assert_eq!(dense.linear(), vector![3.5, 6.5]);
        assert_eq!(dense.output(), vector![3.5, 6.5]);
        assert_eq!(dense.input(), vector![1.0, 1.0]);
    }

    #[test]
    fn test_forward_activation() {
        let mut dense = Dense::new(2, 2, Relu).unwrap();
        dense
            .weights()
            .to_vector()
            .copy_from_slice(&[1.0, 0.0, 0.0, -1.0])
            .unwrap();
        dense.input().copy_from_slice(&[2.0, 3.0]).unwrap();

        dense.forward().unwrap();
        assert_eq!(dense.linear(), vector![2.0, -3.0]);
        assert_eq!(dense.output(), vector![2.0, 0.0]);
    }

    #[test]
    fn test_forward_deterministic() {
        let mut dense = Dense::new(4, 3, Sigmoid).unwrap();
        dense.input().copy_from_slice(&[0.1, -0.2, 0.3, 0.4]).unwrap();

        dense.forward().unwrap();
        let first = dense.output().to_vec();
        dense.forward().unwrap();
        assert_eq!(dense.output().to_vec(), first);
    }

    #[test]
    fn test_backward() {
        let mut dense = fixture();
        dense.input().copy_from_slice(&[1.0, 2.0]).unwrap();
        dense.forward().unwrap();
        assert_eq!(dense.output(), vector![5.0, 11.0]);

        dense
            .incoming_gradient()
            .copy_from_slice(&[1.0, -1.0])
            .unwrap();
        dense.backward(0.1).unwrap();

        assert_eq!(dense.biases_gradient(), vector![1.0, -1.0]);
        assert_eq!(
            dense.weights_gradient(),
            Matrix::from_rows(vec![vec![1.0, 2.0], vec![-1.0, -2.0]]).unwrap()
        );
        assert_eq!(dense.outgoing_gradient(), vector![-2.0, -2.0]);

        assert_relative_eq!(dense.biases(), vector![-0.1, 0.1]);
        assert_relative_eq!(
            dense.weights(),
            Matrix::from_rows(vec![vec![0.9, 1.8], vec![3.1, 4.2]]).unwrap()
        );
    }

    #[test]
    fn test_backward_softmax_cross_entropy() {
        let mut dense = Dense::new(2, 3, Softmax).unwrap();
        dense
            .weights()
            .to_vector()
            .copy_from_slice(&[0.5, -0.25, 0.1, 0.3, -0.4, 0.2])
            .unwrap();
        dense.input().copy_from_slice(&[1.0, 2.0]).unwrap();
        dense.forward().unwrap();

        let label = vector![1.0, 0.0, 0.0];
        let prediction = dense.output().duplicate();
        cost::cross_entropy_derivative(&label, &prediction, &dense.incoming_gradient()).unwrap();
        dense.backward(0.0).unwrap();

        // every logit receives `p - y`, not only the labelled one
        let expected = prediction.duplicate();
        expected.set(0, prediction.get(0).unwrap() - 1.0).unwrap();
        assert_relative_eq!(dense.biases_gradient(), expected, epsilon = 1e-6);
        assert!(dense.biases_gradient().get(1).unwrap() > 0.0);
        assert!(dense.biases_gradient().get(2).unwrap() > 0.0);
    }

    #[test]
    fn test_backward_failure_keeps_parameters() {
        let mut dense = Dense::new(2, 2, Broken).unwrap();
        let weights = dense.weights().duplicate();
        dense.input().copy_from_slice(&[1.0, 2.0]).unwrap();
        dense.incoming_gradient().fill(1.0);

        dense.forward().unwrap();
        assert_eq!(dense.backward(0.1).unwrap_err(), Error::EmptyShape);
        assert_eq!(dense.weights(), weights);
        assert_eq!(dense.biases(), Vector::zeros(2));
    }

    #[test]
    fn test_bind_mismatch() {
        let mut dense = fixture();
        assert!(dense.bind_input(Vector::zeros(3)).is_err());
        assert!(dense.bind_incoming_gradient(Vector::zeros(1)).is_err());

        let input = vector![4.0, 5.0];
        dense.bind_input(input.clone()).unwrap();
        assert!(dense.input().shares_values_with(&input));
    }

    #[test]
    fn test_fit_line() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(1);

        let mut dense = Dense::new(1, 1, Identity).unwrap();
        dense.weights().set(0, 0, rng.gen_range(-1.0..1.0)).unwrap();
        let mut loss = 1.0;
        for _ in 0..4096 {
            let x: Float = rng.gen_range(-5.0..5.0);
            let target = 3.0 * x + 1.0;

            dense.input().set(0, x).unwrap();
            dense.forward().unwrap();
            let output = dense.output().get(0).unwrap();
            loss = cost::mse(target, output);

            dense
                .incoming_gradient()
                .set(0, cost::mse_derivative(target, output))
                .unwrap();
            dense.backward(0.01).unwrap();
        }

        assert!(loss < 1e-5);
        assert_relative_eq!(dense.weights().get(0, 0).unwrap(), 3.0, epsilon = 1e-3);
        assert_relative_eq!(dense.biases().get(0).unwrap(), 1.0, epsilon = 1e-3);
    }
}
