//! A convolutional neural network layer, which correlates each input channel with its own kernel.
//!
//! Each output channel is `y = (x.correlate(k)) / sum(k)`, with a stride of one, and no padding, so a
//! `rows` by `cols` channel with a `size` by `size` kernel produces a `rows - size + 1` by
//! `cols - size + 1` channel.

use crate::error::{Error, Result};
use crate::layer::{check_binding, Layer};
use crate::numbers::*;
use crate::tensor::{correlate, correlation_dimensions, normalizer, Stack, Vector};

/// A convolutional neural network layer, storing a kernel per channel, and the buffers of its most recent
/// forward, and backward pass.
pub struct Conv {
    input: Stack,
    output: Stack,
    kernels: Stack,
    kernels_gradient: Stack,
    incoming_gradient: Stack,
    outgoing_gradient: Stack,
    warned_zero_kernel: bool,
}

impl Conv {
    /// Constructs a new convolutional layer over `channels` channels of `rows` by `cols` values, with a
    /// `kernel_size` by `kernel_size` kernel per channel.
    ///
    /// Kernels are initialized uniformly in `[-sqrt(6 / n), sqrt(6 / n)]`, for `n` kernel values in total.
    pub fn new(channels: usize, rows: usize, cols: usize, kernel_size: usize) -> Result<Conv> {
        if channels == 0 || rows == 0 || cols == 0 {
            return Err(Error::EmptyShape);
        }

        let (output_rows, output_cols) = correlation_dimensions((rows, cols), kernel_size)?;

        log::debug!(
            "conv layer: {} x {} x {} -> {} x {} x {}",
            channels,
            rows,
            cols,
            channels,
            output_rows,
            output_cols
        );

        Ok(Conv {
            input: Stack::zeros(channels, rows, cols),
            output: Stack::zeros(channels, output_rows, output_cols),
            kernels: Stack::new(channels, kernel_size, kernel_size, 1.0),
            kernels_gradient: Stack::zeros(channels, kernel_size, kernel_size),
            incoming_gradient: Stack::zeros(channels, output_rows, output_cols),
            outgoing_gradient: Stack::zeros(channels, rows, cols),
            warned_zero_kernel: false,
        })
    }

    /// Returns a view of the kernels, one channel per input channel.
    pub fn kernels(&self) -> Stack {
        self.kernels.clone()
    }

    /// Returns a view of the kernel gradients of the last backward pass.
    pub fn kernels_gradient(&self) -> Stack {
        self.kernels_gradient.clone()
    }

    /// Returns the dimensions of the output: `(channels, rows, cols)`.
    pub fn output_dimensions(&self) -> (usize, usize, usize) {
        (
            self.output.channels(),
            self.output.height(),
            self.output.width(),
        )
    }

    /// Computes the kernel, and input gradients of a single channel.
    fn channel_gradients(&self, channel: usize) -> Result<(Vec<Float>, Vec<Float>)> {
        let cols = self.input.width();
        let (output_rows, output_cols) = (self.output.height(), self.output.width());
        let size = self.kernels.height();

        let input = self.input.channel(channel)?;
        let output = self.output.channel(channel)?;
        let kernel = self.kernels.channel(channel)?;
        let incoming = self.incoming_gradient.channel(channel)?;

        let x = input.values();
        let y = output.values();
        let k = kernel.values();
        let g = incoming.values();

        // a guarded normalizer is constant with respect to the kernel
        let sum: Float = k.iter().sum();
        let total = normalizer(&k);
        let shift = if sum == 0.0 { 0.0 } else { 1.0 };

        let mut kernel_gradient = vec![0.0; size * size];
        let mut input_gradient = vec![0.0; x.len()];
        for i in 0..output_rows {
            for j in 0..output_cols {
                let output_index = i * output_cols + j;
                let delta = g[output_index] / total;

                for p in 0..size {
                    for q in 0..size {
                        let input_index = (i + p) * cols + j + q;
                        kernel_gradient[p * size + q] +=
                            delta * (x[input_index] - shift * y[output_index]);
                        input_gradient[input_index] += delta * k[p * size + q];
                    }
                }
            }
        }

        Ok((kernel_gradient, input_gradient))
    }
}

impl Layer for Conv {
    fn forward(&mut self) -> Result<()> {
        for channel in 0..self.input.channels() {
            let kernel = self.kernels.channel(channel)?;
            if !self.warned_zero_kernel && kernel.values().iter().sum::<Float>() == 0.0 {
                log::warn!(
                    "kernel of channel {} sums to zero, normalizing by {}",
                    channel,
                    EPSILON
                );
                self.warned_zero_kernel = true;
            }

            correlate(
                &self.input.channel(channel)?,
                &self.output.channel(channel)?,
                &kernel,
            )?;
        }

        Ok(())
    }

    fn backward(&mut self, learning_rate: Float) -> Result<()> {
        for channel in 0..self.input.channels() {
            let (kernel_gradient, input_gradient) = self.channel_gradients(channel)?;

            self.kernels_gradient
                .channel(channel)?
                .to_vector()
                .copy_from_slice(&kernel_gradient)?;
            self.outgoing_gradient
                .channel(channel)?
                .to_vector()
                .copy_from_slice(&input_gradient)?;
        }

        self.kernels.descend(&self.kernels_gradient, learning_rate)
    }

    fn input(&self) -> Vector {
        self.input.to_vector()
    }

    fn output(&self) -> Vector {
        self.output.to_vector()
    }

    fn incoming_gradient(&self) -> Vector {
        self.incoming_gradient.to_vector()
    }

    fn outgoing_gradient(&self) -> Vector {
        self.outgoing_gradient.to_vector()
    }

    fn bind_input(&mut self, input: Vector) -> Result<()> {
        check_binding(&self.input.to_vector(), &input)?;
        self.input = input.to_stack(
            self.input.channels(),
            self.input.height(),
            self.input.width(),
        )?;
        Ok(())
    }

    fn bind_incoming_gradient(&mut self, gradient: Vector) -> Result<()> {
        check_binding(&self.incoming_gradient.to_vector(), &gradient)?;
        self.incoming_gradient = gradient.to_stack(
            self.incoming_gradient.channels(),
            self.incoming_gradient.height(),
            self.incoming_gradient.width(),
        )?;
        Ok(())
    }
}
