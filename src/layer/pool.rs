//! A max pooling neural network layer, which keeps the maximum of each window of each channel.

use crate::error::{Error, Result};
use crate::layer::{check_binding, Layer};
use crate::numbers::*;
use crate::tensor::{max_pool, Stack, Vector};

/// A max pooling neural network layer over non-overlapping square windows. It has no parameters, and
/// routes the gradient of each window to the position of its maximum.
pub struct Pool {
    input: Stack,
    output: Stack,
    incoming_gradient: Stack,
    outgoing_gradient: Stack,
    size: usize,
    positions: Vec<usize>,
}

impl Pool {
    /// Constructs a new max pooling layer over `channels` channels of `rows` by `cols` values, with
    /// `size` by `size` windows, which must evenly divide each channel.
    pub fn new(channels: usize, rows: usize, cols: usize, size: usize) -> Result<Pool> {
        if channels == 0 || rows == 0 || cols == 0 {
            return Err(Error::EmptyShape);
        }

        if size == 0 || rows % size != 0 || cols % size != 0 {
            return Err(Error::InvalidPool { size, rows, cols });
        }

        let (output_rows, output_cols) = (rows / size, cols / size);
        log::debug!(
            "pool layer: {} x {} x {} -> {} x {} x {}",
            channels,
            rows,
            cols,
            channels,
            output_rows,
            output_cols
        );

        // until the first forward pass, route gradients to the first value of each window
        let positions = (0..channels)
            .flat_map(|c| {
                (0..output_rows).flat_map(move |i| {
                    (0..output_cols).map(move |j| (c * rows + i * size) * cols + j * size)
                })
            })
            .collect();

        Ok(Pool {
            input: Stack::zeros(channels, rows, cols),
            output: Stack::zeros(channels, output_rows, output_cols),
            incoming_gradient: Stack::zeros(channels, output_rows, output_cols),
            outgoing_gradient: Stack::zeros(channels, rows, cols),
            size,
            positions,
        })
    }

    /// Returns the flat input index of the maximum of each window, from the last forward pass.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

impl Layer for Pool {
    fn forward(&mut self) -> Result<()> {
        let channel_length = self.input.height() * self.input.width();

        let mut positions = Vec::with_capacity(self.positions.len());
        for channel in 0..self.input.channels() {
            let channel_positions = max_pool(
                &self.input.channel(channel)?,
                &self.output.channel(channel)?,
                self.size,
            )?;
            positions.extend(
                channel_positions
                    .into_iter()
                    .map(|p| p + channel * channel_length),
            );
        }

        self.positions = positions;
        Ok(())
    }

    fn backward(&mut self, _learning_rate: Float) -> Result<()> {
        let mut gradient = vec![0.0; self.outgoing_gradient.to_vector().len()];
        for (&position, &delta) in self
            .positions
            .iter()
            .zip(self.incoming_gradient.values().iter())
        {
            gradient[position] += delta;
        }

        self.outgoing_gradient.to_vector().copy_from_slice(&gradient)
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
