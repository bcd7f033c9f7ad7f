//! A supervised neural network model, which chains layers, and runs their forward, and backward passes in
//! order.

use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::layer::{connect, Layer};
use crate::numbers::*;
use crate::tensor::Vector;

/// A neural network model, containing connected layers, and the configuration of the backward pass.
///
/// The loss is computed by the caller: after a forward pass, the caller passes the gradient of its loss
/// with respect to the output to `backward`.
pub struct Model {
    layers: Vec<Box<dyn Layer>>,
    config: TrainingConfig,
}

impl Model {
    /// Constructs a new model, connecting each layer to the next.
    pub fn new(mut layers: Vec<Box<dyn Layer>>, config: TrainingConfig) -> Result<Model> {
        if layers.is_empty() {
            return Err(Error::EmptyModel);
        }

        for i in 1..layers.len() {
            let (previous, next) = layers.split_at_mut(i);
            connect(previous[i - 1].as_mut(), next[0].as_mut())?;
        }

        log::debug!("model: {} layers, {:?}", layers.len(), config);
        Ok(Model { layers, config })
    }

    /// Computes the forward pass of every layer, from the first to the last, for a single sample.
    /// Returns a view of the output of the last layer.
    pub fn forward(&mut self, input: &[Float]) -> Result<Vector> {
        self.layers[0].input().copy_from_slice(input)?;

        for (i, layer) in self.layers.iter_mut().enumerate() {
            log::trace!("forward: layer {}", i);
            layer.forward()?;
        }

        Ok(self.output())
    }

    /// Computes the backward pass of every layer, from the last to the first, given the gradient of the
    /// loss with respect to the output of the last forward pass, and updates the parameters.
    pub fn backward(&mut self, gradient: &[Float]) -> Result<()> {
        let incoming = self.last().incoming_gradient();
        incoming.copy_from_slice(gradient)?;
        if self.config.clamp_gradient {
            incoming.clamp();
        }

        let learning_rate = self.config.learning_rate;
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            log::trace!("backward: layer {}", i);
            layer.backward(learning_rate)?;
        }

        Ok(())
    }

    /// Returns a view of the output of the last layer.
    pub fn output(&self) -> Vector {
        self.last().output()
    }

    /// Returns the layers of the model.
    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    /// Returns the training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    fn last(&self) -> &dyn Layer {
        // a model always has at least one layer
        self.layers[self.layers.len() - 1].as_ref()
    }
}
