//! Training configuration.

use crate::numbers::*;

/// Configuration for the backward pass of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Learning rate of each gradient descent step.
    pub learning_rate: Float,
    /// Whether to clamp the gradient handed to the output layer, replacing `NaN` with zero, and saturating
    /// large values.
    pub clamp_gradient: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            clamp_gradient: false,
        }
    }
}

impl TrainingConfig {
    /// Creates a new TrainingConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, learning_rate: Float) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets whether to clamp the output gradient.
    pub fn clamp_gradient(mut self, clamp_gradient: bool) -> Self {
        self.clamp_gradient = clamp_gradient;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_relative_eq!(config.learning_rate, 0.01);
        assert!(!config.clamp_gradient);
    }

    #[test]
    fn test_builder() {
        let config = TrainingConfig::new()
            .learning_rate(0.05)
            .clamp_gradient(true);

        assert_relative_eq!(config.learning_rate, 0.05);
        assert!(config.clamp_gradient);
    }
}
