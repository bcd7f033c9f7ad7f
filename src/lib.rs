#![warn(missing_docs)]

//! Single-sample neural network layers, trained by gradient descent over tensor views which share their
//! values.
//!
//! Layers own their buffers, and are chained by aliasing the output of one layer as the input of the
//! next, so no values are copied between layers.
//!
//! # Examples
//!
//! ```
//! # #[macro_use]
//! # extern crate synapse;
//! use synapse::activation::Identity;
//! use synapse::cost;
//! use synapse::layer::{Dense, Layer};
//!
//! # fn main() -> synapse::error::Result<()> {
//! let mut dense = Dense::new(1, 1, Identity)?;
//!
//! for i in 0..2000 {
//!     let x = (i % 11) as synapse::numbers::Float / 2.0 - 2.5;
//!     let target = 3.0 * x + 1.0;
//!
//!     dense.input().set(0, x)?;
//!     dense.forward()?;
//!
//!     let output = dense.output().get(0)?;
//!     dense
//!         .incoming_gradient()
//!         .set(0, cost::mse_derivative(target, output))?;
//!     dense.backward(0.01)?;
//! }
//!
//! assert!((dense.weights().get(0, 0)? - 3.0).abs() < 1e-3);
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod numbers;
pub mod error;
#[macro_use]
pub mod tensor;
pub mod activation;
pub mod config;
pub mod cost;
pub mod layer;
pub mod model;
