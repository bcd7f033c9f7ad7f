//! Errors raised by tensor operations, and the layers built on them.

use thiserror::Error;

/// Errors which can occur when shaping, indexing, or combining tensors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A buffer did not hold the expected number of values.
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// The number of values required.
        expected: usize,
        /// The number of values supplied.
        actual: usize,
    },

    /// The operands of an operation had incompatible dimensions.
    #[error("{operation}: dimensions {left:?}, and {right:?} are incompatible")]
    DimensionMismatch {
        /// The operation which was attempted.
        operation: &'static str,
        /// The dimensions of the left operand.
        left: Vec<usize>,
        /// The dimensions of the right operand, or of the destination.
        right: Vec<usize>,
    },

    /// An index was outside of the dimensions of a tensor.
    #[error("index {index:?} is not compatible with the dimensions {shape:?}")]
    IndexOutOfBounds {
        /// The supplied indices.
        index: Vec<usize>,
        /// The dimensions of the tensor.
        shape: Vec<usize>,
    },

    /// A channel was requested beyond the channels of a stack.
    #[error("channel {channel} is out of range for a stack of {channels} channels")]
    ChannelOutOfRange {
        /// The requested channel.
        channel: usize,
        /// The number of channels in the stack.
        channels: usize,
    },

    /// A tensor, or layer was requested with a zero dimension.
    #[error("dimensions must all be at least one")]
    EmptyShape,

    /// A kernel which does not fit within the image.
    #[error("kernel of size {size} does not fit a {rows} x {cols} image")]
    InvalidKernel {
        /// The side length of the square kernel.
        size: usize,
        /// The rows of the image.
        rows: usize,
        /// The columns of the image.
        cols: usize,
    },

    /// A pooling window which does not evenly divide the image.
    #[error("pooling window of size {size} does not divide a {rows} x {cols} image")]
    InvalidPool {
        /// The side length of the square window.
        size: usize,
        /// The rows of the image.
        rows: usize,
        /// The columns of the image.
        cols: usize,
    },

    /// A model was constructed without layers.
    #[error("a model requires at least one layer")]
    EmptyModel,
}

/// The result type of fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
