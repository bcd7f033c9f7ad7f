//! Fixed-shape tensors, whose values may be shared between views.
//!
//! A `Vector`, `Matrix`, or `Stack` is a window into a reference-counted buffer. Cloning a tensor, or
//! reshaping it, creates another view of the same values rather than a copy, so writes through one view
//! are visible through every other view of the buffer. Use `duplicate` for a private copy.
//!
//! # Examples
//!
//! ```
//! # #[macro_use]
//! # extern crate synapse;
//! use synapse::tensor::*;
//!
//! # fn main() {
//! let v = vector![1.0, 2.0, 3.0, 4.0];
//! let m = v.to_matrix(2, 2).unwrap();
//!
//! m.set(1, 0, 5.0).unwrap();
//! assert_eq!(v.get(2).unwrap(), 5.0);
//! # }
//! ```

/// Creates a `Vector` from a list of values.
///
/// ```
/// # #[macro_use]
/// # extern crate synapse;
/// # fn main() {
/// let v = vector![1.0, 2.0, 3.0];
/// assert_eq!(v.get(1).unwrap(), 2.0);
/// # }
/// ```
#[macro_export]
macro_rules! vector {
    ( $( $x:expr ),* $(,)? ) => {
        $crate::tensor::Vector::from(vec![ $( $x ),* ])
    };
}

mod arithmetic;
mod image;
mod linalg;

pub use self::image::{correlate, max_pool};

pub(crate) use self::image::{correlation_dimensions, normalizer};

use crate::error::{Error, Result};
use crate::numbers::*;

use approx::{AbsDiffEq, RelativeEq};
use rand::Rng;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Fill values within this distance of zero are treated as a request for zeros.
const FILL_TOLERANCE: Float = 1e-4;

/// A window of `length` values, starting at `offset` in a shared buffer.
#[derive(Clone)]
struct Storage {
    values: Rc<RefCell<Vec<Float>>>,
    offset: usize,
    length: usize,
}

impl Storage {
    fn new(values: Vec<Float>) -> Storage {
        let length = values.len();
        Storage {
            values: Rc::new(RefCell::new(values)),
            offset: 0,
            length,
        }
    }

    /// A narrower window into the same buffer, relative to this window.
    fn window(&self, offset: usize, length: usize) -> Storage {
        Storage {
            values: Rc::clone(&self.values),
            offset: self.offset + offset,
            length,
        }
    }

    fn read(&self) -> Ref<'_, [Float]> {
        let (start, end) = (self.offset, self.offset + self.length);
        Ref::map(self.values.borrow(), |v| &v[start..end])
    }

    fn write(&self) -> RefMut<'_, [Float]> {
        let (start, end) = (self.offset, self.offset + self.length);
        RefMut::map(self.values.borrow_mut(), |v| &mut v[start..end])
    }

    /// Overwrites the window. The caller guarantees `values` has the window's length, and that no
    /// borrow of the buffer is alive.
    fn assign(&self, values: &[Float]) {
        self.write().copy_from_slice(values);
    }

    fn duplicate(&self) -> Storage {
        Storage::new(self.read().to_vec())
    }

    fn overlaps(&self, other: &Storage) -> bool {
        Rc::ptr_eq(&self.values, &other.values)
            && self.offset < other.offset + other.length
            && other.offset < self.offset + self.length
    }
}

/// Uniformly samples `length` values in `[-bound, bound]`.
fn uniform<R: Rng>(length: usize, bound: Float, rng: &mut R) -> Vec<Float> {
    (0..length).map(|_| rng.gen_range(-bound..=bound)).collect()
}

/// Fills with zeros, or with uniform values in `[-bound, bound]` when `cell` is non-zero.
fn fill_or_random(length: usize, cell: Float, bound: Float) -> Vec<Float> {
    if cell.abs() <= FILL_TOLERANCE {
        vec![0.0; length]
    } else {
        uniform(length, bound, &mut rand::thread_rng())
    }
}

fn check_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch { expected, actual });
    }

    Ok(())
}

/// A one-dimensional sequence of values.
#[derive(Clone)]
pub struct Vector {
    storage: Storage,
}

/// A row-major two-dimensional buffer of `rows * cols` values.
#[derive(Clone)]
pub struct Matrix {
    storage: Storage,
    rows: usize,
    cols: usize,
}

/// A stack of `channels` row-major matrices, each of `height * width` values.
#[derive(Clone)]
pub struct Stack {
    storage: Storage,
    channels: usize,
    height: usize,
    width: usize,
}

impl From<Vec<Float>> for Vector {
    fn from(values: Vec<Float>) -> Self {
        Vector {
            storage: Storage::new(values),
        }
    }
}

impl Vector {
    /// Creates a vector of zeros.
    pub fn zeros(length: usize) -> Vector {
        Vector::new(length, 0.0)
    }

    /// Creates a vector with every value set to `cell`.
    pub fn new(length: usize, cell: Float) -> Vector {
        Vector::from(vec![cell; length])
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.storage.length
    }

    /// Returns whether the vector has no values.
    pub fn is_empty(&self) -> bool {
        self.storage.length == 0
    }

    /// Returns the dimensions of the vector.
    pub fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    /// Borrows the values. The borrow must be released before writing through any view of the buffer.
    pub fn values(&self) -> Ref<'_, [Float]> {
        self.storage.read()
    }

    /// Copies the values out of the buffer.
    pub fn to_vec(&self) -> Vec<Float> {
        self.values().to_vec()
    }

    /// Returns the value at `index`.
    pub fn get(&self, index: usize) -> Result<Float> {
        self.values()
            .get(index)
            .copied()
            .ok_or_else(|| Error::IndexOutOfBounds {
                index: vec![index],
                shape: self.shape(),
            })
    }

    /// Sets the value at `index`.
    pub fn set(&self, index: usize, cell: Float) -> Result<()> {
        match self.storage.write().get_mut(index) {
            Some(x) => {
                *x = cell;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                index: vec![index],
                shape: self.shape(),
            }),
        }
    }

    /// Overwrites every value with the contents of `values`, which must be of the same length.
    pub fn copy_from_slice(&self, values: &[Float]) -> Result<()> {
        check_length(self.len(), values.len())?;
        self.storage.assign(values);
        Ok(())
    }

    /// Sets every value to `cell`.
    pub fn fill(&self, cell: Float) {
        self.storage.write().iter_mut().for_each(|x| *x = cell);
    }

    /// Copies the values into a new buffer, which is not shared with this vector.
    pub fn duplicate(&self) -> Vector {
        Vector {
            storage: self.storage.duplicate(),
        }
    }

    /// Returns whether any value is shared between the two views.
    pub fn shares_values_with(&self, other: &Vector) -> bool {
        self.storage.overlaps(&other.storage)
    }

    /// Views the vector as a `rows` by `cols` matrix, without copying.
    pub fn to_matrix(&self, rows: usize, cols: usize) -> Result<Matrix> {
        check_length(rows * cols, self.len())?;
        Ok(Matrix {
            storage: self.storage.clone(),
            rows,
            cols,
        })
    }

    /// Views the vector as a stack of `channels` matrices, without copying.
    pub fn to_stack(&self, channels: usize, height: usize, width: usize) -> Result<Stack> {
        check_length(channels * height * width, self.len())?;
        Ok(Stack {
            storage: self.storage.clone(),
            channels,
            height,
            width,
        })
    }
}

impl Matrix {
    /// Creates a matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            storage: Storage::new(vec![0.0; rows * cols]),
            rows,
            cols,
        }
    }

    /// Creates a matrix of zeros if `cell` is zero, and otherwise initializes it as `xavier` does.
    pub fn new(rows: usize, cols: usize, cell: Float) -> Matrix {
        let bound = (6.0 / (rows + cols) as Float).sqrt();
        Matrix {
            storage: Storage::new(fill_or_random(rows * cols, cell, bound)),
            rows,
            cols,
        }
    }

    /// Creates a matrix with values sampled uniformly in `[-sqrt(6 / (rows + cols)), sqrt(6 / (rows + cols))]`.
    pub fn xavier(rows: usize, cols: usize) -> Matrix {
        Matrix::xavier_with(rows, cols, &mut rand::thread_rng())
    }

    /// Creates a Xavier-initialized matrix, drawing from the given random number generator.
    pub fn xavier_with<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let bound = (6.0 / (rows + cols) as Float).sqrt();
        Matrix {
            storage: Storage::new(uniform(rows * cols, bound, rng)),
            rows,
            cols,
        }
    }

    /// Creates the `size` by `size` identity matrix.
    pub fn identity(size: usize) -> Matrix {
        let matrix = Matrix::zeros(size, size);
        matrix
            .storage
            .write()
            .iter_mut()
            .step_by(size + 1)
            .for_each(|x| *x = 1.0);
        matrix
    }

    /// Creates a matrix from row-major values.
    pub fn from_values(rows: usize, cols: usize, values: Vec<Float>) -> Result<Matrix> {
        check_length(rows * cols, values.len())?;
        Ok(Matrix {
            storage: Storage::new(values),
            rows,
            cols,
        })
    }

    /// Creates a matrix from its rows, which must all be of the same length.
    pub fn from_rows(rows: Vec<Vec<Float>>) -> Result<Matrix> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(row) = rows.iter().find(|r| r.len() != cols) {
            return Err(Error::ShapeMismatch {
                expected: cols,
                actual: row.len(),
            });
        }

        let row_count = rows.len();
        Matrix::from_values(row_count, cols, rows.into_iter().flatten().collect())
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the dimensions of the matrix.
    pub fn shape(&self) -> Vec<usize> {
        vec![self.rows, self.cols]
    }

    /// Borrows the row-major values.
    pub fn values(&self) -> Ref<'_, [Float]> {
        self.storage.read()
    }

    /// Copies the row-major values out of the buffer.
    pub fn to_vec(&self) -> Vec<Float> {
        self.values().to_vec()
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                index: vec![row, col],
                shape: self.shape(),
            });
        }

        Ok(row * self.cols + col)
    }

    /// Returns the value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<Float> {
        let index = self.index(row, col)?;
        Ok(self.values()[index])
    }

    /// Sets the value at `(row, col)`.
    pub fn set(&self, row: usize, col: usize, cell: Float) -> Result<()> {
        let index = self.index(row, col)?;
        self.storage.write()[index] = cell;
        Ok(())
    }

    /// Sets every value to `cell`.
    pub fn fill(&self, cell: Float) {
        self.storage.write().iter_mut().for_each(|x| *x = cell);
    }

    /// Copies the values into a new buffer, which is not shared with this matrix.
    pub fn duplicate(&self) -> Matrix {
        Matrix {
            storage: self.storage.duplicate(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Views the matrix with different dimensions, without copying.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<Matrix> {
        self.to_vector().to_matrix(rows, cols)
    }

    /// Views the row-major values as a vector, without copying.
    pub fn to_vector(&self) -> Vector {
        Vector {
            storage: self.storage.clone(),
        }
    }
}

impl Stack {
    /// Creates a stack of zeros.
    pub fn zeros(channels: usize, height: usize, width: usize) -> Stack {
        Stack::new(channels, height, width, 0.0)
    }

    /// Creates a stack of zeros if `cell` is zero, and otherwise samples values uniformly in
    /// `[-sqrt(6 / n), sqrt(6 / n)]`, for `n` total values.
    pub fn new(channels: usize, height: usize, width: usize, cell: Float) -> Stack {
        let length = channels * height * width;
        let bound = (6.0 / length as Float).sqrt();
        Stack {
            storage: Storage::new(fill_or_random(length, cell, bound)),
            channels,
            height,
            width,
        }
    }

    /// Creates a stack from channel-major, then row-major values.
    pub fn from_values(
        channels: usize,
        height: usize,
        width: usize,
        values: Vec<Float>,
    ) -> Result<Stack> {
        Vector::from(values).to_stack(channels, height, width)
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the rows of each channel.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the columns of each channel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the dimensions of the stack.
    pub fn shape(&self) -> Vec<usize> {
        vec![self.channels, self.height, self.width]
    }

    /// Borrows the values.
    pub fn values(&self) -> Ref<'_, [Float]> {
        self.storage.read()
    }

    /// Copies the values out of the buffer.
    pub fn to_vec(&self) -> Vec<Float> {
        self.values().to_vec()
    }

    fn index(&self, channel: usize, row: usize, col: usize) -> Result<usize> {
        if channel >= self.channels || row >= self.height || col >= self.width {
            return Err(Error::IndexOutOfBounds {
                index: vec![channel, row, col],
                shape: self.shape(),
            });
        }

        Ok((channel * self.height + row) * self.width + col)
    }

    /// Returns the value at `(channel, row, col)`.
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Result<Float> {
        let index = self.index(channel, row, col)?;
        Ok(self.values()[index])
    }

    /// Sets the value at `(channel, row, col)`.
    pub fn set(&self, channel: usize, row: usize, col: usize, cell: Float) -> Result<()> {
        let index = self.index(channel, row, col)?;
        self.storage.write()[index] = cell;
        Ok(())
    }

    /// Sets every value to `cell`.
    pub fn fill(&self, cell: Float) {
        self.storage.write().iter_mut().for_each(|x| *x = cell);
    }

    /// Copies the values into a new buffer, which is not shared with this stack.
    pub fn duplicate(&self) -> Stack {
        Stack {
            storage: self.storage.duplicate(),
            channels: self.channels,
            height: self.height,
            width: self.width,
        }
    }

    /// Views a single channel as a matrix, without copying.
    pub fn channel(&self, channel: usize) -> Result<Matrix> {
        if channel >= self.channels {
            return Err(Error::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }

        let length = self.height * self.width;
        Ok(Matrix {
            storage: self.storage.window(channel * length, length),
            rows: self.height,
            cols: self.width,
        })
    }

    /// Views every channel, flattened in order, as a vector without copying.
    pub fn to_vector(&self) -> Vector {
        Vector {
            storage: self.storage.clone(),
        }
    }
}

/// Writes `values` as a space-separated row, with three decimal places.
fn write_row(f: &mut fmt::Formatter<'_>, values: &[Float]) -> fmt::Result {
    for (i, x) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{:.3}", x)?;
    }

    Ok(())
}

fn write_matrix(f: &mut fmt::Formatter<'_>, values: &[Float], cols: usize) -> fmt::Result {
    for row in values.chunks(cols.max(1)) {
        write!(f, "    [")?;
        write_row(f, row)?;
        writeln!(f, "],")?;
    }

    Ok(())
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ {}", self.len())?;
        write!(f, "    ")?;
        write_row(f, &self.values())?;
        write!(f, "\n]")
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ {} x {}", self.rows, self.cols)?;
        write_matrix(f, &self.values(), self.cols)?;
        write!(f, "]")
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ {} x {} x {}", self.channels, self.height, self.width)?;
        let values = self.values();
        for (i, channel) in values.chunks((self.height * self.width).max(1)).enumerate() {
            writeln!(f, "  channel {}:", i)?;
            write_matrix(f, channel, self.width)?;
        }
        write!(f, "]")
    }
}

/// Implements debug formatting, and exact, and approximate equality by shape and values.
macro_rules! impl_comparisons {
    ( $( $tensor:ident ),* ) => {
        $(
            impl fmt::Debug for $tensor {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_struct(stringify!($tensor))
                        .field("shape", &self.shape())
                        .field("values", &&*self.values())
                        .finish()
                }
            }

            impl PartialEq for $tensor {
                fn eq(&self, other: &$tensor) -> bool {
                    self.shape() == other.shape() && *self.values() == *other.values()
                }
            }

            impl AbsDiffEq for $tensor {
                type Epsilon = <Float as AbsDiffEq>::Epsilon;

                fn default_epsilon() -> Self::Epsilon {
                    Float::default_epsilon()
                }

                fn abs_diff_eq(&self, other: &$tensor, epsilon: Self::Epsilon) -> bool {
                    self.shape() == other.shape()
                        && self
                            .values()
                            .iter()
                            .zip(other.values().iter())
                            .all(|(x, y)| Float::abs_diff_eq(x, y, epsilon))
                }
            }

            impl RelativeEq for $tensor {
                fn default_max_relative() -> Self::Epsilon {
                    Float::default_max_relative()
                }

                fn relative_eq(
                    &self,
                    other: &$tensor,
                    epsilon: Self::Epsilon,
                    max_relative: Self::Epsilon,
                ) -> bool {
                    self.shape() == other.shape()
                        && self
                            .values()
                            .iter()
                            .zip(other.values().iter())
                            .all(|(x, y)| Float::relative_eq(x, y, epsilon, max_relative))
                }
            }
        )*
    };
}

impl_comparisons!(Vector, Matrix, Stack);
