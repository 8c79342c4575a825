//! # Dense kernels
//!
//! Data-parallel dense matrix and vector kernels sharing the launch convention of the
//! sparse solvers: every kernel takes the `Launcher` and runs inside its pool. Unlike the
//! triangular solves there is no dependency between output elements, so each logical
//! line of the output is handled by its own lane.
//!
//! - `matrix`: `DenseMatrix` (row/column-major, padded, strided views) and `DenseVector`
//! - `scaled_add`: `am`, `ambm`, `ambm_m`, `av` with `ScalarArg` (reciprocal / flip-sign)
//! - `assign`: constant and diagonal fills, diagonal/row/column extraction
//! - `element_ops`: element-wise binary and unary operations
//! - `prod`: matrix-vector and matrix-matrix products, scaled rank-1 update
pub mod assign;
pub mod element_ops;
pub mod matrix;
pub mod prod;
pub mod scaled_add;

pub use matrix::{DenseMatrix, DenseVector, Layout};
pub use scaled_add::ScalarArg;
