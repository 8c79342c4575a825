//! # Sparse triangular solve engine
//!
//! ## Aim and General Description
//! Forward and backward substitution on a compressed-row (CSR) matrix, executed by a
//! single thread block. Triangular substitution is a sequential recurrence: row i
//! needs every earlier (forward) or later (backward) row first. The kernels keep that
//! recurrence on one coordinating lane and use the remaining lanes to prefetch whole
//! windows of nonzeros into shared staging buffers, one barrier-separated round at a time.
//!
//! ## Main Components
//! - `compressed_matrix`: CSR storage (`CompressedMatrix`) and the borrowed view the kernels read (`CsrView`)
//! - `frontier`: the solved frontier (`RowCursor` for row-oriented traversal, `SettledRows` for the transposed one)
//! - `window`: staging buffers (`EntryWindow`, `ScatterWindow`) and the row-offset lookahead (`RowLookahead`)
//! - `solve`: non-transposed kernels `csr_unit_lu_forward`, `csr_lu_forward`, `csr_unit_lu_backward`, `csr_lu_backward`
//! - `solve_trans`: transposed kernels, the same four variants on Aᵗ without materializing it
//! - `inplace_solve`: picks the kernel for a `TriangularTag` and launches it
//!
//! ## Non-obvious Features and Tips
//! - the kernels never validate their input: a non-triangular matrix or a zero diagonal gives
//!   wrong numbers or NaN/Inf, never a hang. Enable `validate_triangular` in the config to have
//!   `inplace_solve` check the structure before launch
//! - diagonal entries stored inside the CSR body are ignored by all variants; non-unit variants
//!   divide by the separate diagonal array
#![allow(non_snake_case)]
pub mod compressed_matrix;
pub mod frontier;
pub mod inplace_solve;
pub mod solve;
pub mod solve_trans;
pub mod window;


pub use compressed_matrix::{CompressedMatrix, CsrView};
pub use inplace_solve::{TriangularTag, inplace_solve, inplace_solve_trans};
