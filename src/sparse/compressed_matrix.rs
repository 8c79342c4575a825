//! # Compressed-row sparse matrix
//!
//! Square CSR storage as consumed by the triangular solve kernels:
//! - `row_offsets`    n+1 monotone offsets, `row_offsets[n] == nnz`
//! - `column_indices` nnz column indices in `[0, n)`
//! - `elements`       nnz values, position-for-position with `column_indices`
//! - `diagonal_entries` optional, n values kept outside the CSR body
//!
//! The solver only reads the matrix. Construction (from raw arrays, triplets,
//! nalgebra or sprs matrices) checks the structural invariants once so the kernels
//! can index without further checks.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::scalar::Real;
use nalgebra::DMatrix;
use rayon::prelude::*;
use sprs::CsMat;
use strum_macros::Display;

/// Which triangle of the matrix holds the off-diagonal entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Triangle {
    Lower,
    Upper,
}

/// Borrowed CSR arrays, the form in which the kernels receive a matrix.
#[derive(Debug, Clone, Copy)]
pub struct CsrView<'a, T> {
    pub row_offsets: &'a [usize],
    pub column_indices: &'a [usize],
    pub elements: &'a [T],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix<T> {
    size: usize,
    row_offsets: Vec<usize>,
    column_indices: Vec<usize>,
    elements: Vec<T>,
    diagonal_entries: Option<Vec<T>>,
}

impl<T: Real> CompressedMatrix<T> {
    /// Build from raw CSR arrays, checking lengths, monotone offsets and column range.
    pub fn new(
        size: usize,
        row_offsets: Vec<usize>,
        column_indices: Vec<usize>,
        elements: Vec<T>,
    ) -> KernelResult<Self> {
        if row_offsets.len() != size + 1 {
            return Err(KernelError::DimensionMismatch {
                what: "row_offsets",
                expected: size + 1,
                found: row_offsets.len(),
            });
        }
        if row_offsets[0] != 0 {
            return Err(KernelError::MalformedMatrix(format!(
                "row_offsets must start at 0, starts at {}",
                row_offsets[0]
            )));
        }
        if let Some(row) = row_offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(KernelError::MalformedMatrix(format!(
                "row_offsets decrease at row {}",
                row
            )));
        }
        let nnz = row_offsets[size];
        if column_indices.len() != nnz {
            return Err(KernelError::DimensionMismatch {
                what: "column_indices",
                expected: nnz,
                found: column_indices.len(),
            });
        }
        if elements.len() != nnz {
            return Err(KernelError::DimensionMismatch {
                what: "elements",
                expected: nnz,
                found: elements.len(),
            });
        }
        if let Some(&col) = column_indices.iter().find(|&&c| c >= size) {
            return Err(KernelError::MalformedMatrix(format!(
                "column index {} out of range for size {}",
                col, size
            )));
        }
        Ok(CompressedMatrix {
            size,
            row_offsets,
            column_indices,
            elements,
            diagonal_entries: None,
        })
    }

    /// Build from (row, col, value) triplets in any order. Duplicates are summed.
    pub fn from_triplets(size: usize, triplets: &[(usize, usize, T)]) -> KernelResult<Self> {
        let mut sorted: Vec<(usize, usize, T)> = triplets.to_vec();
        if let Some(&(row, col, _)) = sorted.iter().find(|(r, c, _)| *r >= size || *c >= size) {
            return Err(KernelError::MalformedMatrix(format!(
                "triplet ({}, {}) out of range for size {}",
                row, col, size
            )));
        }
        sorted.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_offsets = vec![0usize; size + 1];
        let mut column_indices = Vec::with_capacity(sorted.len());
        let mut elements: Vec<T> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;
        for (row, col, value) in sorted {
            if last == Some((row, col)) {
                if let Some(v) = elements.last_mut() {
                    *v = *v + value;
                }
                continue;
            }
            last = Some((row, col));
            row_offsets[row + 1] += 1;
            column_indices.push(col);
            elements.push(value);
        }
        for row in 0..size {
            row_offsets[row + 1] += row_offsets[row];
        }
        Self::new(size, row_offsets, column_indices, elements)
    }

    /// Nonzero entries of a square dense matrix.
    pub fn from_dense(matrix: &DMatrix<T>) -> KernelResult<Self> {
        let (nrows, ncols) = matrix.shape();
        if nrows != ncols {
            return Err(KernelError::DimensionMismatch {
                what: "square matrix columns",
                expected: nrows,
                found: ncols,
            });
        }
        let mut triplets = Vec::new();
        for i in 0..nrows {
            for j in 0..ncols {
                let v = matrix[(i, j)];
                if v != T::zero() {
                    triplets.push((i, j, v));
                }
            }
        }
        Self::from_triplets(nrows, &triplets)
    }

    /// Convert a square sprs matrix (CSR or CSC storage).
    pub fn from_csmat(matrix: &CsMat<T>) -> KernelResult<Self> {
        if matrix.rows() != matrix.cols() {
            return Err(KernelError::DimensionMismatch {
                what: "square matrix columns",
                expected: matrix.rows(),
                found: matrix.cols(),
            });
        }
        let triplets: Vec<(usize, usize, T)> = matrix
            .iter()
            .map(|(value, (row, col))| (row, col, *value))
            .collect();
        Self::from_triplets(matrix.rows(), &triplets)
    }

    /// Attach a separate diagonal array (used by the non-unit kernel variants).
    pub fn with_diagonal(mut self, diagonal: Vec<T>) -> KernelResult<Self> {
        if diagonal.len() != self.size {
            return Err(KernelError::DimensionMismatch {
                what: "diagonal_entries",
                expected: self.size,
                found: diagonal.len(),
            });
        }
        self.diagonal_entries = Some(diagonal);
        Ok(self)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn nnz(&self) -> usize {
        self.row_offsets[self.size]
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn diagonal(&self) -> Option<&[T]> {
        self.diagonal_entries.as_deref()
    }

    pub fn view(&self) -> CsrView<'_, T> {
        CsrView {
            row_offsets: &self.row_offsets,
            column_indices: &self.column_indices,
            elements: &self.elements,
        }
    }

    /// Diagonal read from the CSR body, zero where a row stores no diagonal entry.
    pub fn extract_diagonal(&self) -> Vec<T> {
        (0..self.size)
            .into_par_iter()
            .map(|row| {
                let range = self.row_offsets[row]..self.row_offsets[row + 1];
                range
                    .filter(|&k| self.column_indices[k] == row)
                    .fold(T::zero(), |acc, k| acc + self.elements[k])
            })
            .collect()
    }

    /// Explicitly materialized transpose. The separate diagonal (if any) carries over.
    pub fn transpose(&self) -> Self {
        let nnz = self.nnz();
        let mut row_offsets = vec![0usize; self.size + 1];
        for &col in &self.column_indices {
            row_offsets[col + 1] += 1;
        }
        for row in 0..self.size {
            row_offsets[row + 1] += row_offsets[row];
        }
        let mut next = row_offsets.clone();
        let mut column_indices = vec![0usize; nnz];
        let mut elements = vec![T::zero(); nnz];
        for row in 0..self.size {
            for k in self.row_offsets[row]..self.row_offsets[row + 1] {
                let col = self.column_indices[k];
                let slot = next[col];
                column_indices[slot] = row;
                elements[slot] = self.elements[k];
                next[col] += 1;
            }
        }
        CompressedMatrix {
            size: self.size,
            row_offsets,
            column_indices,
            elements,
            diagonal_entries: self.diagonal_entries.clone(),
        }
    }

    /// Dense copy of the CSR body (the separate diagonal array is not included).
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut dense = DMatrix::<T>::zeros(self.size, self.size);
        for row in 0..self.size {
            for k in self.row_offsets[row]..self.row_offsets[row + 1] {
                let col = self.column_indices[k];
                dense[(row, col)] = dense[(row, col)] + self.elements[k];
            }
        }
        dense
    }

    /// y = A x over the CSR body, rows in parallel.
    pub fn mul_vec(&self, x: &[T]) -> KernelResult<Vec<T>> {
        if x.len() != self.size {
            return Err(KernelError::DimensionMismatch {
                what: "mul_vec operand",
                expected: self.size,
                found: x.len(),
            });
        }
        Ok((0..self.size)
            .into_par_iter()
            .map(|row| {
                (self.row_offsets[row]..self.row_offsets[row + 1])
                    .fold(T::zero(), |acc, k| acc + self.elements[k] * x[self.column_indices[k]])
            })
            .collect())
    }

    /// Check that all off-diagonal entries lie in `triangle`. With `require_diagonal`
    /// the diagonal used by the non-unit kernels (separate array, else the CSR body)
    /// must be nonzero in every row.
    pub fn check_triangular(&self, triangle: Triangle, require_diagonal: bool) -> KernelResult<()> {
        for row in 0..self.size {
            for k in self.row_offsets[row]..self.row_offsets[row + 1] {
                let col = self.column_indices[k];
                let wrong_side = match triangle {
                    Triangle::Lower => col > row,
                    Triangle::Upper => col < row,
                };
                if wrong_side {
                    return Err(KernelError::NotTriangular { row, col });
                }
            }
        }
        if require_diagonal {
            let extracted;
            let diagonal = match self.diagonal() {
                Some(d) => d,
                None => {
                    extracted = self.extract_diagonal();
                    &extracted
                }
            };
            if let Some(row) = diagonal.iter().position(|d| *d == T::zero()) {
                return Err(KernelError::ZeroDiagonal { row });
            }
        }
        Ok(())
    }
}
