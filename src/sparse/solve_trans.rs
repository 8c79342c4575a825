//! # Transposed triangular substitution
//!
//! Solves `Aᵗx = b` reading the CSR arrays of `A` as if they were stored by column,
//! without materializing the transpose. The solve becomes column-oriented: once
//! `x[r]` is settled, storage row `r` is scattered into the rows still ahead of the frontier.
//! - `forward`: `A` stores an upper triangle, rows are settled in increasing order and
//!   scatter into columns `c > r`
//! - `backward`: `A` stores a lower triangle, rows in decreasing order, columns `c < r`
//!
//! Each window of nonzeros runs these rounds, separated by block barriers:
//! 1. load: every lane stages its (column, coefficient) and one slot of the
//!    `row_offsets` lookahead table
//! 2. row recovery: every lane maps its nonzero position back to its storage row
//!    (table scan, binary search when the table is exhausted)
//! 3. per row of the window, in solve order: the coordinator settles the row, the
//!    row's lanes stage `coefficient * x[row]`, the coordinator commits the terms
//!
//! Only the coordinator writes the solution vector, so repeated columns within a row
//! need no atomics.
use crate::backend::launch::ThreadBlock;
use crate::backend::scalar::Real;
use crate::sparse::frontier::{Direction, SettledRows};
use crate::sparse::window::{RowLookahead, ScatterWindow};
use log::trace;

/// Solve `Aᵗx = b` with `A` upper triangular, unit diagonal.
pub fn csr_trans_unit_lu_forward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    vector: &mut [T],
    size: usize,
) {
    trans_forward(block, row_offsets, column_indices, elements, None, vector, size);
}

/// Solve `Aᵗx = b` with `A` upper triangular and diagonal `diagonal_entries`.
pub fn csr_trans_lu_forward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal_entries: &[T],
    vector: &mut [T],
    size: usize,
) {
    trans_forward(
        block,
        row_offsets,
        column_indices,
        elements,
        Some(diagonal_entries),
        vector,
        size,
    );
}

/// Solve `Aᵗx = b` with `A` lower triangular, unit diagonal.
pub fn csr_trans_unit_lu_backward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    vector: &mut [T],
    size: usize,
) {
    trans_backward(block, row_offsets, column_indices, elements, None, vector, size);
}

/// Solve `Aᵗx = b` with `A` lower triangular and diagonal `diagonal_entries`.
pub fn csr_trans_lu_backward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal_entries: &[T],
    vector: &mut [T],
    size: usize,
) {
    trans_backward(
        block,
        row_offsets,
        column_indices,
        elements,
        Some(diagonal_entries),
        vector,
        size,
    );
}

fn trans_forward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal: Option<&[T]>,
    vector: &mut [T],
    size: usize,
) {
    if size == 0 {
        return;
    }
    let block_dim = block.block_dim();
    let nnz = row_offsets[size];
    let direction = Direction::Forward;

    let mut settled = SettledRows::new(direction, size);
    let mut window = ScatterWindow::new(block_dim);
    let mut lookahead = RowLookahead::new(block_dim);
    // row owning the last entry of the previous window
    let mut first_row = 0;

    for window_start in (0..nnz).step_by(block_dim) {
        window.load(block, column_indices, elements, window_start, nnz);
        lookahead.load(block, row_offsets, first_row, size);
        window.recover_rows(block, &lookahead, row_offsets, window_start, size, direction);

        let Some((low, high)) = window.row_span() else {
            continue;
        };
        trace!("transposed forward window at {}: rows {}..={}", window_start, low, high);
        for row in low..=high {
            settled.settle_through(row, vector, diagonal);
            let band = window.band(row);
            if band.is_empty() {
                continue;
            }
            window.stage_deltas(block, band.clone(), vector[row], direction);
            window.commit(band, vector, direction);
        }
        first_row = high;
    }
    settled.settle_all(vector, diagonal);
}

fn trans_backward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal: Option<&[T]>,
    vector: &mut [T],
    size: usize,
) {
    if size == 0 {
        return;
    }
    let block_dim = block.block_dim();
    let nnz = row_offsets[size];
    let direction = Direction::Backward;

    let mut settled = SettledRows::new(direction, size);
    if nnz == 0 {
        settled.settle_all(vector, diagonal);
        return;
    }
    let mut window = ScatterWindow::new(block_dim);
    let mut lookahead = RowLookahead::new(block_dim);
    // row owning the first entry of the previous window; later windows lie at or below it
    let mut row_at_window_start = size - 1;
    let last_window = ((nnz - 1) / block_dim) * block_dim;

    for window_start in (0..=last_window).rev().step_by(block_dim) {
        window.load(block, column_indices, elements, window_start, nnz);
        let first_row = (row_at_window_start + 1).saturating_sub(block_dim);
        lookahead.load(block, row_offsets, first_row, row_at_window_start);
        window.recover_rows(block, &lookahead, row_offsets, window_start, size, direction);

        let Some((low, high)) = window.row_span() else {
            continue;
        };
        trace!("transposed backward window at {}: rows {}..={}", window_start, high, low);
        for row in (low..=high).rev() {
            settled.settle_through(row, vector, diagonal);
            let band = window.band(row);
            if band.is_empty() {
                continue;
            }
            window.stage_deltas(block, band.clone(), vector[row], direction);
            window.commit(band, vector, direction);
        }
        row_at_window_start = low;
    }
    settled.settle_all(vector, diagonal);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{KernelConfig, Launcher};
    use approx::assert_relative_eq;

    fn launcher() -> Launcher {
        Launcher::new(KernelConfig::default().with_threads(2)).unwrap()
    }

    #[test]
    fn test_trans_forward_of_upper() {
        let launcher = launcher();
        let block = launcher.block(256).unwrap();
        // A = [[1,2,3],[0,1,4],[0,0,1]], Aᵗ = [[1,0,0],[2,1,0],[3,4,1]]
        let row_offsets = [0, 3, 5, 6];
        let cols = [0, 1, 2, 1, 2, 2];
        let elems = [1.0, 2.0, 3.0, 1.0, 4.0, 1.0];
        let mut x = vec![1.0, 4.0, 11.0];
        launcher.launch("csr_trans_unit_lu_forward", || {
            csr_trans_unit_lu_forward(&block, &row_offsets, &cols, &elems, &mut x, 3)
        });
        assert_eq!(x, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_trans_backward_of_lower() {
        let launcher = launcher();
        let block = launcher.block(2).unwrap();
        // L = [[2,0,0],[1,4,0],[1,1,1]]; Lᵗ x = b with x = [1,1,1] gives b = [4,5,1]
        let row_offsets = [0, 1, 3, 6];
        let cols = [0, 0, 1, 0, 1, 2];
        let elems = [2.0, 1.0, 4.0, 1.0, 1.0, 1.0];
        let diag = [2.0, 4.0, 1.0];
        let mut x = vec![4.0, 5.0, 1.0];
        csr_trans_lu_backward(&block, &row_offsets, &cols, &elems, &diag, &mut x, 3);
        for xi in &x {
            assert_relative_eq!(*xi, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_row_straddling_windows_divided_once() {
        let launcher = launcher();
        let block = launcher.block(2).unwrap();
        // A upper: row 0 -> cols 0,1,2,3 (spans two windows of two lanes), diag 2 everywhere
        let row_offsets = [0, 4, 4, 4, 4];
        let cols = [0, 1, 2, 3];
        let elems = [2.0, 1.0, 1.0, 1.0];
        let diag = [2.0, 2.0, 2.0, 2.0];
        // x = [1,1,1,1]: (Aᵗx)_0 = 2, (Aᵗx)_j = 1 + 2 for j > 0
        let mut x = vec![2.0, 3.0, 3.0, 3.0];
        csr_trans_lu_forward(&block, &row_offsets, &cols, &elems, &diag, &mut x, 4);
        assert_eq!(x, vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_trans_without_entries() {
        let launcher = launcher();
        let block = launcher.block(4).unwrap();
        let row_offsets = [0, 0, 0];
        let diag = [2.0, 4.0];
        let mut x = vec![2.0, 2.0];
        csr_trans_lu_forward::<f64>(&block, &row_offsets, &[], &[], &diag, &mut x, 2);
        assert_eq!(x, vec![1.0, 0.5]);
        let mut x = vec![2.0, 2.0];
        csr_trans_lu_backward::<f64>(&block, &row_offsets, &[], &[], &diag, &mut x, 2);
        assert_eq!(x, vec![1.0, 0.5]);
        let mut none: Vec<f64> = Vec::new();
        csr_trans_unit_lu_backward::<f64>(&block, &[0], &[], &[], &mut none, 0);
    }
}
