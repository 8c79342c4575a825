//! # Row-oriented triangular substitution
//!
//! Forward (lower triangular) and backward (upper triangular) substitution on CSR,
//! one block per solve. Each window runs two phases:
//! 1. lane phase: every lane stages one nonzero (column, coefficient, x[column]);
//! 2. coordinator phase: lane 0 walks the staged window in solve order, subtracting
//!    contributions from the current row's accumulator and committing every row whose
//!    last entry has been passed.
//!
//! The `unit` variants assume an implicit unit diagonal. The others divide by the
//! separate `diagonal_entries` array. Diagonal entries stored inside the CSR body are
//! never read as diagonals (they fail the strictly-below / strictly-above test).
use crate::backend::launch::ThreadBlock;
use crate::backend::scalar::Real;
use crate::sparse::frontier::{Direction, RowCursor};
use crate::sparse::window::EntryWindow;
use log::trace;

/// Forward substitution `Lx = b` with unit diagonal. `vector` holds `b` on entry, `x` on exit.
pub fn csr_unit_lu_forward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    vector: &mut [T],
    size: usize,
) {
    forward(block, row_offsets, column_indices, elements, None, vector, size);
}

/// Forward substitution `Lx = b`, dividing row `i` by `diagonal_entries[i]`.
pub fn csr_lu_forward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal_entries: &[T],
    vector: &mut [T],
    size: usize,
) {
    forward(
        block,
        row_offsets,
        column_indices,
        elements,
        Some(diagonal_entries),
        vector,
        size,
    );
}

/// Backward substitution `Ux = b` with unit diagonal.
pub fn csr_unit_lu_backward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    vector: &mut [T],
    size: usize,
) {
    backward(block, row_offsets, column_indices, elements, None, vector, size);
}

/// Backward substitution `Ux = b`, dividing row `i` by `diagonal_entries[i]`.
pub fn csr_lu_backward<T: Real>(
    block: &ThreadBlock,
    row_offsets: &[usize],
    column_indices: &[usize],
    elements: &[T],
    diagonal_entries: &[T],
    vector: &mut [T],
    size: usize,
) {
    backward(
        block,
        row_offsets,
        column_indices,
        elements,
        Some(diagonal_entries),
        vector,
        size,
    );
}

fn forward<T: Real>(
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
    // one position past nnz is always visited so the last rows get committed
    let loop_end = (nnz / block_dim + 1) * block_dim;

    let mut window = EntryWindow::new(block_dim);
    let mut cursor = RowCursor::new(Direction::Forward, vector, size);

    for window_start in (0..loop_end).step_by(block_dim) {
        cursor.mark_window();
        window.load(block, column_indices, elements, vector, window_start, nnz);
        trace!(
            "forward window at {}: frontier row {}",
            window_start,
            cursor.row_at_window_start()
        );

        for lane in 0..block_dim {
            let entry = window_start + lane;
            // commit every row ending here; empty rows end where they start
            while !cursor.is_finished() && entry == row_offsets[cursor.current_row() + 1] {
                cursor.finalize(vector, diagonal);
            }
            if cursor.is_finished() {
                break;
            }
            if entry >= nnz {
                continue;
            }
            let staged = window.get(lane);
            if cursor.contributes(staged.column) {
                let x = if cursor.staged_is_final(staged.column) {
                    staged.x
                } else {
                    vector[staged.column]
                };
                cursor.subtract(staged.element * x);
            }
        }
        if cursor.is_finished() {
            break;
        }
    }
}

fn backward<T: Real>(
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

    let mut cursor = RowCursor::new(Direction::Backward, vector, size);
    // trailing rows without entries are never reached by a window boundary
    while !cursor.is_finished() && row_offsets[cursor.current_row()] == nnz {
        cursor.finalize(vector, diagonal);
    }
    if cursor.is_finished() {
        return;
    }

    let mut window = EntryWindow::new(block_dim);
    let last_window = ((nnz - 1) / block_dim) * block_dim;

    for window_start in (0..=last_window).rev().step_by(block_dim) {
        cursor.mark_window();
        window.load(block, column_indices, elements, vector, window_start, nnz);
        trace!(
            "backward window at {}: frontier row {}",
            window_start,
            cursor.row_at_window_start()
        );

        for lane in (0..block_dim).rev() {
            let entry = window_start + lane;
            if entry >= nnz {
                continue;
            }
            let staged = window.get(lane);
            if cursor.contributes(staged.column) {
                let x = if cursor.staged_is_final(staged.column) {
                    staged.x
                } else {
                    vector[staged.column]
                };
                cursor.subtract(staged.element * x);
            }
            // this was the first entry of the row (and of any empty rows just below it)
            while !cursor.is_finished() && entry == row_offsets[cursor.current_row()] {
                cursor.finalize(vector, diagonal);
            }
            if cursor.is_finished() {
                break;
            }
        }
        if cursor.is_finished() {
            break;
        }
    }
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
    fn test_unit_forward_3x3() {
        let launcher = launcher();
        let block = launcher.block(128).unwrap();
        let row_offsets = [0, 1, 3, 6];
        let cols = [0, 0, 1, 0, 1, 2];
        let elems = [1.0, 2.0, 1.0, 3.0, 4.0, 1.0];
        let mut x = vec![1.0, 4.0, 11.0];
        launcher.launch("csr_unit_lu_forward", || {
            csr_unit_lu_forward(&block, &row_offsets, &cols, &elems, &mut x, 3)
        });
        assert_eq!(x, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_nonunit_forward_uses_separate_diagonal() {
        let launcher = launcher();
        let block = launcher.block(4).unwrap();
        // body diagonal is garbage and must be ignored
        let row_offsets = [0, 1, 3];
        let cols = [0, 0, 1];
        let elems = [100.0, 1.0, 100.0];
        let diag = [2.0, 4.0];
        let mut x = vec![2.0, 9.0];
        csr_lu_forward(&block, &row_offsets, &cols, &elems, &diag, &mut x, 2);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 2.0);
    }

    #[test]
    fn test_backward_with_empty_rows() {
        let launcher = launcher();
        let block = launcher.block(2).unwrap();
        // U = [[1, 1, 0, 1], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]], rows 1..3 store nothing
        let row_offsets = [0, 2, 2, 2, 2];
        let cols = [1, 3];
        let elems = [1.0, 1.0];
        let mut x = vec![6.0, 2.0, 3.0, 1.0];
        csr_unit_lu_backward(&block, &row_offsets, &cols, &elems, &mut x, 4);
        assert_eq!(x, vec![3.0, 2.0, 3.0, 1.0]);

        let diag = [1.0, 2.0, 3.0, 1.0];
        let mut x = vec![6.0, 4.0, 9.0, 1.0];
        csr_lu_backward(&block, &row_offsets, &cols, &elems, &diag, &mut x, 4);
        assert_eq!(x, vec![3.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_matrix_is_identity() {
        let launcher = launcher();
        let block = launcher.block(8).unwrap();
        let row_offsets = [0, 0, 0, 0];
        let mut x = vec![1.0, 2.0, 3.0];
        csr_unit_lu_forward::<f64>(&block, &row_offsets, &[], &[], &mut x, 3);
        csr_unit_lu_backward::<f64>(&block, &row_offsets, &[], &[], &mut x, 3);
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
        let mut none: Vec<f64> = Vec::new();
        csr_unit_lu_forward::<f64>(&block, &[0], &[], &[], &mut none, 0);
        csr_lu_backward::<f64>(&block, &[0], &[], &[], &[], &mut none, 0);
        assert!(none.is_empty());
    }
}
