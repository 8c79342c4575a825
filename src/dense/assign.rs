//! Assignment kernels: constant fill, diagonal fill, and copies between a matrix
//! diagonal/row/column and a vector.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::launch::Launcher;
use crate::backend::scalar::Real;
use crate::dense::matrix::{DenseMatrix, DenseVector};

/// Set every element of `mat` to `s`. With `clear` the padding of the buffer is
/// overwritten as well.
pub fn matrix_assign<T: Real>(launcher: &Launcher, mat: &mut DenseMatrix<T>, s: T, clear: bool) {
    launcher.launch("matrix_assign", || {
        if clear {
            mat.par_fill_storage(s);
        } else {
            mat.par_map_inplace(|_, _, _| s);
        }
    });
}

/// Set the main diagonal of `mat` to `s`, leaving the rest untouched.
pub fn matrix_diagonal_assign<T: Real>(launcher: &Launcher, mat: &mut DenseMatrix<T>, s: T) {
    launcher.launch("matrix_diagonal_assign", || {
        mat.par_map_inplace(|i, j, old| if i == j { s } else { old });
    });
}

/// (row, col) of element `i` of diagonal `k` (`k > 0` above the main diagonal).
fn diagonal_position(i: usize, k: isize) -> (usize, usize) {
    if k < 0 {
        (i + k.unsigned_abs(), i)
    } else {
        (i, i + k as usize)
    }
}

fn ensure_diagonal_fits<T: Real>(mat: &DenseMatrix<T>, len: usize, k: isize) -> KernelResult<()> {
    if len == 0 {
        return Ok(());
    }
    let (row, col) = diagonal_position(len - 1, k);
    if row >= mat.size1() {
        return Err(KernelError::DimensionMismatch {
            what: "diagonal rows",
            expected: mat.size1(),
            found: row + 1,
        });
    }
    if col >= mat.size2() {
        return Err(KernelError::DimensionMismatch {
            what: "diagonal columns",
            expected: mat.size2(),
            found: col + 1,
        });
    }
    Ok(())
}

/// Zero `mat`, then write `vec` onto its `k`-th diagonal.
pub fn matrix_diag_from_vector<T: Real>(
    launcher: &Launcher,
    vec: &DenseVector<T>,
    k: isize,
    mat: &mut DenseMatrix<T>,
) -> KernelResult<()> {
    ensure_diagonal_fits(mat, vec.size(), k)?;
    let len = vec.size();
    launcher.launch("matrix_diag_from_vector", || {
        mat.par_map_inplace(|i, j, _| {
            let on_diagonal = j as isize - i as isize == k;
            let t = if k < 0 { j } else { i };
            if on_diagonal && t < len {
                vec.get(t)
            } else {
                T::zero()
            }
        });
    });
    Ok(())
}

/// Copy the `k`-th diagonal of `mat` into `vec` (`vec.size()` elements).
pub fn matrix_diag_to_vector<T: Real>(
    launcher: &Launcher,
    mat: &DenseMatrix<T>,
    k: isize,
    vec: &mut DenseVector<T>,
) -> KernelResult<()> {
    ensure_diagonal_fits(mat, vec.size(), k)?;
    launcher.launch("matrix_diag_to_vector", || {
        vec.par_map_inplace(|t, _| {
            let (row, col) = diagonal_position(t, k);
            mat.get(row, col)
        });
    });
    Ok(())
}

/// Copy row `i` of `mat` into `vec`.
pub fn matrix_row<T: Real>(
    launcher: &Launcher,
    mat: &DenseMatrix<T>,
    i: usize,
    vec: &mut DenseVector<T>,
) -> KernelResult<()> {
    if i >= mat.size1() {
        return Err(KernelError::DimensionMismatch {
            what: "row index",
            expected: mat.size1(),
            found: i,
        });
    }
    if vec.size() != mat.size2() {
        return Err(KernelError::DimensionMismatch {
            what: "row vector",
            expected: mat.size2(),
            found: vec.size(),
        });
    }
    launcher.launch("matrix_row", || {
        vec.par_map_inplace(|j, _| mat.get(i, j));
    });
    Ok(())
}

/// Copy column `j` of `mat` into `vec`.
pub fn matrix_column<T: Real>(
    launcher: &Launcher,
    mat: &DenseMatrix<T>,
    j: usize,
    vec: &mut DenseVector<T>,
) -> KernelResult<()> {
    if j >= mat.size2() {
        return Err(KernelError::DimensionMismatch {
            what: "column index",
            expected: mat.size2(),
            found: j,
        });
    }
    if vec.size() != mat.size1() {
        return Err(KernelError::DimensionMismatch {
            what: "column vector",
            expected: mat.size1(),
            found: vec.size(),
        });
    }
    launcher.launch("matrix_column", || {
        vec.par_map_inplace(|i, _| mat.get(i, j));
    });
    Ok(())
}
