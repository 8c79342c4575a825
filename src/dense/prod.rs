//! Dense products: matrix-vector, matrix-matrix (GEMM form) and the scaled rank-1 update.
//!
//! Every output element is computed independently by one lane; operands are read through
//! their view parameters, so mixed layouts and strided views are accepted.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::launch::Launcher;
use crate::backend::scalar::Real;
use crate::dense::matrix::{DenseMatrix, DenseVector};
use crate::dense::scaled_add::ScalarArg;

/// Element `(i, j)` of `op(mat)`.
fn op_get<T: Real>(mat: &DenseMatrix<T>, transposed: bool, i: usize, j: usize) -> T {
    if transposed { mat.get(j, i) } else { mat.get(i, j) }
}

fn op_shape<T: Real>(mat: &DenseMatrix<T>, transposed: bool) -> (usize, usize) {
    if transposed {
        (mat.size2(), mat.size1())
    } else {
        (mat.size1(), mat.size2())
    }
}

/// `result = op(mat) * vec` with `op` the identity or the transpose.
pub fn prod_impl_vec<T: Real>(
    launcher: &Launcher,
    mat: &DenseMatrix<T>,
    transposed: bool,
    vec: &DenseVector<T>,
    result: &mut DenseVector<T>,
) -> KernelResult<()> {
    let (rows, cols) = op_shape(mat, transposed);
    if vec.size() != cols {
        return Err(KernelError::DimensionMismatch {
            what: "prod vector",
            expected: cols,
            found: vec.size(),
        });
    }
    if result.size() != rows {
        return Err(KernelError::DimensionMismatch {
            what: "prod result",
            expected: rows,
            found: result.size(),
        });
    }
    let name = if transposed { "trans_vec_mul" } else { "vec_mul" };
    launcher.launch(name, || {
        result.par_map_inplace(|row, _| {
            (0..cols).fold(T::zero(), |acc, col| acc + op_get(mat, transposed, row, col) * vec.get(col))
        });
    });
    Ok(())
}

/// `C = alpha * op(A) * op(B) + beta * C`. With `beta == 0` the old content of `C`
/// is not read, so NaN or Inf in an uninitialized `C` does not leak into the result.
#[allow(clippy::too_many_arguments)]
pub fn prod_impl<T: Real>(
    launcher: &Launcher,
    a: &DenseMatrix<T>,
    trans_a: bool,
    b: &DenseMatrix<T>,
    trans_b: bool,
    c: &mut DenseMatrix<T>,
    alpha: T,
    beta: T,
) -> KernelResult<()> {
    let (m, k) = op_shape(a, trans_a);
    let (kb, n) = op_shape(b, trans_b);
    if k != kb {
        return Err(KernelError::DimensionMismatch {
            what: "prod inner dimension",
            expected: k,
            found: kb,
        });
    }
    c.ensure_shape("prod result", m, n)?;
    launcher.launch("prod", || {
        c.par_map_inplace(|i, j, old| {
            let dot = (0..k).fold(T::zero(), |acc, l| {
                acc + op_get(a, trans_a, i, l) * op_get(b, trans_b, l, j)
            });
            if beta == T::zero() {
                alpha * dot
            } else {
                alpha * dot + beta * old
            }
        });
    });
    Ok(())
}

/// `mat1 += alpha * vec1 * vec2ᵗ`
pub fn scaled_rank_1_update<T: Real>(
    launcher: &Launcher,
    mat1: &mut DenseMatrix<T>,
    alpha: ScalarArg<T>,
    vec1: &DenseVector<T>,
    vec2: &DenseVector<T>,
) -> KernelResult<()> {
    mat1.ensure_shape("rank-1 update", vec1.size(), vec2.size())?;
    launcher.launch("scaled_rank1_update", || {
        mat1.par_map_inplace(|i, j, old| old + alpha.apply(vec1.get(i)) * vec2.get(j));
    });
    Ok(())
}
