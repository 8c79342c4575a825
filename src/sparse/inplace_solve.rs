//! Variant selection: maps a triangular tag to exactly one substitution kernel and
//! launches it as a single block.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::launch::Launcher;
use crate::backend::scalar::Real;
use crate::sparse::compressed_matrix::{CompressedMatrix, CsrView, Triangle};
use crate::sparse::solve::{csr_lu_backward, csr_lu_forward, csr_unit_lu_backward, csr_unit_lu_forward};
use crate::sparse::solve_trans::{
    csr_trans_lu_backward, csr_trans_lu_forward, csr_trans_unit_lu_backward, csr_trans_unit_lu_forward,
};
use log::{debug, info};
use strum_macros::{Display, EnumIter};

/// Shape of the triangular operator being solved with.
/// `Unit*` variants assume an implicit unit diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum TriangularTag {
    Lower,
    UnitLower,
    Upper,
    UnitUpper,
}

impl TriangularTag {
    pub fn is_unit(&self) -> bool {
        matches!(self, TriangularTag::UnitLower | TriangularTag::UnitUpper)
    }

    pub fn is_lower(&self) -> bool {
        matches!(self, TriangularTag::Lower | TriangularTag::UnitLower)
    }
}

/// Solve `A x = b` in place, `A` lower (forward substitution) or upper (backward).
/// `vector` holds `b` on entry and `x` on return.
pub fn inplace_solve<T: Real>(
    launcher: &Launcher,
    matrix: &CompressedMatrix<T>,
    vector: &mut [T],
    tag: TriangularTag,
) -> KernelResult<()> {
    let triangle = if tag.is_lower() { Triangle::Lower } else { Triangle::Upper };
    prepare(launcher, matrix, vector, tag, triangle)?;

    let block = launcher.block(launcher.config().row_window)?;
    let size = matrix.size();
    let CsrView {
        row_offsets,
        column_indices,
        elements,
    } = matrix.view();

    match tag {
        TriangularTag::UnitLower => launcher.launch("csr_unit_lu_forward", || {
            csr_unit_lu_forward(&block, row_offsets, column_indices, elements, vector, size)
        }),
        TriangularTag::UnitUpper => launcher.launch("csr_unit_lu_backward", || {
            csr_unit_lu_backward(&block, row_offsets, column_indices, elements, vector, size)
        }),
        TriangularTag::Lower => {
            let diagonal = diagonal_of(matrix);
            launcher.launch("csr_lu_forward", || {
                csr_lu_forward(&block, row_offsets, column_indices, elements, &diagonal, vector, size)
            })
        }
        TriangularTag::Upper => {
            let diagonal = diagonal_of(matrix);
            launcher.launch("csr_lu_backward", || {
                csr_lu_backward(&block, row_offsets, column_indices, elements, &diagonal, vector, size)
            })
        }
    }
    Ok(())
}

/// Solve `Aᵗ x = b` in place without forming `Aᵗ`. `tag` describes `Aᵗ`: `Lower` means
/// the stored `A` is upper triangular and the solve runs forward.
pub fn inplace_solve_trans<T: Real>(
    launcher: &Launcher,
    matrix: &CompressedMatrix<T>,
    vector: &mut [T],
    tag: TriangularTag,
) -> KernelResult<()> {
    let triangle = if tag.is_lower() { Triangle::Upper } else { Triangle::Lower };
    prepare(launcher, matrix, vector, tag, triangle)?;

    let block = launcher.block(launcher.config().trans_window)?;
    let size = matrix.size();
    let CsrView {
        row_offsets,
        column_indices,
        elements,
    } = matrix.view();

    match tag {
        TriangularTag::UnitLower => launcher.launch("csr_trans_unit_lu_forward", || {
            csr_trans_unit_lu_forward(&block, row_offsets, column_indices, elements, vector, size)
        }),
        TriangularTag::UnitUpper => launcher.launch("csr_trans_unit_lu_backward", || {
            csr_trans_unit_lu_backward(&block, row_offsets, column_indices, elements, vector, size)
        }),
        TriangularTag::Lower => {
            let diagonal = diagonal_of(matrix);
            launcher.launch("csr_trans_lu_forward", || {
                csr_trans_lu_forward(&block, row_offsets, column_indices, elements, &diagonal, vector, size)
            })
        }
        TriangularTag::Upper => {
            let diagonal = diagonal_of(matrix);
            launcher.launch("csr_trans_lu_backward", || {
                csr_trans_lu_backward(&block, row_offsets, column_indices, elements, &diagonal, vector, size)
            })
        }
    }
    Ok(())
}

/// Length check, then the structural checks when `validate_triangular` is on.
/// `triangle` is where the stored off-diagonal entries must lie.
fn prepare<T: Real>(
    launcher: &Launcher,
    matrix: &CompressedMatrix<T>,
    vector: &[T],
    tag: TriangularTag,
    triangle: Triangle,
) -> KernelResult<()> {
    if vector.len() != matrix.size() {
        return Err(KernelError::DimensionMismatch {
            what: "solution vector",
            expected: matrix.size(),
            found: vector.len(),
        });
    }
    if launcher.config().validate_triangular {
        matrix.check_triangular(triangle, !tag.is_unit())?;
        info!("{} structure verified for {} solve", triangle, tag);
    }
    debug!(
        "{} solve: size {}, nnz {}, scalar {}",
        tag,
        matrix.size(),
        matrix.nnz(),
        T::type_name()
    );
    Ok(())
}

/// Separate diagonal when the matrix carries one, otherwise read from the CSR body.
fn diagonal_of<T: Real>(matrix: &CompressedMatrix<T>) -> Vec<T> {
    match matrix.diagonal() {
        Some(d) => d.to_vec(),
        None => matrix.extract_diagonal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KernelConfig;
    use strum::IntoEnumIterator;

    fn lower_3x3() -> CompressedMatrix<f64> {
        CompressedMatrix::new(
            3,
            vec![0, 1, 3, 6],
            vec![0, 0, 1, 0, 1, 2],
            vec![1.0, 2.0, 1.0, 3.0, 4.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_tag_properties() {
        let tags: Vec<TriangularTag> = TriangularTag::iter().collect();
        assert_eq!(tags.len(), 4);
        assert_eq!(tags.iter().filter(|t| t.is_unit()).count(), 2);
        assert_eq!(tags.iter().filter(|t| t.is_lower()).count(), 2);
        assert_eq!(TriangularTag::UnitLower.to_string(), "UnitLower");
    }

    #[test]
    fn test_inplace_solve_3x3() {
        let launcher = Launcher::new(KernelConfig::default().with_threads(2)).unwrap();
        let matrix = lower_3x3();
        for tag in [TriangularTag::Lower, TriangularTag::UnitLower] {
            let mut x = vec![1.0, 4.0, 11.0];
            inplace_solve(&launcher, &matrix, &mut x, tag).unwrap();
            assert_eq!(x, vec![1.0, 2.0, 0.0]);
        }
        // Aᵗ of the stored upper triangle is the same lower operator
        let upper = matrix.transpose();
        let mut x = vec![1.0, 4.0, 11.0];
        inplace_solve_trans(&launcher, &upper, &mut x, TriangularTag::UnitLower).unwrap();
        assert_eq!(x, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let launcher = Launcher::new(KernelConfig::default().with_threads(1)).unwrap();
        let mut x = vec![1.0, 2.0];
        let res = inplace_solve(&launcher, &lower_3x3(), &mut x, TriangularTag::Lower);
        assert_eq!(
            res,
            Err(KernelError::DimensionMismatch {
                what: "solution vector",
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_validation_is_opt_in() {
        let matrix = lower_3x3();
        let lenient = Launcher::new(KernelConfig::default().with_threads(1)).unwrap();
        let mut x = vec![1.0, 1.0, 1.0];
        // wrong direction: runs, gives numbers, no error
        assert!(inplace_solve(&lenient, &matrix, &mut x, TriangularTag::Upper).is_ok());

        let strict = Launcher::new(KernelConfig::default().with_threads(1).with_validation(true)).unwrap();
        let mut x = vec![1.0, 1.0, 1.0];
        assert_eq!(
            inplace_solve(&strict, &matrix, &mut x, TriangularTag::Upper),
            Err(KernelError::NotTriangular { row: 1, col: 0 })
        );
        assert_eq!(
            inplace_solve_trans(&strict, &matrix, &mut x, TriangularTag::Lower),
            Err(KernelError::NotTriangular { row: 1, col: 0 })
        );
        assert!(inplace_solve_trans(&strict, &matrix, &mut x, TriangularTag::Upper).is_ok());

        let no_diag = CompressedMatrix::from_triplets(2, &[(0, 0, 1.0), (1, 0, 1.0)]).unwrap();
        let mut x = vec![1.0, 1.0];
        assert_eq!(
            inplace_solve(&strict, &no_diag, &mut x, TriangularTag::Lower),
            Err(KernelError::ZeroDiagonal { row: 1 })
        );
        assert!(inplace_solve(&strict, &no_diag, &mut x, TriangularTag::UnitLower).is_ok());
    }
}
