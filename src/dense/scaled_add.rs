//! Scaled assignment and addition: `A = alpha*B`, `A = alpha*B + beta*C`,
//! `A += alpha*B + beta*C` and the vector form `x = alpha*y`.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::launch::Launcher;
use crate::backend::scalar::Real;
use crate::dense::matrix::{DenseMatrix, DenseVector};

/// Scalar operand with the modifiers the kernels support: negation and division
/// (`reciprocal` scales by `1/value`, computed as a division per element).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarArg<T> {
    pub value: T,
    pub reciprocal: bool,
    pub flip_sign: bool,
}

impl<T: Real> ScalarArg<T> {
    pub fn new(value: T) -> Self {
        ScalarArg {
            value,
            reciprocal: false,
            flip_sign: false,
        }
    }

    pub fn reciprocal(mut self) -> Self {
        self.reciprocal = true;
        self
    }

    pub fn flip_sign(mut self) -> Self {
        self.flip_sign = true;
        self
    }

    /// `x` scaled by this scalar.
    pub fn apply(&self, x: T) -> T {
        let alpha = if self.flip_sign { -self.value } else { self.value };
        if self.reciprocal { x / alpha } else { x * alpha }
    }

    /// The scalar as a single factor.
    pub fn effective(&self) -> T {
        self.apply(T::one())
    }
}

impl<T: Real> From<T> for ScalarArg<T> {
    fn from(value: T) -> Self {
        ScalarArg::new(value)
    }
}

/// `mat1 = alpha * mat2`
pub fn am<T: Real>(
    launcher: &Launcher,
    mat1: &mut DenseMatrix<T>,
    mat2: &DenseMatrix<T>,
    alpha: ScalarArg<T>,
) -> KernelResult<()> {
    mat2.ensure_shape("am operand", mat1.size1(), mat1.size2())?;
    launcher.launch("am", || {
        mat1.par_map_inplace(|i, j, _| alpha.apply(mat2.get(i, j)));
    });
    Ok(())
}

/// `mat1 = alpha * mat2 + beta * mat3`
pub fn ambm<T: Real>(
    launcher: &Launcher,
    mat1: &mut DenseMatrix<T>,
    mat2: &DenseMatrix<T>,
    alpha: ScalarArg<T>,
    mat3: &DenseMatrix<T>,
    beta: ScalarArg<T>,
) -> KernelResult<()> {
    mat2.ensure_shape("ambm operand", mat1.size1(), mat1.size2())?;
    mat3.ensure_shape("ambm operand", mat1.size1(), mat1.size2())?;
    launcher.launch("ambm", || {
        mat1.par_map_inplace(|i, j, _| alpha.apply(mat2.get(i, j)) + beta.apply(mat3.get(i, j)));
    });
    Ok(())
}

/// `mat1 += alpha * mat2 + beta * mat3`
pub fn ambm_m<T: Real>(
    launcher: &Launcher,
    mat1: &mut DenseMatrix<T>,
    mat2: &DenseMatrix<T>,
    alpha: ScalarArg<T>,
    mat3: &DenseMatrix<T>,
    beta: ScalarArg<T>,
) -> KernelResult<()> {
    mat2.ensure_shape("ambm_m operand", mat1.size1(), mat1.size2())?;
    mat3.ensure_shape("ambm_m operand", mat1.size1(), mat1.size2())?;
    launcher.launch("ambm_m", || {
        mat1.par_map_inplace(|i, j, old| old + alpha.apply(mat2.get(i, j)) + beta.apply(mat3.get(i, j)));
    });
    Ok(())
}

/// `vec1 = alpha * vec2`
pub fn av<T: Real>(
    launcher: &Launcher,
    vec1: &mut DenseVector<T>,
    vec2: &DenseVector<T>,
    alpha: ScalarArg<T>,
) -> KernelResult<()> {
    if vec1.size() != vec2.size() {
        return Err(KernelError::DimensionMismatch {
            what: "av operand",
            expected: vec1.size(),
            found: vec2.size(),
        });
    }
    launcher.launch("av", || {
        vec1.par_map_inplace(|i, _| alpha.apply(vec2.get(i)));
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::KernelConfig;
    use crate::dense::matrix::Layout;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn launcher() -> Launcher {
        Launcher::new(KernelConfig::default().with_threads(2)).unwrap()
    }

    #[test]
    fn test_scalar_modifiers() {
        let a = ScalarArg::new(4.0);
        assert_eq!(a.apply(2.0), 8.0);
        assert_eq!(a.reciprocal().apply(2.0), 0.5);
        assert_eq!(a.flip_sign().apply(2.0), -8.0);
        assert_eq!(a.flip_sign().reciprocal().effective(), -0.25);
        assert_eq!(ScalarArg::from(3.0f32).effective(), 3.0);
    }

    #[test]
    fn test_am_and_ambm_against_nalgebra() {
        let launcher = launcher();
        let b = DMatrix::from_fn(5, 7, |i, j| (i as f64 - j as f64) * 0.5);
        let c = DMatrix::from_fn(5, 7, |i, j| (i * j) as f64 + 1.0);
        for layout in [Layout::RowMajor, Layout::ColumnMajor] {
            let mb = DenseMatrix::from_dmatrix(&b, layout);
            let mc = DenseMatrix::from_dmatrix(&c, Layout::ColumnMajor);
            let mut a = DenseMatrix::zeros(5, 7, layout);

            am(&launcher, &mut a, &mb, ScalarArg::new(2.0).flip_sign()).unwrap();
            assert_eq!(a.to_dmatrix(), &b * -2.0);

            ambm(&launcher, &mut a, &mb, ScalarArg::new(2.0), &mc, ScalarArg::new(4.0).reciprocal()).unwrap();
            let expected = &b * 2.0 + &c / 4.0;
            assert_relative_eq!(a.to_dmatrix(), expected, epsilon = 1e-14);

            ambm_m(&launcher, &mut a, &mb, ScalarArg::new(1.0), &mc, ScalarArg::new(1.0)).unwrap();
            let expected = expected + &b + &c;
            assert_relative_eq!(a.to_dmatrix(), expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let launcher = launcher();
        let mut a = DenseMatrix::<f64>::zeros(2, 2, Layout::RowMajor);
        let b = DenseMatrix::<f64>::zeros(2, 3, Layout::RowMajor);
        assert!(matches!(
            am(&launcher, &mut a, &b, ScalarArg::new(1.0)),
            Err(KernelError::DimensionMismatch { .. })
        ));
        let mut x = DenseVector::<f64>::zeros(3);
        let y = DenseVector::<f64>::zeros(4);
        assert!(av(&launcher, &mut x, &y, ScalarArg::new(1.0)).is_err());
    }

    #[test]
    fn test_av_strided() {
        let launcher = launcher();
        let mut x = DenseVector::with_view(vec![0.0; 6], 0, 2, 3).unwrap();
        let y = DenseVector::from_vec(vec![1.0, 2.0, 3.0]);
        av(&launcher, &mut x, &y, ScalarArg::new(3.0)).unwrap();
        assert_eq!(x.data(), &[3.0, 0.0, 6.0, 0.0, 9.0, 0.0]);
    }
}
