use crate::backend::error::KernelResult;
use crate::backend::launch::Launcher;
use crate::backend::scalar::Real;
use crate::dense::matrix::DenseMatrix;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum BinaryOp {
    Product,
    Division,
    Power,
}

impl BinaryOp {
    pub fn apply<T: Real>(&self, lhs: T, rhs: T) -> T {
        match self {
            BinaryOp::Product => lhs * rhs,
            BinaryOp::Division => lhs / rhs,
            BinaryOp::Power => lhs.powf(rhs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum UnaryOp {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Fabs,
    Floor,
    Log,
    Log10,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
}

impl UnaryOp {
    pub fn apply<T: Real>(&self, x: T) -> T {
        match self {
            UnaryOp::Abs | UnaryOp::Fabs => x.abs(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Atan => x.atan(),
            UnaryOp::Ceil => x.ceil(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Cosh => x.cosh(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Floor => x.floor(),
            UnaryOp::Log => x.ln(),
            UnaryOp::Log10 => x.log10(),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Sinh => x.sinh(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Tanh => x.tanh(),
        }
    }
}

/// `a(i, j) = op(lhs(i, j), rhs(i, j))`
pub fn element_op_binary<T: Real>(
    launcher: &Launcher,
    a: &mut DenseMatrix<T>,
    lhs: &DenseMatrix<T>,
    rhs: &DenseMatrix<T>,
    op: BinaryOp,
) -> KernelResult<()> {
    lhs.ensure_shape("element_op lhs", a.size1(), a.size2())?;
    rhs.ensure_shape("element_op rhs", a.size1(), a.size2())?;
    launcher.launch("element_op_binary", || {
        a.par_map_inplace(|i, j, _| op.apply(lhs.get(i, j), rhs.get(i, j)));
    });
    Ok(())
}

/// `a(i, j) = op(src(i, j))`
pub fn element_op_unary<T: Real>(
    launcher: &Launcher,
    a: &mut DenseMatrix<T>,
    src: &DenseMatrix<T>,
    op: UnaryOp,
) -> KernelResult<()> {
    src.ensure_shape("element_op operand", a.size1(), a.size2())?;
    launcher.launch("element_op_unary", || {
        a.par_map_inplace(|i, j, _| op.apply(src.get(i, j)));
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
    use strum::IntoEnumIterator;

    #[test]
    fn test_binary_ops_against_nalgebra() {
        let launcher = Launcher::new(KernelConfig::default().with_threads(2)).unwrap();
        let l = DMatrix::from_fn(4, 3, |i, j| 1.0 + i as f64 + 0.5 * j as f64);
        let r = DMatrix::from_fn(4, 3, |i, j| 0.5 + (i + j) as f64 * 0.25);
        let ml = DenseMatrix::from_dmatrix(&l, Layout::RowMajor);
        let mr = DenseMatrix::from_dmatrix(&r, Layout::ColumnMajor);
        for op in BinaryOp::iter() {
            let mut a = DenseMatrix::zeros(4, 3, Layout::RowMajor);
            element_op_binary(&launcher, &mut a, &ml, &mr, op).unwrap();
            let expected = match op {
                BinaryOp::Product => l.component_mul(&r),
                BinaryOp::Division => l.component_div(&r),
                BinaryOp::Power => l.zip_map(&r, |x, y| x.powf(y)),
            };
            assert_relative_eq!(a.to_dmatrix(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_unary_ops() {
        let launcher = Launcher::new(KernelConfig::default().with_threads(2)).unwrap();
        // values inside the domain of every op (acos/asin need [-1, 1], log needs > 0)
        let src = DMatrix::from_fn(3, 3, |i, j| 0.05 + 0.1 * (3 * i + j) as f64);
        let msrc = DenseMatrix::from_dmatrix(&src, Layout::ColumnMajor);
        assert_eq!(UnaryOp::iter().count(), 17);
        for op in UnaryOp::iter() {
            let mut a = DenseMatrix::zeros(3, 3, Layout::ColumnMajor);
            element_op_unary(&launcher, &mut a, &msrc, op).unwrap();
            let expected = src.map(|x| op.apply(x));
            assert_eq!(a.to_dmatrix(), expected, "{}", op);
        }
        assert_relative_eq!(UnaryOp::Log.apply(std::f64::consts::E), 1.0, epsilon = 1e-15);
        assert_relative_eq!(UnaryOp::Log10.apply(100.0f64), 2.0, epsilon = 1e-15);
        assert_eq!(UnaryOp::Ceil.apply(-1.5f32), -1.0);
    }
}
