//! Dense matrix and vector storage with view parameters.
//!
//! A matrix owns a padded buffer of `internal_size1 x internal_size2` elements in row- or
//! column-major order. The logical matrix is the `size1 x size2` sub-grid starting at
//! `(start1, start2)` with strides `(stride1, stride2)`, so ranges and slices of a larger
//! matrix are expressed by the view parameters alone.
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::scalar::Real;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Layout {
    RowMajor,
    ColumnMajor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    data: Vec<T>,
    layout: Layout,
    start1: usize,
    start2: usize,
    stride1: usize,
    stride2: usize,
    size1: usize,
    size2: usize,
    internal_size1: usize,
    internal_size2: usize,
}

impl<T: Real> DenseMatrix<T> {
    pub fn zeros(size1: usize, size2: usize, layout: Layout) -> Self {
        Self::padded(size1, size2, size1, size2, layout)
    }

    /// Zero matrix whose buffer is padded to `internal_size1 x internal_size2`.
    pub fn padded(size1: usize, size2: usize, internal_size1: usize, internal_size2: usize, layout: Layout) -> Self {
        let internal_size1 = internal_size1.max(size1);
        let internal_size2 = internal_size2.max(size2);
        DenseMatrix {
            data: vec![T::zero(); internal_size1 * internal_size2],
            layout,
            start1: 0,
            start2: 0,
            stride1: 1,
            stride2: 1,
            size1,
            size2,
            internal_size1,
            internal_size2,
        }
    }

    pub fn from_dmatrix(matrix: &DMatrix<T>, layout: Layout) -> Self {
        let (size1, size2) = matrix.shape();
        let mut dense = Self::zeros(size1, size2, layout);
        for i in 0..size1 {
            for j in 0..size2 {
                dense.set(i, j, matrix[(i, j)]);
            }
        }
        dense
    }

    /// Logical matrix as a nalgebra matrix.
    pub fn to_dmatrix(&self) -> DMatrix<T> {
        DMatrix::from_fn(self.size1, self.size2, |i, j| self.get(i, j))
    }

    /// Restrict the logical matrix to a strided sub-grid of the buffer.
    pub fn with_view(
        mut self,
        start1: usize,
        start2: usize,
        stride1: usize,
        stride2: usize,
        size1: usize,
        size2: usize,
    ) -> KernelResult<Self> {
        if stride1 == 0 || stride2 == 0 {
            return Err(KernelError::MalformedMatrix("view strides must be positive".to_string()));
        }
        let last1 = start1 + size1.saturating_sub(1) * stride1;
        let last2 = start2 + size2.saturating_sub(1) * stride2;
        if size1 > 0 && last1 >= self.internal_size1 {
            return Err(KernelError::DimensionMismatch {
                what: "view rows",
                expected: self.internal_size1,
                found: last1 + 1,
            });
        }
        if size2 > 0 && last2 >= self.internal_size2 {
            return Err(KernelError::DimensionMismatch {
                what: "view columns",
                expected: self.internal_size2,
                found: last2 + 1,
            });
        }
        self.start1 = start1;
        self.start2 = start2;
        self.stride1 = stride1;
        self.stride2 = stride2;
        self.size1 = size1;
        self.size2 = size2;
        Ok(self)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn size1(&self) -> usize {
        self.size1
    }

    pub fn size2(&self) -> usize {
        self.size2
    }

    pub fn internal_size1(&self) -> usize {
        self.internal_size1
    }

    pub fn internal_size2(&self) -> usize {
        self.internal_size2
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Error unless the logical shape is `size1 x size2`.
    pub fn ensure_shape(&self, what: &'static str, size1: usize, size2: usize) -> KernelResult<()> {
        if self.size1 != size1 {
            return Err(KernelError::DimensionMismatch {
                what,
                expected: size1,
                found: self.size1,
            });
        }
        if self.size2 != size2 {
            return Err(KernelError::DimensionMismatch {
                what,
                expected: size2,
                found: self.size2,
            });
        }
        Ok(())
    }

    fn physical(&self, row: usize, col: usize) -> usize {
        match self.layout {
            Layout::RowMajor => row * self.internal_size2 + col,
            Layout::ColumnMajor => row + col * self.internal_size1,
        }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        self.physical(self.start1 + i * self.stride1, self.start2 + j * self.stride2)
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    /// Data-parallel update of every logical element: `a(i, j) = f(i, j, a(i, j))`.
    /// Lines of the storage order are distributed over the pool.
    pub fn par_map_inplace<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, T) -> T + Sync + Send,
    {
        let (start_major, stride_major, size_major, start_minor, stride_minor, size_minor, line) = match self.layout {
            Layout::RowMajor => (
                self.start1,
                self.stride1,
                self.size1,
                self.start2,
                self.stride2,
                self.size2,
                self.internal_size2,
            ),
            Layout::ColumnMajor => (
                self.start2,
                self.stride2,
                self.size2,
                self.start1,
                self.stride1,
                self.size1,
                self.internal_size1,
            ),
        };
        if line == 0 {
            return;
        }
        let layout = self.layout;
        self.data
            .par_chunks_mut(line)
            .enumerate()
            .for_each(|(major, chunk)| {
                if major < start_major || (major - start_major) % stride_major != 0 {
                    return;
                }
                let m = (major - start_major) / stride_major;
                if m >= size_major {
                    return;
                }
                for n in 0..size_minor {
                    let slot = &mut chunk[start_minor + n * stride_minor];
                    let (i, j) = match layout {
                        Layout::RowMajor => (m, n),
                        Layout::ColumnMajor => (n, m),
                    };
                    *slot = f(i, j, *slot);
                }
            });
    }

    /// Fill the entire buffer, padding included.
    pub(crate) fn par_fill_storage(&mut self, value: T) {
        self.data.par_iter_mut().for_each(|v| *v = value);
    }
}

/// Dense vector view: `size` elements starting at `start` with step `stride`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVector<T> {
    data: Vec<T>,
    start: usize,
    stride: usize,
    size: usize,
}

impl<T: Real> DenseVector<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        let size = data.len();
        DenseVector {
            data,
            start: 0,
            stride: 1,
            size,
        }
    }

    pub fn zeros(size: usize) -> Self {
        Self::from_vec(vec![T::zero(); size])
    }

    /// Strided view over `data`.
    pub fn with_view(data: Vec<T>, start: usize, stride: usize, size: usize) -> KernelResult<Self> {
        if stride == 0 {
            return Err(KernelError::MalformedMatrix("vector stride must be positive".to_string()));
        }
        if size > 0 && start + (size - 1) * stride >= data.len() {
            return Err(KernelError::DimensionMismatch {
                what: "vector view",
                expected: data.len(),
                found: start + (size - 1) * stride + 1,
            });
        }
        Ok(DenseVector {
            data,
            start,
            stride,
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, i: usize) -> T {
        self.data[self.start + i * self.stride]
    }

    pub fn to_vec(&self) -> Vec<T> {
        (0..self.size).map(|i| self.get(i)).collect()
    }

    pub fn to_dvector(&self) -> DVector<T> {
        DVector::from_vec(self.to_vec())
    }

    /// Data-parallel update of every logical element: `v(i) = f(i, v(i))`.
    pub fn par_map_inplace<F>(&mut self, f: F)
    where
        F: Fn(usize, T) -> T + Sync + Send,
    {
        if self.size == 0 {
            return;
        }
        let size = self.size;
        self.data[self.start..]
            .par_chunks_mut(self.stride)
            .take(size)
            .enumerate()
            .for_each(|(i, chunk)| chunk[0] = f(i, chunk[0]));
    }
}
