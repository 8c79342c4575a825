use std::fmt;

/// Errors of the layers around the kernels: configuration, launcher construction,
/// matrix construction and the optional structural validation before a solve.
/// The kernels themselves never return errors.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// block dimension (window size) must be a nonzero power of two
    InvalidBlockDim(usize),
    /// rayon refused to build the worker pool
    ThreadPool(String),
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    MalformedMatrix(String),
    /// entry (row, col) lies on the wrong side of the diagonal for the requested solve
    NotTriangular { row: usize, col: usize },
    ZeroDiagonal { row: usize },
    Config(String),
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelError::InvalidBlockDim(dim) => {
                write!(f, "Invalid block dimension {}: must be a nonzero power of two", dim)
            }
            KernelError::ThreadPool(msg) => write!(f, "Failed to build worker pool: {}", msg),
            KernelError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch in {}: expected {}, found {}",
                what, expected, found
            ),
            KernelError::MalformedMatrix(msg) => write!(f, "Malformed matrix: {}", msg),
            KernelError::NotTriangular { row, col } => write!(
                f,
                "Matrix is not triangular in the solve direction: entry ({}, {})",
                row, col
            ),
            KernelError::ZeroDiagonal { row } => write!(f, "Zero diagonal entry in row {}", row),
            KernelError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for KernelError {}

pub type KernelResult<T> = Result<T, KernelError>;
