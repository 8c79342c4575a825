use num_traits::Float;
use std::fmt::{Debug, Display};

/// Real floating point scalar the kernels are instantiated for.
/// Only `f32` and `f64` implement it: complex and integer types are not supported.
pub trait Real: Float + Debug + Display + Default + Send + Sync + 'static {
    /// short name used in log messages
    fn type_name() -> &'static str;
}

impl Real for f32 {
    fn type_name() -> &'static str {
        "f32"
    }
}

impl Real for f64 {
    fn type_name() -> &'static str {
        "f64"
    }
}
