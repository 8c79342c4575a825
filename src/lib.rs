// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! Block-cooperative sparse triangular solves on CSR matrices, plus a family of
//! data-parallel dense kernels sharing the same launch machinery.
//!
//! ```no_run
//! use RustedKernels::backend::{KernelConfig, Launcher};
//! use RustedKernels::sparse::{CompressedMatrix, TriangularTag, inplace_solve};
//!
//! let launcher = Launcher::new(KernelConfig::default()).unwrap();
//! let lower = CompressedMatrix::new(3, vec![0, 1, 3, 6], vec![0, 0, 1, 0, 1, 2],
//!     vec![1.0, 2.0, 1.0, 3.0, 4.0, 1.0]).unwrap();
//! let mut x = vec![1.0, 4.0, 11.0];
//! inplace_solve(&launcher, &lower, &mut x, TriangularTag::UnitLower).unwrap();
//! assert_eq!(x, vec![1.0, 2.0, 0.0]);
//! ```
pub mod backend;
pub mod dense;
pub mod sparse;
