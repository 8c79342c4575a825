//! # Kernel backend
//!
//! ## Aim and General Description
//! Everything the numeric kernels need to run but that is not numerics itself:
//! the scalar bound, the error type, configuration, logging and the launch
//! machinery that emulates a GPU thread block on top of a rayon worker pool.
//!
//! ## Execution model
//! - a `Launcher` owns one rayon pool; `Launcher::launch` runs a kernel inside it
//! - a `ThreadBlock` is a fixed number of lanes (the block dimension)
//! - `ThreadBlock::lanes` runs one closure per lane, every lane writing only its own
//!   slot of a shared staging buffer; returning from the call is the block barrier
//! - code between two `lanes` calls is the coordinator (lane 0) phase
#![allow(non_snake_case)]
/// configuration of launches, solves and logging (TOML loadable)
pub mod config;
/// error type of the non-kernel layers
pub mod error;
/// launcher, thread block and lane phases
pub mod launch;
/// simplelog based logger set up
pub mod logger;
/// scalar bound shared by all kernels
pub mod scalar;

pub use config::KernelConfig;
pub use error::{KernelError, KernelResult};
pub use launch::{Launcher, ThreadBlock};
pub use scalar::Real;
