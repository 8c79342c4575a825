//! # Launcher and thread block
//!
//! A kernel launch in this crate is always "one grid of one block": the block is a
//! fixed number of lanes that share staging buffers. Lanes are executed by the
//! launcher's rayon pool. The only synchronization primitive exposed to kernels is
//! the end of a lane phase (`ThreadBlock::lanes`), which acts as a block-wide
//! barrier: every lane has finished writing its slot before any code after the
//! call observes the buffer. There are no locks or atomics in the kernel code.
use crate::backend::config::KernelConfig;
use crate::backend::error::{KernelError, KernelResult};
use crate::backend::logger::init_logger;
use log::{debug, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;

/// lanes handed to one rayon task at minimum; a lane phase is a handful of loads,
/// splitting finer only costs scheduling
const LANES_PER_TASK: usize = 32;

pub struct Launcher {
    config: KernelConfig,
    pool: ThreadPool,
}

impl Launcher {
    /// Validates `config`, installs the configured logger (kept if one is already
    /// installed) and builds the worker pool.
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        config.validate()?;
        init_logger(&config)?;
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("kernel-lanes-{}", i));
        if let Some(n) = config.num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| KernelError::ThreadPool(e.to_string()))?;
        info!(
            "kernel launcher ready: {} worker threads, windows {}/{} lanes",
            pool.current_num_threads(),
            config.row_window,
            config.trans_window
        );
        Ok(Launcher { config, pool })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// A block of `block_dim` lanes executing on this launcher's pool.
    pub fn block(&self, block_dim: usize) -> KernelResult<ThreadBlock<'_>> {
        if block_dim == 0 || !block_dim.is_power_of_two() {
            return Err(KernelError::InvalidBlockDim(block_dim));
        }
        Ok(ThreadBlock {
            block_dim,
            pool: &self.pool,
        })
    }

    /// Run `kernel` to completion inside the worker pool. Kernels cannot be
    /// cancelled: the call returns only when the kernel body returns.
    pub fn launch<R, K>(&self, kernel_name: &str, kernel: K) -> R
    where
        K: FnOnce() -> R + Send,
        R: Send,
    {
        debug!("launching {}", kernel_name);
        let begin = Instant::now();
        let result = self.pool.install(kernel);
        debug!("{} finished in {:?}", kernel_name, begin.elapsed());
        result
    }
}

/// One thread block: `block_dim` lanes sharing staging buffers.
#[derive(Clone, Copy)]
pub struct ThreadBlock<'a> {
    block_dim: usize,
    pool: &'a ThreadPool,
}

impl<'a> ThreadBlock<'a> {
    pub fn block_dim(&self) -> usize {
        self.block_dim
    }

    /// Lane phase: lane `k` runs `kernel(k, &mut shared[k])` for every slot of
    /// `shared`. The call returns after all lanes are done (block barrier).
    /// `shared` may be shorter than the block when only a subset of lanes is active.
    pub fn lanes<S, F>(&self, shared: &mut [S], kernel: F)
    where
        S: Send,
        F: Fn(usize, &mut S) + Sync + Send,
    {
        debug_assert!(shared.len() <= self.block_dim);
        self.pool.install(|| {
            shared
                .par_iter_mut()
                .enumerate()
                .with_min_len(LANES_PER_TASK)
                .for_each(|(lane, slot)| kernel(lane, slot));
        });
    }
}
