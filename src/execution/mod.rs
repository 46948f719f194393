//! Execution engine for running shape pipelines with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) evaluation of a pipeline over large shape collections
//! - Resource limits / throttling (in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! The engine owns an immutable [`Registry`] snapshot, so concurrent runs never observe each
//! other's registrations. Successful runs match [`crate::processing::process`] exactly: same
//! survivors, same order. On failure the error of the lowest shape index is returned, and no
//! chunk starting after a known failure is evaluated. Chunks already in flight when the failure
//! happens still run to completion (or to their own first error), so in-place runs may have
//! mutated shapes past the failing index.
//!
//! ```rust
//! use shape_pipeline::execution::{ExecutionEngine, ExecutionOptions};
//! use shape_pipeline::types::{Operation, Operator, Shape};
//!
//! let engine = ExecutionEngine::new(ExecutionOptions {
//!     num_threads: Some(2),
//!     chunk_size: 2,
//!     max_in_flight_chunks: 2,
//! });
//! let shapes: Vec<Shape> = (1..=6).map(|w| Shape::square(w as f64)).collect();
//! let ops = vec![Operation::filter("area", Operator::Gt, 10.0)];
//!
//! let out = engine.process_parallel(&shapes, &ops).unwrap();
//! assert_eq!(out, vec![Shape::square(4.0), Shape::square(5.0), Shape::square(6.0)]);
//! ```

mod observer;
mod semaphore;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::PipelineResult;
use crate::processing::evaluate::survivor_indices;
use crate::processing::Registry;
use crate::types::{Operation, Shape};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of shapes per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently evaluated chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            chunk_size: 1_024,
            max_in_flight_chunks: n.max(1),
        }
    }
}

/// A configurable, parallel pipeline runner.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    registry: Arc<Registry>,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine using the built-in operation handlers.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size == 0`, `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> Self {
        assert!(opts.chunk_size > 0, "chunk_size must be > 0");
        assert!(
            opts.max_in_flight_chunks > 0,
            "max_in_flight_chunks must be > 0"
        );
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts,
            registry: Arc::new(Registry::default()),
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Replace the handler set used by every subsequent run.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The registry snapshot this engine runs with.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Evaluate `operations` over copies of `shapes` in parallel and return the survivors in
    /// input order. Caller data is never mutated.
    pub fn process_parallel(&self, shapes: &[Shape], operations: &[Operation]) -> PipelineResult<Vec<Shape>> {
        let mut working = shapes.to_vec();
        let survivors = self.process_parallel_in_place(&mut working, operations)?;
        Ok(take_indices(working, &survivors))
    }

    /// Evaluate `operations` directly over `shapes` in parallel and return the indices of the
    /// survivors, ascending.
    ///
    /// On failure, chunks that had not started yet are left untouched; chunks that were already
    /// running may have been mutated.
    pub fn process_parallel_in_place(
        &self,
        shapes: &mut [Shape],
        operations: &[Operation],
    ) -> PipelineResult<Vec<usize>> {
        self.pool.install(|| self.run_chunks(shapes, operations))
    }

    fn run_chunks(&self, shapes: &mut [Shape], operations: &[Operation]) -> PipelineResult<Vec<usize>> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            shapes: shapes.len(),
            operations: operations.len(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunk_size = self.opts.chunk_size;
        let registry: &Registry = &self.registry;
        let first_failure = AtomicUsize::new(usize::MAX);

        let per_chunk: Vec<Option<PipelineResult<Vec<usize>>>> = shapes
            .par_chunks_mut(chunk_size)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                let start_index = chunk_idx * chunk_size;
                if start_index > first_failure.load(Ordering::SeqCst) {
                    return None;
                }

                let permit = sem.acquire();
                if start_index > first_failure.load(Ordering::SeqCst) {
                    return None;
                }
                let waited = permit.waited();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_index,
                    shape_count: chunk.len(),
                });

                let result = survivor_indices(chunk, start_index, operations, registry);
                let accepted = match &result {
                    Ok(kept) => {
                        self.metrics.on_shapes_evaluated(chunk.len(), kept.len());
                        kept.len()
                    }
                    Err(e) => {
                        first_failure.fetch_min(e.shape_index(), Ordering::SeqCst);
                        self.metrics.on_shapes_evaluated(e.shape_index() - start_index + 1, 0);
                        0
                    }
                };

                self.emit(ExecutionEvent::ChunkFinished { accepted });
                self.metrics.on_chunk_end();
                drop(permit);
                Some(result)
            })
            .collect();

        let mut survivors = Vec::new();
        for chunk in per_chunk.into_iter().flatten() {
            match chunk {
                Ok(kept) => survivors.extend(kept),
                Err(error) => {
                    self.metrics.end_run(start.elapsed());
                    self.emit(ExecutionEvent::RunFailed { error: error.clone() });
                    return Err(error);
                }
            }
        }

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        Ok(survivors)
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Keep the shapes at `indices` (ascending), dropping the rest.
fn take_indices(shapes: Vec<Shape>, indices: &[usize]) -> Vec<Shape> {
    let mut wanted = indices.iter().copied().peekable();
    shapes
        .into_iter()
        .enumerate()
        .filter_map(|(i, shape)| {
            if wanted.peek() == Some(&i) {
                wanted.next();
                Some(shape)
            } else {
                None
            }
        })
        .collect()
}
