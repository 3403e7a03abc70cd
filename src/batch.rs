use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{compute_with_options, CdtError, CdtInput, CdtOptions, CdtResult, OutputType};

/// Determines how work items are distributed among threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SchedulingMode {
    /// Every thread receives roughly the same share of the items up front.
    #[default]
    Static,
    /// Threads pull small chunks until all items are processed.
    Dynamic,
}

/// Controls how a batch of independent inputs is processed.
///
/// The following parameters will be used by `Self::default`:
/// * `use_threading`: true
/// * `min_items_per_chunk`: 0 (chosen by a heuristic)
/// * `scheduling_mode`: [SchedulingMode::Static]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParallelSettings {
    /// Process all items on the calling thread if `false`.
    pub use_threading: bool,
    /// Minimum number of items processed by a single task. Zero selects a heuristic.
    pub min_items_per_chunk: usize,
    /// How chunks are distributed.
    pub scheduling_mode: SchedulingMode,
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self {
            use_threading: true,
            min_items_per_chunk: 0,
            scheduling_mode: SchedulingMode::default(),
        }
    }
}

/// Calculates the number of items processed by a single task.
///
/// Small workloads run as a single chunk. For larger workloads the chunk size grows with the
/// thread count to keep the overhead of fetching tasks low.
pub fn calc_chunk_size(settings: &ParallelSettings, total_items: usize, num_threads: usize) -> usize {
    // Sequential runs form a single task.
    let num_tasks = if settings.use_threading {
        num_threads.max(1)
    } else {
        1
    };

    let mut chunk_size = if !settings.use_threading {
        1024
    } else if settings.min_items_per_chunk > 0 {
        settings.min_items_per_chunk
    } else {
        let chunk_size = 32 * (num_tasks >> 3).max(1);
        if total_items > 0 && total_items < 256.max(chunk_size * 2) {
            total_items
        } else {
            chunk_size
        }
    };

    if total_items > 0 && settings.scheduling_mode == SchedulingMode::Static {
        chunk_size = chunk_size.max(total_items / num_tasks);
    }
    chunk_size
}

/// Triangulates many independent inputs with default options.
///
/// Results are returned in input order. Each input fails or succeeds independently.
///
/// # Example
///
/// ```
/// use planar_cdt::{compute_batch, CdtInput, OutputType, ParallelSettings};
///
/// let inputs: Vec<_> = (0..4)
///     .map(|i| {
///         let mut input = CdtInput::new(1e-6);
///         input.add_vertex([0.0, 0.0]);
///         input.add_vertex([1.0, i as f64]);
///         input.add_vertex([0.0, 1.0]);
///         input
///     })
///     .collect();
///
/// let results = compute_batch(&inputs, OutputType::Full, &ParallelSettings::default());
/// assert_eq!(results.len(), 4);
/// // The second input is degenerate but still succeeds
/// assert!(results.iter().all(|result| result.is_ok()));
/// ```
pub fn compute_batch(
    inputs: &[CdtInput],
    output_type: OutputType,
    settings: &ParallelSettings,
) -> Vec<Result<CdtResult, CdtError>> {
    compute_batch_with_options(inputs, output_type, settings, &CdtOptions::default())
}

/// Triangulates many independent inputs on the `rayon` thread pool.
pub fn compute_batch_with_options(
    inputs: &[CdtInput],
    output_type: OutputType,
    settings: &ParallelSettings,
    options: &CdtOptions,
) -> Vec<Result<CdtResult, CdtError>> {
    let compute = |input: &CdtInput| compute_with_options(input, output_type, options);

    if !settings.use_threading {
        return inputs.iter().map(compute).collect();
    }

    let num_threads = rayon::current_num_threads();
    let chunk_size = calc_chunk_size(settings, inputs.len(), num_threads);
    debug!(
        inputs = inputs.len(),
        num_threads,
        chunk_size,
        "triangulating batch"
    );

    inputs
        .par_chunks(chunk_size)
        .flat_map_iter(|chunk| chunk.iter().map(compute))
        .collect()
}
