//! Ready-made drivers over [`StatsScheduler`]
//!
//! [`compute_windowed_stats`] runs one worker on the calling thread.
//! [`compute_windowed_stats_parallel`] broadcasts the same worker loop to
//! every thread of the global rayon pool. Both allocate and return an owned
//! [`WindowedStats`].

use texstat_core::{ImageView, Swizzle};
use tracing::debug;

use crate::FilterResult;
use crate::config::KernelSpec;
use crate::output::{StatsSink, WindowedStats};
use crate::scheduler::StatsScheduler;

/// Compute windowed statistics for every pixel on the calling thread.
///
/// # Errors
///
/// Returns the error of [`StatsScheduler::begin`] or [`StatsScheduler::run`].
pub fn compute_windowed_stats(
    image: &ImageView<'_>,
    spec: &KernelSpec,
    swizzle: Swizzle,
) -> FilterResult<WindowedStats> {
    let mut stats = WindowedStats::for_image(image);
    {
        let mut out = stats.output();
        let sched = StatsScheduler::begin(image, *spec, swizzle, &mut out)?;
        sched.run()?;
    }
    Ok(stats)
}

/// Compute windowed statistics for every pixel with all rayon threads.
///
/// # Errors
///
/// Returns the error of [`StatsScheduler::begin`], or the first worker error.
/// Units claimed by workers that did not fail are still written.
pub fn compute_windowed_stats_parallel(
    image: &ImageView<'_>,
    spec: &KernelSpec,
    swizzle: Swizzle,
) -> FilterResult<WindowedStats> {
    let mut stats = WindowedStats::for_image(image);
    {
        let mut out = stats.output();
        run_parallel(image, spec, swizzle, &mut out)?;
    }
    Ok(stats)
}

/// Broadcast the worker loop over the global rayon pool into any sink.
///
/// Returns the number of units processed by each pool thread.
///
/// # Errors
///
/// Returns the error of [`StatsScheduler::begin`], or the first worker error.
pub fn run_parallel<S: StatsSink>(
    image: &ImageView<'_>,
    spec: &KernelSpec,
    swizzle: Swizzle,
    sink: &mut S,
) -> FilterResult<Vec<usize>> {
    let sched = StatsScheduler::begin(image, *spec, swizzle, sink)?;
    let per_thread: Vec<FilterResult<usize>> = rayon::broadcast(|_| sched.run());
    debug!(threads = per_thread.len(), "broadcast finished");
    per_thread.into_iter().collect()
}
