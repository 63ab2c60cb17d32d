//! texstat-filter - Windowed per-pixel statistics
//!
//! For every pixel of an RGBA image this crate computes, over a
//! square (or cubic) window centred on the pixel:
//!
//! - the per-channel average and unbiased variance (`stats_radius`)
//! - the alpha average (`alpha_radius`)
//!
//! Work proceeds tile by tile. Each tile is sampled into a padded buffer
//! with clamp-to-edge borders, integrated into summed-area tables with a
//! Brent-Kung prefix sum, and every window is then read back in constant
//! time. A lock-free [`StatsScheduler`] hands out rows of tiles to any
//! number of worker threads.
//!
//! # Example
//!
//! ```
//! use texstat_core::{ImageView, Swizzle};
//! use texstat_filter::{KernelSpec, compute_windowed_stats};
//!
//! let data = vec![255u8; 4 * 16 * 16];
//! let img = ImageView::from_unorm8(16, 16, 1, &data).unwrap();
//! let spec = KernelSpec::builder().radius(2).build();
//!
//! let stats = compute_windowed_stats(&img, &spec, Swizzle::IDENTITY).unwrap();
//! assert!((stats.average(0, 0, 0).r - 1.0).abs() < 1e-6);
//! assert!(stats.variance(8, 8, 0).r.abs() < 1e-6);
//! ```

pub mod buffer;
pub mod config;
mod error;
pub mod geometry;
pub mod output;
pub mod parallel;
pub mod prefix_sum;
pub mod sampler;
pub mod sat;
pub mod scheduler;
pub mod windowed;

pub use config::{KernelSpec, KernelSpecBuilder};
pub use error::{FilterError, FilterResult};
pub use output::{StatsOutput, StatsSink, WindowedStats};
pub use scheduler::{Claim, StatsScheduler, WorkCursor};
pub use windowed::PixelStats;

// Re-export commonly used functions
pub use parallel::{compute_windowed_stats, compute_windowed_stats_parallel, run_parallel};
pub use prefix_sum::brent_kung_prefix_sum;
