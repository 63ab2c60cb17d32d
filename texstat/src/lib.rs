//! texstat - Windowed per-pixel texture statistics
//!
//! Computes, for every pixel of an RGBA texture, the average and variance
//! of a window around it plus a separately sized alpha average. Block
//! texture encoders use these to weight error metrics per pixel.
//!
//! # Overview
//!
//! - 2D images, texture arrays (independent slices) and 3D volumes
//! - `u8` unorm, `f16` and `f32` channels
//! - Swizzle and power-law response applied before accumulation
//! - Lock-free scheduling across any number of worker threads
//!
//! # Example
//!
//! ```
//! use texstat::{ImageView, Swizzle};
//! use texstat::filter::{KernelSpec, compute_windowed_stats_parallel};
//!
//! let data = vec![0.5f32; 4 * 32 * 32];
//! let img = ImageView::from_f32(32, 32, 1, &data).unwrap();
//! let spec = KernelSpec::builder().stats_radius(3).alpha_radius(1).build();
//!
//! let stats = compute_windowed_stats_parallel(&img, &spec, Swizzle::IDENTITY).unwrap();
//! assert!((stats.average(31, 31, 0).b - 0.5).abs() < 1e-6);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use texstat_core::*;

// Re-export the engine as a module to keep its error types apart
pub use texstat_filter as filter;
