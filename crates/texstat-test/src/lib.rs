//! texstat-test - Regression test helpers for texstat
//!
//! - [`RegParams`]: collects value comparisons and reports them together
//! - [`SyntheticImage`]: owned test images in every pixel format
//! - [`reference_windowed_stats`]: brute-force `f64` reference results
//!
//! # Usage
//!
//! ```
//! use texstat_test::RegParams;
//!
//! let mut rp = RegParams::new("example");
//! rp.compare_values(4.0 / 9.0, 0.444_444_4, 1e-6);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;
pub mod reference;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use reference::{ReferenceKernel, ReferenceStats, reference_windowed_stats};
pub use synth::{SyntheticData, SyntheticImage};
