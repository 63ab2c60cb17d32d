//! Kernel configuration for a statistics pass.
//!
//! [`KernelSpec`] is immutable once built. Use the builder for ergonomic
//! construction:
//!
//! ```
//! use texstat_filter::KernelSpec;
//!
//! let spec = KernelSpec::builder()
//!     .stats_radius(4)
//!     .alpha_radius(1)
//!     .rgb_power(2.2)
//!     .build();
//! assert_eq!(spec.kernel_radius(), 4);
//! ```

use crate::{FilterError, FilterResult};

/// Window radii and response curve for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelSpec {
    /// Half-size of the average/variance window (default: 0).
    /// The window spans `2 * stats_radius + 1` pixels per active axis.
    pub stats_radius: u32,
    /// Half-size of the alpha average window (default: 0).
    pub alpha_radius: u32,
    /// Exponent applied to R, G and B after swizzle (default: 1.0).
    pub rgb_power: f32,
    /// Exponent applied to A after swizzle (default: 1.0).
    pub alpha_power: f32,
    /// Treat z as a spatial axis (default: false).
    /// When false, each z slice is processed as an independent 2D image.
    pub volumetric: bool,
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self {
            stats_radius: 0,
            alpha_radius: 0,
            rgb_power: 1.0,
            alpha_power: 1.0,
            volumetric: false,
        }
    }
}

impl KernelSpec {
    /// Create a new builder for `KernelSpec`.
    #[must_use]
    pub fn builder() -> KernelSpecBuilder {
        KernelSpecBuilder::default()
    }

    /// Combined radius: the larger of the two window radii.
    /// The padded work buffer is sized from this value.
    #[must_use]
    pub fn kernel_radius(&self) -> u32 {
        self.stats_radius.max(self.alpha_radius)
    }

    /// True when both exponents are exactly 1.0 and sampling may skip `powf`.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.rgb_power == 1.0 && self.alpha_power == 1.0
    }

    /// Check the exponents.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if either exponent is not a
    /// finite positive number.
    pub fn validate(&self) -> FilterResult<()> {
        for (name, p) in [
            ("rgb_power", self.rgb_power),
            ("alpha_power", self.alpha_power),
        ] {
            if !p.is_finite() || p <= 0.0 {
                return Err(FilterError::InvalidParameters(format!(
                    "{name} must be finite and > 0, got {p}"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`KernelSpec`].
#[derive(Default)]
pub struct KernelSpecBuilder {
    stats_radius: Option<u32>,
    alpha_radius: Option<u32>,
    rgb_power: Option<f32>,
    alpha_power: Option<f32>,
    volumetric: Option<bool>,
}

impl KernelSpecBuilder {
    /// Set the average/variance window radius.
    #[must_use]
    pub fn stats_radius(mut self, radius: u32) -> Self {
        self.stats_radius = Some(radius);
        self
    }

    /// Set the alpha average window radius.
    #[must_use]
    pub fn alpha_radius(mut self, radius: u32) -> Self {
        self.alpha_radius = Some(radius);
        self
    }

    /// Set both window radii.
    #[must_use]
    pub fn radius(self, radius: u32) -> Self {
        self.stats_radius(radius).alpha_radius(radius)
    }

    /// Set the R, G, B response exponent.
    #[must_use]
    pub fn rgb_power(mut self, power: f32) -> Self {
        self.rgb_power = Some(power);
        self
    }

    /// Set the alpha response exponent.
    #[must_use]
    pub fn alpha_power(mut self, power: f32) -> Self {
        self.alpha_power = Some(power);
        self
    }

    /// Treat z as a spatial axis.
    #[must_use]
    pub fn volumetric(mut self, enable: bool) -> Self {
        self.volumetric = Some(enable);
        self
    }

    /// Build the `KernelSpec`, using defaults for unset fields.
    #[must_use]
    pub fn build(self) -> KernelSpec {
        let d = KernelSpec::default();
        KernelSpec {
            stats_radius: self.stats_radius.unwrap_or(d.stats_radius),
            alpha_radius: self.alpha_radius.unwrap_or(d.alpha_radius),
            rgb_power: self.rgb_power.unwrap_or(d.rgb_power),
            alpha_power: self.alpha_power.unwrap_or(d.alpha_power),
            volumetric: self.volumetric.unwrap_or(d.volumetric),
        }
    }
}
