//! Windowed average, variance and alpha average from summed-area tables
//!
//! For each pixel of a tile two windows are centred on it: the stats window
//! (`stats_radius`) yields the RGBA average and variance, the alpha window
//! (`alpha_radius`) yields the alpha average. The buffer apron is sized by
//! the larger radius, so the smaller window simply uses an inner box.
//!
//! Variance is the unbiased estimator rearranged to avoid forming
//! `E[X^2] - E[X]^2` in separate divisions:
//!
//! ```text
//! mul1 = 1 / (N * (N - 1))
//! mul2 = N * mul1
//! var  = mul2 * sum(x^2) - mul1 * sum(x)^2
//! ```
//!
//! With `N == 1` (radius 0) the variance is exactly zero.

use texstat_core::{Float4, ImageView};

use crate::buffer::WorkBuffer;
use crate::config::KernelSpec;
use crate::geometry::Tile;
use crate::sat::{SatWindow, box_sum, box_sum4};

/// Statistics of one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelStats {
    /// Mean of the stats window, per channel
    pub average: Float4,
    /// Unbiased variance of the stats window, per channel
    pub variance: Float4,
    /// Mean alpha of the alpha window
    pub alpha_average: f32,
}

/// Normalization constants derived from the window sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceScale {
    samples: f32,
    rsamples: f32,
    alpha_rsamples: f32,
    mul1: f32,
    mul2: f32,
}

impl VarianceScale {
    pub fn new(spec: &KernelSpec) -> Self {
        let axes = if spec.volumetric { 3 } else { 2 };
        let count = |radius: u32| (2.0 * radius as f64 + 1.0).powi(axes);

        let samples = count(spec.stats_radius);
        let mul1 = if samples == 1.0 {
            1.0
        } else {
            1.0 / (samples * (samples - 1.0))
        };

        VarianceScale {
            samples: samples as f32,
            rsamples: (1.0 / samples) as f32,
            alpha_rsamples: (1.0 / count(spec.alpha_radius)) as f32,
            mul1: mul1 as f32,
            mul2: (samples * mul1) as f32,
        }
    }

    /// Samples in the stats window.
    pub fn samples(&self) -> f32 {
        self.samples
    }

    #[inline]
    pub fn average(&self, sum: Float4) -> Float4 {
        sum * self.rsamples
    }

    #[inline]
    pub fn alpha_average(&self, alpha_sum: f32) -> f32 {
        alpha_sum * self.alpha_rsamples
    }

    #[inline]
    pub fn variance(&self, sum: Float4, sum_sq: Float4) -> Float4 {
        if self.samples == 1.0 {
            return Float4::ZERO;
        }
        self.mul2 * sum_sq - self.mul1 * (sum * sum)
    }
}

/// Window bounds along one padded axis of length `n` for a tile-local
/// coordinate, as `(exclusive low, inclusive high)`.
///
/// Cell `local + radius_max + 1` holds the pixel itself.
#[inline]
fn axis_window(local: usize, radius_max: usize, radius: usize, n: usize) -> (usize, usize) {
    let lo = local + radius_max - radius;
    let hi = local + radius_max + radius + 1;
    (lo.min(n - 1), hi.min(n - 1))
}

fn window_at(
    local: [usize; 3],
    radius_max: usize,
    radius: usize,
    dims: [usize; 3],
    volumetric: bool,
) -> SatWindow {
    let (lx, hx) = axis_window(local[0], radius_max, radius, dims[0]);
    let (ly, hy) = axis_window(local[1], radius_max, radius, dims[1]);
    let (lz, hz) = if volumetric {
        axis_window(local[2], radius_max, radius, dims[2])
    } else {
        (local[2], local[2])
    };
    SatWindow {
        lo: [lx, ly, lz],
        hi: [hx, hy, hz],
    }
}

/// Evaluate every pixel of `tile` from the tables in `buf`.
///
/// `emit` receives the pixel's linear index in `image` and its statistics,
/// once per pixel. `buf` must hold the tables built for this tile.
pub fn extract_tile_stats(
    buf: &WorkBuffer,
    tile: &Tile,
    spec: &KernelSpec,
    scale: &VarianceScale,
    image: &ImageView<'_>,
    mut emit: impl FnMut(usize, PixelStats),
) {
    let idx = buf.index();
    let dims = idx.dims();
    let value = buf.value();
    let square = buf.square();
    let vol = spec.volumetric;
    let r = spec.kernel_radius() as usize;
    let rs = spec.stats_radius as usize;
    let ra = spec.alpha_radius as usize;
    let [ox, oy, oz] = tile.offset;

    for z in 0..tile.extent[2] {
        for y in 0..tile.extent[1] {
            for x in 0..tile.extent[0] {
                let local = [x, y, z];

                let aw = window_at(local, r, ra, dims, vol);
                let alpha_sum = box_sum(idx, &aw, vol, |i| value[i].a);

                let sw = window_at(local, r, rs, dims, vol);
                let sum = box_sum4(value, idx, &sw, vol);
                let sum_sq = box_sum4(square, idx, &sw, vol);

                let index = image.pixel_index(ox + x, oy + y, oz + z);
                emit(
                    index,
                    PixelStats {
                        average: scale.average(sum),
                        variance: scale.variance(sum, sum_sq),
                        alpha_average: scale.alpha_average(alpha_sum),
                    },
                );
            }
        }
    }
}
