//! Brute-force reference for windowed statistics
//!
//! Walks every window pixel by pixel in `f64`, clamping coordinates to the
//! image edge. Slow, but independent of tiling and summed-area tables, so
//! it is the yardstick the fast path is measured against.

use texstat_core::{Float4, ImageView, Swizzle};

/// Floor applied before a non-linear exponent, matching the sampler.
pub const REFERENCE_POWER_FLOOR: f32 = 1e-6;

/// Window and response parameters for [`reference_windowed_stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceKernel {
    pub stats_radius: usize,
    pub alpha_radius: usize,
    pub rgb_power: f32,
    pub alpha_power: f32,
    pub volumetric: bool,
}

impl ReferenceKernel {
    /// Linear 2D kernel with the given radii.
    pub fn new(stats_radius: usize, alpha_radius: usize) -> Self {
        ReferenceKernel {
            stats_radius,
            alpha_radius,
            rgb_power: 1.0,
            alpha_power: 1.0,
            volumetric: false,
        }
    }

    pub fn volumetric(mut self, volumetric: bool) -> Self {
        self.volumetric = volumetric;
        self
    }

    pub fn powers(mut self, rgb: f32, alpha: f32) -> Self {
        self.rgb_power = rgb;
        self.alpha_power = alpha;
        self
    }
}

/// Reference results, one entry per pixel.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStats {
    pub average: Vec<[f64; 4]>,
    pub variance: Vec<[f64; 4]>,
    pub alpha_average: Vec<f64>,
}

impl ReferenceStats {
    /// Average of pixel `i` narrowed to [`Float4`].
    pub fn average4(&self, i: usize) -> Float4 {
        let [r, g, b, a] = self.average[i];
        Float4::new(r as f32, g as f32, b as f32, a as f32)
    }

    /// Variance of pixel `i` narrowed to [`Float4`].
    pub fn variance4(&self, i: usize) -> Float4 {
        let [r, g, b, a] = self.variance[i];
        Float4::new(r as f32, g as f32, b as f32, a as f32)
    }
}

/// Sampled value of every pixel after swizzle and response curve.
fn prepared_texels(
    image: &ImageView<'_>,
    swizzle: &Swizzle,
    kernel: &ReferenceKernel,
) -> Vec<[f64; 4]> {
    let linear = kernel.rgb_power == 1.0 && kernel.alpha_power == 1.0;
    let [dx, dy, dz] = image.dims();
    let mut out = Vec::with_capacity(image.pixel_count());
    for z in 0..dz {
        for y in 0..dy {
            for x in 0..dx {
                let mut t = swizzle.apply(image.texel(x, y, z));
                if !linear {
                    let p = |v: f32, e: f32| v.max(REFERENCE_POWER_FLOOR).powf(e);
                    t = Float4::new(
                        p(t.r, kernel.rgb_power),
                        p(t.g, kernel.rgb_power),
                        p(t.b, kernel.rgb_power),
                        p(t.a, kernel.alpha_power),
                    );
                }
                out.push(t.to_array().map(f64::from));
            }
        }
    }
    out
}

fn clamped(i: usize, d: isize, n: usize) -> usize {
    (i as isize + d).clamp(0, n as isize - 1) as usize
}

/// Visit every clamped source index of the window of `radius` at `(x, y, z)`.
fn for_window(
    dims: [usize; 3],
    at: [usize; 3],
    radius: usize,
    volumetric: bool,
    mut visit: impl FnMut(usize),
) {
    let r = radius as isize;
    let rz = if volumetric { r } else { 0 };
    for dz in -rz..=rz {
        let z = clamped(at[2], dz, dims[2]);
        for dy in -r..=r {
            let y = clamped(at[1], dy, dims[1]);
            for dx in -r..=r {
                let x = clamped(at[0], dx, dims[0]);
                visit((z * dims[1] + y) * dims[0] + x);
            }
        }
    }
}

/// Compute average, unbiased variance and alpha average for every pixel.
pub fn reference_windowed_stats(
    image: &ImageView<'_>,
    swizzle: &Swizzle,
    kernel: &ReferenceKernel,
) -> ReferenceStats {
    let texels = prepared_texels(image, swizzle, kernel);
    let dims = image.dims();
    let mut stats = ReferenceStats::default();

    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let mut sum = [0.0f64; 4];
                let mut sum_sq = [0.0f64; 4];
                let mut n = 0usize;
                for_window(dims, [x, y, z], kernel.stats_radius, kernel.volumetric, |i| {
                    for c in 0..4 {
                        sum[c] += texels[i][c];
                        sum_sq[c] += texels[i][c] * texels[i][c];
                    }
                    n += 1;
                });

                let nf = n as f64;
                let average = sum.map(|s| s / nf);
                let mut variance = [0.0f64; 4];
                if n > 1 {
                    for c in 0..4 {
                        variance[c] = (sum_sq[c] - sum[c] * sum[c] / nf) / (nf - 1.0);
                    }
                }

                let mut alpha = 0.0f64;
                let mut na = 0usize;
                for_window(dims, [x, y, z], kernel.alpha_radius, kernel.volumetric, |i| {
                    alpha += texels[i][3];
                    na += 1;
                });

                stats.average.push(average);
                stats.variance.push(variance);
                stats.alpha_average.push(alpha / na as f64);
            }
        }
    }
    stats
}
