//! Tile sampling into padded work planes
//!
//! Fills a [`WorkBuffer`] with the tile plus an apron of `kernel_radius`
//! pixels on each side of every active axis. Source coordinates outside the
//! image are clamped to the nearest edge pixel, so windows near the border
//! see replicated edge values rather than zeros. Index 0 along each padded
//! axis is left as the zero origin of the summed-area table.

use texstat_core::{CHANNELS, Channel, Float4, ImageView, PixelData, Swizzle, decode_texel};

use crate::buffer::WorkBuffer;
use crate::config::KernelSpec;
use crate::geometry::Tile;

/// Smallest base fed to `powf`; keeps fractional exponents away from
/// non-positive inputs.
pub const POWER_FLOOR: f32 = 1e-6;

/// Power-law response applied after swizzle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseCurve {
    pub rgb: f32,
    pub alpha: f32,
}

impl ResponseCurve {
    /// `None` when both exponents are 1.0.
    pub fn from_spec(spec: &KernelSpec) -> Option<Self> {
        (!spec.is_linear()).then_some(ResponseCurve {
            rgb: spec.rgb_power,
            alpha: spec.alpha_power,
        })
    }

    #[inline]
    pub fn apply(&self, v: Float4) -> Float4 {
        Float4::new(
            v.r.max(POWER_FLOOR).powf(self.rgb),
            v.g.max(POWER_FLOOR).powf(self.rgb),
            v.b.max(POWER_FLOOR).powf(self.rgb),
            v.a.max(POWER_FLOOR).powf(self.alpha),
        )
    }
}

#[inline]
fn clamp_coord(i: isize, dim: usize) -> usize {
    i.clamp(0, dim as isize - 1) as usize
}

/// Sample `tile` of `image` into both planes of `buf`.
///
/// The buffer is reshaped to `tile.padded(spec.kernel_radius(),
/// spec.volumetric)` and must have been allocated large enough for it.
pub fn sample_tile(
    image: &ImageView<'_>,
    tile: &Tile,
    spec: &KernelSpec,
    swizzle: &Swizzle,
    buf: &mut WorkBuffer,
) {
    let radius = spec.kernel_radius() as usize;
    buf.reshape(tile.padded(radius, spec.volumetric));

    let sampler = TexelSampler {
        image,
        tile,
        radius,
        volumetric: spec.volumetric,
        swizzle: (!swizzle.is_identity()).then_some(*swizzle),
        curve: ResponseCurve::from_spec(spec),
    };

    match image.data() {
        PixelData::Unorm8(d) => sampler.fill(d, buf),
        PixelData::Float16(d) => sampler.fill(d, buf),
        PixelData::Float32(d) => sampler.fill(d, buf),
    }

    zero_origin(buf, spec.volumetric);
}

struct TexelSampler<'s, 'a> {
    image: &'s ImageView<'a>,
    tile: &'s Tile,
    radius: usize,
    volumetric: bool,
    swizzle: Option<Swizzle>,
    curve: Option<ResponseCurve>,
}

impl TexelSampler<'_, '_> {
    fn fill<C: Channel>(&self, data: &[C], buf: &mut WorkBuffer) {
        let [nx, ny, nz] = buf.index().dims();
        let [dim_x, dim_y, dim_z] = self.image.dims();
        let [ox, oy, oz] = self.tile.offset.map(|o| o as isize);
        let r = self.radius as isize;
        let (z_start, rz) = if self.volumetric { (1, r) } else { (0, 0) };

        for z in z_start..nz {
            let zs = clamp_coord((z - z_start) as isize + oz - rz, dim_z);
            for y in 1..ny {
                let ys = clamp_coord((y - 1) as isize + oy - r, dim_y);
                for x in 1..nx {
                    let xs = clamp_coord((x - 1) as isize + ox - r, dim_x);

                    let base = self.image.pixel_index(xs, ys, zs) * CHANNELS;
                    let mut v = decode_texel(data, base);
                    if let Some(swz) = &self.swizzle {
                        v = swz.apply(v);
                    }
                    if let Some(curve) = &self.curve {
                        v = curve.apply(v);
                    }
                    buf.store(x, y, z, v);
                }
            }
        }
    }
}

/// Zero the first layer of each padded axis in both planes.
fn zero_origin(buf: &mut WorkBuffer, volumetric: bool) {
    let idx = buf.index();
    let [nx, ny, nz] = idx.dims();
    let (value, square) = buf.planes_mut();

    for plane in [value, square] {
        for z in 0..nz {
            for y in 0..ny {
                plane[idx.at(0, y, z)] = Float4::ZERO;
            }
            for x in 0..nx {
                plane[idx.at(x, 0, z)] = Float4::ZERO;
            }
        }
        if volumetric {
            for y in 0..ny {
                for x in 0..nx {
                    plane[idx.at(x, y, 0)] = Float4::ZERO;
                }
            }
        }
    }
}
