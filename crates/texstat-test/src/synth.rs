//! Synthetic test images
//!
//! [`SyntheticImage`] owns its pixel buffer and hands out [`ImageView`]s,
//! so tests can build an input in one line and keep it alive for the whole
//! run. Channel values are given as normalized floats and encoded into the
//! requested [`PixelFormat`].

use half::f16;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use texstat_core::{CHANNELS, ImageView, PixelFormat};

use crate::error::TestResult;

/// Owned channel storage for each format.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntheticData {
    Unorm8(Vec<u8>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
}

/// An owned RGBA test image.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticImage {
    dims: [usize; 3],
    data: SyntheticData,
}

fn encode_unorm8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl SyntheticImage {
    /// Build an image by evaluating `f(x, y, z)` at every pixel.
    pub fn from_fn(
        dims: [usize; 3],
        format: PixelFormat,
        mut f: impl FnMut(usize, usize, usize) -> [f32; 4],
    ) -> Self {
        let mut values = Vec::with_capacity(dims[0] * dims[1] * dims[2] * CHANNELS);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    values.extend_from_slice(&f(x, y, z));
                }
            }
        }

        let data = match format {
            PixelFormat::Unorm8 => {
                SyntheticData::Unorm8(values.iter().map(|&v| encode_unorm8(v)).collect())
            }
            PixelFormat::Float16 => {
                SyntheticData::Float16(values.iter().map(|&v| f16::from_f32(v)).collect())
            }
            PixelFormat::Float32 => SyntheticData::Float32(values),
        };
        SyntheticImage { dims, data }
    }

    /// Every pixel set to `color`.
    pub fn uniform(dims: [usize; 3], format: PixelFormat, color: [f32; 4]) -> Self {
        Self::from_fn(dims, format, |_, _, _| color)
    }

    /// Alternating `a` / `b` pixels; `(0, 0, 0)` gets `a`.
    pub fn checkerboard(dims: [usize; 3], format: PixelFormat, a: [f32; 4], b: [f32; 4]) -> Self {
        let pick = move |x: usize, y: usize, z: usize| if (x + y + z) % 2 == 0 { a } else { b };
        Self::from_fn(dims, format, pick)
    }

    /// R ramps along x, G along y, B along z, A is 1.
    pub fn gradient(dims: [usize; 3], format: PixelFormat) -> Self {
        let ramp = |i: usize, n: usize| if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
        Self::from_fn(dims, format, |x, y, z| {
            [ramp(x, dims[0]), ramp(y, dims[1]), ramp(z, dims[2]), 1.0]
        })
    }

    /// Seeded random channels.
    ///
    /// Values are decoded `u8` levels (`k * (1 / 255)` in `f32`), so a
    /// `Float32` image is bit-identical to the decoded `Unorm8` one and
    /// `Float16` differs only by its own rounding.
    pub fn random(dims: [usize; 3], format: PixelFormat, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::from_fn(dims, format, |_, _, _| {
            let mut c = [0.0f32; 4];
            for v in &mut c {
                *v = rng.gen_range(0..=255u8) as f32 * (1.0 / 255.0);
            }
            c
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn format(&self) -> PixelFormat {
        match self.data {
            SyntheticData::Unorm8(_) => PixelFormat::Unorm8,
            SyntheticData::Float16(_) => PixelFormat::Float16,
            SyntheticData::Float32(_) => PixelFormat::Float32,
        }
    }

    pub fn data(&self) -> &SyntheticData {
        &self.data
    }

    /// Borrow as an [`ImageView`].
    pub fn view(&self) -> TestResult<ImageView<'_>> {
        let [x, y, z] = self.dims;
        let view = match &self.data {
            SyntheticData::Unorm8(d) => ImageView::from_unorm8(x, y, z, d)?,
            SyntheticData::Float16(d) => ImageView::from_f16(x, y, z, d)?,
            SyntheticData::Float32(d) => ImageView::from_f32(x, y, z, d)?,
        };
        Ok(view)
    }
}
