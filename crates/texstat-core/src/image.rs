//! ImageView - borrowed RGBA image data
//!
//! The statistics engine never owns or allocates images. An `ImageView`
//! wraps a caller-owned, contiguous, channel-interleaved RGBA buffer in one
//! of three channel encodings and answers "what are the four channels of
//! pixel (x, y, z)".
//!
//! # Memory Layout
//!
//! Pixels are row-major with slices stacked along z and no padding. Channel
//! `c` of pixel `(x, y, z)` is at `4 * (z * dim_x * dim_y + y * dim_x + x) + c`.

use crate::error::{Error, Result};
use crate::float4::Float4;
use half::f16;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 4;

/// Channel encoding of the source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit unsigned normalized, 0..=255 maps to 0.0..=1.0
    Unorm8,
    /// IEEE 754 half precision
    Float16,
    /// IEEE 754 single precision
    Float32,
}

/// A raw channel value that decodes to `f32`.
///
/// This is the only format-specific operation the sampler needs; everything
/// downstream works on decoded [`Float4`] values.
pub trait Channel: Copy + Send + Sync + 'static {
    /// Decode to a linear float (`u8` is normalized to `[0, 1]`).
    fn to_f32(self) -> f32;
}

impl Channel for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 * (1.0 / 255.0)
    }
}

impl Channel for f16 {
    #[inline]
    fn to_f32(self) -> f32 {
        f16::to_f32(self)
    }
}

impl Channel for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

/// Decode four consecutive channels starting at `base`.
#[inline]
pub fn decode_texel<C: Channel>(data: &[C], base: usize) -> Float4 {
    Float4::new(
        data[base].to_f32(),
        data[base + 1].to_f32(),
        data[base + 2].to_f32(),
        data[base + 3].to_f32(),
    )
}

/// Borrowed pixel buffer tagged with its encoding
#[derive(Debug, Clone, Copy)]
pub enum PixelData<'a> {
    Unorm8(&'a [u8]),
    Float16(&'a [f16]),
    Float32(&'a [f32]),
}

impl PixelData<'_> {
    /// Encoding of this buffer.
    pub fn format(&self) -> PixelFormat {
        match self {
            PixelData::Unorm8(_) => PixelFormat::Unorm8,
            PixelData::Float16(_) => PixelFormat::Float16,
            PixelData::Float32(_) => PixelFormat::Float32,
        }
    }

    /// Number of channel values in the buffer.
    pub fn len(&self) -> usize {
        match self {
            PixelData::Unorm8(d) => d.len(),
            PixelData::Float16(d) => d.len(),
            PixelData::Float32(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view of a 2D, array or volumetric RGBA image.
///
/// `dim_z == 1` is a plain 2D image. Whether a deeper image is treated as a
/// volume or as a stack of independent slices is decided by the consumer.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    dim_x: usize,
    dim_y: usize,
    dim_z: usize,
    data: PixelData<'a>,
}

impl<'a> ImageView<'a> {
    /// Wrap a tagged pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if any dimension is 0, and
    /// `Error::DataLength` if `data` does not hold exactly
    /// `4 * dim_x * dim_y * dim_z` channel values.
    pub fn new(dim_x: usize, dim_y: usize, dim_z: usize, data: PixelData<'a>) -> Result<Self> {
        if dim_x == 0 || dim_y == 0 || dim_z == 0 {
            return Err(Error::InvalidDimension {
                x: dim_x,
                y: dim_y,
                z: dim_z,
            });
        }

        let expected = dim_x
            .checked_mul(dim_y)
            .and_then(|n| n.checked_mul(dim_z))
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(Error::InvalidDimension {
                x: dim_x,
                y: dim_y,
                z: dim_z,
            })?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(ImageView {
            dim_x,
            dim_y,
            dim_z,
            data,
        })
    }

    /// View over 8-bit unorm RGBA data.
    pub fn from_unorm8(dim_x: usize, dim_y: usize, dim_z: usize, data: &'a [u8]) -> Result<Self> {
        Self::new(dim_x, dim_y, dim_z, PixelData::Unorm8(data))
    }

    /// View over half-float RGBA data.
    pub fn from_f16(dim_x: usize, dim_y: usize, dim_z: usize, data: &'a [f16]) -> Result<Self> {
        Self::new(dim_x, dim_y, dim_z, PixelData::Float16(data))
    }

    /// View over single-float RGBA data.
    pub fn from_f32(dim_x: usize, dim_y: usize, dim_z: usize, data: &'a [f32]) -> Result<Self> {
        Self::new(dim_x, dim_y, dim_z, PixelData::Float32(data))
    }

    #[inline]
    pub fn dim_x(&self) -> usize {
        self.dim_x
    }

    #[inline]
    pub fn dim_y(&self) -> usize {
        self.dim_y
    }

    #[inline]
    pub fn dim_z(&self) -> usize {
        self.dim_z
    }

    /// Dimensions as `[x, y, z]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        [self.dim_x, self.dim_y, self.dim_z]
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.dim_x * self.dim_y * self.dim_z
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.data.format()
    }

    #[inline]
    pub fn data(&self) -> PixelData<'a> {
        self.data
    }

    /// Linear pixel index of `(x, y, z)`; this is also the output index.
    #[inline]
    pub fn pixel_index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dim_y + y) * self.dim_x + x
    }

    /// Decoded channels of one pixel, without swizzle.
    ///
    /// Coordinates must be in range.
    pub fn texel(&self, x: usize, y: usize, z: usize) -> Float4 {
        let base = self.pixel_index(x, y, z) * CHANNELS;
        match self.data {
            PixelData::Unorm8(d) => decode_texel(d, base),
            PixelData::Float16(d) => decode_texel(d, base),
            PixelData::Float32(d) => decode_texel(d, base),
        }
    }
}
