//! texstat-core - Basic data structures for windowed texture statistics
//!
//! This crate provides the data model shared by the statistics engine and
//! its callers:
//!
//! - [`Float4`] - Four-lane RGBA accumulator
//! - [`ImageView`] / [`PixelData`] - Borrowed 2D, array or volumetric RGBA image
//! - [`PixelFormat`] / [`Channel`] - Channel encodings and their decoding
//! - [`Swizzle`] / [`SwizzleSource`] - Output channel remapping
//!
//! # Example
//!
//! ```
//! use texstat_core::{ImageView, Swizzle};
//!
//! let data = vec![128u8; 4 * 8 * 8];
//! let img = ImageView::from_unorm8(8, 8, 1, &data).unwrap();
//! assert_eq!(img.pixel_count(), 64);
//!
//! let swz: Swizzle = "rrr1".parse().unwrap();
//! assert!(!swz.is_identity());
//! ```

pub mod error;
pub mod float4;
pub mod image;
pub mod swizzle;

pub use error::{Error, Result};
pub use float4::Float4;
pub use image::{CHANNELS, Channel, ImageView, PixelData, PixelFormat, decode_texel};
pub use swizzle::{Swizzle, SwizzleSource};
