//! Tile geometry for one statistics run
//!
//! The image is cut into tiles no larger than [`MAX_TILE_XY_2D`] squared
//! (2D and array images) or [`MAX_TILE_XYZ_3D`] cubed (volumes), so the
//! padded work buffer has a bounded size whatever the image size. A work
//! unit is one row of tiles: a fixed `(tile_y, tile_z)` with every tile
//! along x. Units are numbered with y fastest, then z.

use crate::buffer::PadIndex;
use crate::config::KernelSpec;
use crate::{FilterError, FilterResult};

/// Largest tile edge along x and y for 2D and array images.
pub const MAX_TILE_XY_2D: usize = 32;

/// Largest tile edge along every axis for volumetric images.
pub const MAX_TILE_XYZ_3D: usize = 16;

/// A box of image pixels processed in one sample/build/extract cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// First pixel of the tile, `[x, y, z]`.
    pub offset: [usize; 3],
    /// Tile size, `[x, y, z]`; every component is at least 1.
    pub extent: [usize; 3],
}

impl Tile {
    /// Padded buffer shape for this tile.
    ///
    /// Each active axis grows by `2 * radius` apron cells plus one zero
    /// origin cell. Without `volumetric`, z is not padded and each slice
    /// is summed on its own.
    pub fn padded(&self, radius: usize, volumetric: bool) -> PadIndex {
        let grow = 2 * radius + 1;
        PadIndex::new(
            self.extent[0] + grow,
            self.extent[1] + grow,
            self.extent[2] + if volumetric { grow } else { 0 },
        )
    }

    /// Cell count of [`Tile::padded`], or `None` if it does not fit in
    /// `usize`.
    pub fn padded_len(&self, radius: usize, volumetric: bool) -> Option<usize> {
        let grow = radius.checked_mul(2)?.checked_add(1)?;
        let nx = self.extent[0].checked_add(grow)?;
        let ny = self.extent[1].checked_add(grow)?;
        let nz = if volumetric {
            self.extent[2].checked_add(grow)?
        } else {
            self.extent[2]
        };
        nx.checked_mul(ny)?.checked_mul(nz)
    }

    pub fn pixel_count(&self) -> usize {
        self.extent[0] * self.extent[1] * self.extent[2]
    }
}

/// Tiling of one image for one [`KernelSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    image_dims: [usize; 3],
    kernel_radius: usize,
    volumetric: bool,
    tile_size: [usize; 3],
    tile_counts: [usize; 3],
    total_units: usize,
    buffer_cells: usize,
}

impl TileGeometry {
    /// Compute the tiling of an image with dimensions `dims`.
    ///
    /// `dims` must all be at least 1.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::AllocationFailed` if the padded buffer for the
    /// largest tile has more cells than `usize` can count.
    pub fn new(dims: [usize; 3], spec: &KernelSpec) -> FilterResult<Self> {
        let kernel_radius = spec.kernel_radius() as usize;
        let volumetric = spec.volumetric;

        let (cap_xy, cap_z) = if volumetric {
            (MAX_TILE_XYZ_3D, MAX_TILE_XYZ_3D)
        } else {
            (MAX_TILE_XY_2D, 1)
        };
        let tile_size = [cap_xy.min(dims[0]), cap_xy.min(dims[1]), cap_z.min(dims[2])];
        let tile_counts = [
            dims[0].div_ceil(tile_size[0]),
            dims[1].div_ceil(tile_size[1]),
            dims[2].div_ceil(tile_size[2]),
        ];

        let largest = Tile {
            offset: [0; 3],
            extent: tile_size,
        };
        // Every tile fits inside the largest one, so per-tile shapes never
        // overflow once this count does not.
        let buffer_cells = largest
            .padded_len(kernel_radius, volumetric)
            .ok_or(FilterError::AllocationFailed { cells: usize::MAX })?;

        Ok(TileGeometry {
            image_dims: dims,
            kernel_radius,
            volumetric,
            tile_size,
            tile_counts,
            total_units: tile_counts[1] * tile_counts[2],
            buffer_cells,
        })
    }

    pub fn image_dims(&self) -> [usize; 3] {
        self.image_dims
    }

    /// Combined window radius, `max(stats_radius, alpha_radius)`.
    pub fn kernel_radius(&self) -> usize {
        self.kernel_radius
    }

    pub fn volumetric(&self) -> bool {
        self.volumetric
    }

    /// Nominal tile extents; edge tiles may be smaller.
    pub fn tile_size(&self) -> [usize; 3] {
        self.tile_size
    }

    /// Number of tiles along each axis.
    pub fn tile_counts(&self) -> [usize; 3] {
        self.tile_counts
    }

    /// Number of claimable work units.
    pub fn total_units(&self) -> usize {
        self.total_units
    }

    /// Cells per plane a work buffer needs for the largest tile.
    pub fn buffer_cells(&self) -> usize {
        self.buffer_cells
    }

    /// Tile row coordinates `(tile_y, tile_z)` of a unit.
    pub fn unit_row(&self, unit: usize) -> (usize, usize) {
        let tiles_y = self.tile_counts[1];
        (unit % tiles_y, unit / tiles_y)
    }

    /// Tiles of one unit, left to right.
    pub fn unit_tiles(&self, unit: usize) -> impl Iterator<Item = Tile> + '_ {
        debug_assert!(unit < self.total_units);
        let (ty, tz) = self.unit_row(unit);
        let oy = ty * self.tile_size[1];
        let oz = tz * self.tile_size[2];
        let ey = self.tile_size[1].min(self.image_dims[1] - oy);
        let ez = self.tile_size[2].min(self.image_dims[2] - oz);

        (0..self.tile_counts[0]).map(move |tx| {
            let ox = tx * self.tile_size[0];
            Tile {
                offset: [ox, oy, oz],
                extent: [self.tile_size[0].min(self.image_dims[0] - ox), ey, ez],
            }
        })
    }
}
