//! Summed-area tables over the work planes
//!
//! After [`build_summed_area_tables`], cell `(x, y, z)` of each plane holds
//! the sum of every sampled cell in the box from the origin to `(x, y, z)`
//! inclusive. Any axis-aligned box sum is then a fixed number of corner
//! lookups: 4 for a 2D slice, 8 for a volume.

use std::ops::{Add, Sub};

use texstat_core::Float4;

use crate::buffer::{PadIndex, WorkBuffer};
use crate::prefix_sum::brent_kung_prefix_sum;

/// Integrate both planes in place: along x, then y, then z if volumetric.
///
/// Without `volumetric`, every z slice becomes an independent 2D table.
pub fn build_summed_area_tables(buf: &mut WorkBuffer, volumetric: bool) {
    let idx = buf.index();
    let [nx, ny, nz] = idx.dims();
    let z_start = usize::from(volumetric);
    let (value, square) = buf.planes_mut();

    for plane in [value, square] {
        for z in z_start..nz {
            for y in 1..ny {
                brent_kung_prefix_sum(plane, idx.at(1, y, z), nx - 1, 1);
            }
        }

        for z in z_start..nz {
            for x in 1..nx {
                brent_kung_prefix_sum(plane, idx.at(x, 1, z), ny - 1, idx.y_stride());
            }
        }

        if volumetric {
            for y in 1..ny {
                for x in 1..nx {
                    brent_kung_prefix_sum(plane, idx.at(x, y, 1), nz - 1, idx.z_stride());
                }
            }
        }
    }
}

/// A box in table coordinates.
///
/// `lo` is the exclusive corner (one cell before the first summed cell) and
/// `hi` the inclusive corner. For a 2D window `lo[2] == hi[2]` names the
/// slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SatWindow {
    pub lo: [usize; 3],
    pub hi: [usize; 3],
}

/// Sum of the box `window` through corner inclusion/exclusion.
///
/// `get` reads one table cell by flat index; it may project a lane out of
/// a [`Float4`] when only one channel is needed.
#[inline]
pub fn box_sum<T, F>(idx: PadIndex, window: &SatWindow, volumetric: bool, get: F) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T>,
    F: Fn(usize) -> T,
{
    let [lx, ly, lz] = window.lo;
    let [hx, hy, hz] = window.hi;

    let rect = |z: usize| -> T {
        get(idx.at(hx, hy, z)) - get(idx.at(lx, hy, z)) - get(idx.at(hx, ly, z))
            + get(idx.at(lx, ly, z))
    };

    if volumetric {
        rect(hz) - rect(lz)
    } else {
        rect(hz)
    }
}

/// [`box_sum`] over a whole plane of [`Float4`].
#[inline]
pub fn box_sum4(plane: &[Float4], idx: PadIndex, window: &SatWindow, volumetric: bool) -> Float4 {
    box_sum(idx, window, volumetric, |i| plane[i])
}
