//! Padded per-worker scratch planes
//!
//! A [`WorkBuffer`] holds two flattened 3D planes of [`Float4`]: sampled
//! values and their squares. Both are sized once, from the largest tile a
//! run can produce, and then re-shaped for each tile without reallocating.

use texstat_core::Float4;

use crate::{FilterError, FilterResult};

/// Stride-aware index into a flattened `nx * ny * nz` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadIndex {
    nx: usize,
    ny: usize,
    nz: usize,
}

impl PadIndex {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        PadIndex { nx, ny, nz }
    }

    /// Extents as `[x, y, z]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between consecutive y rows.
    #[inline]
    pub fn y_stride(&self) -> usize {
        self.nx
    }

    /// Distance between consecutive z slices.
    #[inline]
    pub fn z_stride(&self) -> usize {
        self.nx * self.ny
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.nx && y < self.ny && z < self.nz);
        z * self.z_stride() + y * self.nx + x
    }
}

/// Value and squared-value planes for one worker.
#[derive(Debug)]
pub struct WorkBuffer {
    index: PadIndex,
    value: Vec<Float4>,
    square: Vec<Float4>,
}

impl WorkBuffer {
    /// Allocate both planes with room for `capacity` cells each.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::AllocationFailed` if the allocator refuses the
    /// request.
    pub fn try_new(capacity: usize) -> FilterResult<Self> {
        let mut value = Vec::new();
        let mut square = Vec::new();
        value
            .try_reserve_exact(capacity)
            .and_then(|_| square.try_reserve_exact(capacity))
            .map_err(|_| FilterError::AllocationFailed {
                cells: capacity.saturating_mul(2),
            })?;
        value.resize(capacity, Float4::ZERO);
        square.resize(capacity, Float4::ZERO);

        Ok(WorkBuffer {
            index: PadIndex::new(0, 0, 0),
            value,
            square,
        })
    }

    /// Cells available per plane.
    pub fn capacity(&self) -> usize {
        self.value.len()
    }

    /// Set the padded extents for the next tile.
    ///
    /// # Panics
    ///
    /// Panics if the box does not fit in the allocated capacity; the
    /// scheduler sizes buffers from the largest tile, so this is a logic
    /// error.
    pub fn reshape(&mut self, index: PadIndex) {
        assert!(
            index.len() <= self.capacity(),
            "padded tile {:?} exceeds work buffer capacity {}",
            index.dims(),
            self.capacity()
        );
        self.index = index;
    }

    #[inline]
    pub fn index(&self) -> PadIndex {
        self.index
    }

    #[inline]
    pub fn value(&self) -> &[Float4] {
        &self.value[..self.index.len()]
    }

    #[inline]
    pub fn square(&self) -> &[Float4] {
        &self.square[..self.index.len()]
    }

    /// Both planes, mutably, trimmed to the current shape.
    #[inline]
    pub fn planes_mut(&mut self) -> (&mut [Float4], &mut [Float4]) {
        let n = self.index.len();
        (&mut self.value[..n], &mut self.square[..n])
    }

    /// Write one cell of both planes.
    #[inline]
    pub fn store(&mut self, x: usize, y: usize, z: usize, v: Float4) {
        let i = self.index.at(x, y, z);
        self.value[i] = v;
        self.square[i] = v * v;
    }
}
