//! Destinations for per-pixel statistics
//!
//! Workers write their results straight into caller-owned arrays. The arrays
//! are shared by every worker of a run, but each pixel index belongs to
//! exactly one tile, and each tile to exactly one worker, so writes never
//! overlap and need no locking. [`StatsSink`] captures that contract.

use std::marker::PhantomData;

use texstat_core::{Float4, ImageView};

use crate::windowed::PixelStats;
use crate::{FilterError, FilterResult};

/// Receiver of per-pixel statistics, shared by all workers of a run.
pub trait StatsSink: Sync {
    /// Number of pixel slots.
    fn pixel_count(&self) -> usize;

    /// Record the statistics of pixel `index`.
    ///
    /// # Safety
    ///
    /// `index` must be below [`pixel_count`](Self::pixel_count), and no
    /// other call for the same `index` may run concurrently with this one.
    unsafe fn store(&self, index: usize, stats: PixelStats);
}

/// Caller-owned output arrays viewed as a [`StatsSink`].
///
/// Holds the three slices mutably borrowed for `'a`, so nothing else can
/// observe them while a run is writing.
pub struct StatsOutput<'a> {
    averages: *mut Float4,
    variances: *mut Float4,
    alpha_averages: *mut f32,
    len: usize,
    _borrow: PhantomData<&'a mut [Float4]>,
}

// SAFETY: the pointers come from exclusive borrows held for 'a; concurrent
// access goes through `StatsSink::store`, whose contract forbids two
// threads touching the same index.
unsafe impl Send for StatsOutput<'_> {}
unsafe impl Sync for StatsOutput<'_> {}

impl<'a> StatsOutput<'a> {
    /// Wrap three arrays of equal length.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::OutputSizeMismatch` if the lengths differ.
    pub fn new(
        averages: &'a mut [Float4],
        variances: &'a mut [Float4],
        alpha_averages: &'a mut [f32],
    ) -> FilterResult<Self> {
        let len = averages.len();
        for other in [variances.len(), alpha_averages.len()] {
            if other != len {
                return Err(FilterError::OutputSizeMismatch {
                    expected: len,
                    actual: other,
                });
            }
        }

        Ok(StatsOutput {
            averages: averages.as_mut_ptr(),
            variances: variances.as_mut_ptr(),
            alpha_averages: alpha_averages.as_mut_ptr(),
            len,
            _borrow: PhantomData,
        })
    }
}

impl StatsSink for StatsOutput<'_> {
    fn pixel_count(&self) -> usize {
        self.len
    }

    unsafe fn store(&self, index: usize, stats: PixelStats) {
        debug_assert!(index < self.len);
        // SAFETY: in bounds per the caller contract, and the index is not
        // aliased by any concurrent call.
        unsafe {
            self.averages.add(index).write(stats.average);
            self.variances.add(index).write(stats.variance);
            self.alpha_averages.add(index).write(stats.alpha_average);
        }
    }
}

/// Owned statistics for a whole image.
#[derive(Debug, Clone)]
pub struct WindowedStats {
    dims: [usize; 3],
    averages: Vec<Float4>,
    variances: Vec<Float4>,
    alpha_averages: Vec<f32>,
}

impl WindowedStats {
    /// Zero-filled arrays sized for `image`.
    pub fn for_image(image: &ImageView<'_>) -> Self {
        let n = image.pixel_count();
        WindowedStats {
            dims: image.dims(),
            averages: vec![Float4::ZERO; n],
            variances: vec![Float4::ZERO; n],
            alpha_averages: vec![0.0; n],
        }
    }

    /// Sink writing into these arrays.
    pub fn output(&mut self) -> StatsOutput<'_> {
        StatsOutput {
            averages: self.averages.as_mut_ptr(),
            variances: self.variances.as_mut_ptr(),
            alpha_averages: self.alpha_averages.as_mut_ptr(),
            len: self.averages.len(),
            _borrow: PhantomData,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn averages(&self) -> &[Float4] {
        &self.averages
    }

    pub fn variances(&self) -> &[Float4] {
        &self.variances
    }

    pub fn alpha_averages(&self) -> &[f32] {
        &self.alpha_averages
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dims[1] + y) * self.dims[0] + x
    }

    pub fn average(&self, x: usize, y: usize, z: usize) -> Float4 {
        self.averages[self.index(x, y, z)]
    }

    pub fn variance(&self, x: usize, y: usize, z: usize) -> Float4 {
        self.variances[self.index(x, y, z)]
    }

    pub fn alpha_average(&self, x: usize, y: usize, z: usize) -> f32 {
        self.alpha_averages[self.index(x, y, z)]
    }

    /// All three results of one pixel.
    pub fn pixel(&self, x: usize, y: usize, z: usize) -> PixelStats {
        let i = self.index(x, y, z);
        PixelStats {
            average: self.averages[i],
            variance: self.variances[i],
            alpha_average: self.alpha_averages[i],
        }
    }

    /// Consume into `(averages, variances, alpha_averages)`.
    pub fn into_parts(self) -> (Vec<Float4>, Vec<Float4>, Vec<f32>) {
        (self.averages, self.variances, self.alpha_averages)
    }
}
