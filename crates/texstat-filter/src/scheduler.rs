//! Lock-free tile scheduling
//!
//! A run is set up once with [`StatsScheduler::begin`], which computes the
//! tiling and the number of work units. Any number of threads then call
//! [`StatsScheduler::run`] on the same scheduler. Each call allocates one
//! work buffer and loops: claim a unit, sample, integrate and evaluate each
//! tile of that unit, write the results, repeat until no unit is left.
//!
//! The cursor is the only shared mutable state. Output writes target
//! disjoint pixel ranges, so no lock is taken anywhere.
//!
//! # Example
//!
//! ```
//! use texstat_core::{Float4, ImageView, Swizzle};
//! use texstat_filter::{KernelSpec, StatsOutput, StatsScheduler};
//!
//! let data = vec![0.5f32; 4 * 64 * 48];
//! let img = ImageView::from_f32(64, 48, 1, &data).unwrap();
//! let spec = KernelSpec::builder().radius(2).build();
//!
//! let mut averages = vec![Float4::ZERO; img.pixel_count()];
//! let mut variances = vec![Float4::ZERO; img.pixel_count()];
//! let mut alpha = vec![0.0f32; img.pixel_count()];
//! let mut out = StatsOutput::new(&mut averages, &mut variances, &mut alpha).unwrap();
//!
//! let sched = StatsScheduler::begin(&img, spec, Swizzle::IDENTITY, &mut out).unwrap();
//! assert_eq!(sched.total_units(), 2);
//! std::thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| sched.run().unwrap());
//!     }
//! });
//! assert!(sched.is_complete());
//! drop(sched);
//!
//! assert!((averages[100].g - 0.5).abs() < 1e-6);
//! ```

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use texstat_core::{ImageView, Swizzle};
use tracing::{debug, trace};

use crate::buffer::WorkBuffer;
use crate::config::KernelSpec;
use crate::geometry::TileGeometry;
use crate::output::StatsSink;
use crate::sampler::sample_tile;
use crate::sat::build_summed_area_tables;
use crate::windowed::{VarianceScale, extract_tile_stats};
use crate::{FilterError, FilterResult};

/// Units granted by one [`WorkCursor::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// First granted unit.
    pub base: usize,
    /// Number of granted units; 0 once the cursor is drained.
    pub count: usize,
}

impl Claim {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn units(&self) -> Range<usize> {
        self.base..self.base + self.count
    }
}

/// Atomic unit counter for one run.
///
/// Claims never overshoot the total, so a drained cursor stays drained no
/// matter how many more claims are attempted. Reuse requires [`reset`],
/// which takes `&mut self` and therefore cannot race with workers.
///
/// [`reset`]: WorkCursor::reset
#[derive(Debug)]
pub struct WorkCursor {
    next: AtomicUsize,
    done: AtomicUsize,
    total: usize,
}

impl WorkCursor {
    pub fn new(total: usize) -> Self {
        WorkCursor {
            next: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Reserve up to `granule` units (at least one is requested).
    pub fn claim(&self, granule: usize) -> Claim {
        let granule = granule.max(1);
        let total = self.total;
        let reserved = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |cur| {
                (cur < total).then(|| cur + granule.min(total - cur))
            });

        match reserved {
            Ok(base) => Claim {
                base,
                count: granule.min(total - base),
            },
            Err(_) => Claim {
                base: total,
                count: 0,
            },
        }
    }

    /// Record `count` claimed units as fully written.
    pub fn complete(&self, count: usize) {
        self.done.fetch_add(count, Ordering::Release);
    }

    /// `(completed units, total units)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.done.load(Ordering::Acquire), self.total)
    }

    /// No unit is left to claim.
    pub fn is_drained(&self) -> bool {
        self.next.load(Ordering::Relaxed) >= self.total
    }

    /// Every unit has been claimed and completed.
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire) >= self.total
    }

    /// Rewind for another run over the same units.
    pub fn reset(&mut self) {
        *self.next.get_mut() = 0;
        *self.done.get_mut() = 0;
    }
}

/// Shared state of one statistics run.
pub struct StatsScheduler<'a, S: StatsSink> {
    image: ImageView<'a>,
    spec: KernelSpec,
    swizzle: Swizzle,
    geometry: TileGeometry,
    scale: VarianceScale,
    cursor: WorkCursor,
    sink: &'a mut S,
}

impl<'a, S: StatsSink> StatsScheduler<'a, S> {
    /// Set up a run over `image`, writing into `sink`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidParameters` if `spec` fails
    /// [`KernelSpec::validate`], `FilterError::OutputSizeMismatch` if the
    /// sink is not sized to the image pixel count, and
    /// `FilterError::AllocationFailed` if the kernel radius makes the work
    /// buffer size overflow.
    pub fn begin(
        image: &ImageView<'a>,
        spec: KernelSpec,
        swizzle: Swizzle,
        sink: &'a mut S,
    ) -> FilterResult<Self> {
        spec.validate()?;
        if sink.pixel_count() != image.pixel_count() {
            return Err(FilterError::OutputSizeMismatch {
                expected: image.pixel_count(),
                actual: sink.pixel_count(),
            });
        }

        let geometry = TileGeometry::new(image.dims(), &spec)?;
        debug!(
            dims = ?image.dims(),
            format = ?image.format(),
            kernel_radius = geometry.kernel_radius(),
            tile_size = ?geometry.tile_size(),
            total_units = geometry.total_units(),
            buffer_cells = geometry.buffer_cells(),
            %swizzle,
            "windowed stats run configured"
        );

        Ok(StatsScheduler {
            image: *image,
            spec,
            swizzle,
            geometry,
            scale: VarianceScale::new(&spec),
            cursor: WorkCursor::new(geometry.total_units()),
            sink,
        })
    }

    /// Number of claimable work units.
    pub fn total_units(&self) -> usize {
        self.geometry.total_units()
    }

    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    pub fn spec(&self) -> &KernelSpec {
        &self.spec
    }

    pub fn cursor(&self) -> &WorkCursor {
        &self.cursor
    }

    /// Every unit has been written.
    pub fn is_complete(&self) -> bool {
        self.cursor.is_complete()
    }

    /// Rewind the cursor so the whole image is processed again.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    /// Worker loop: process units until none is left.
    ///
    /// Returns the number of units this call processed.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::AllocationFailed` if the work buffer cannot be
    /// allocated; no unit is claimed in that case.
    pub fn run(&self) -> FilterResult<usize> {
        self.run_while(|| true)
    }

    /// Worker loop that asks `keep_going` before every claim.
    ///
    /// Returning false stops this worker between units. Units never
    /// claimed stay unwritten.
    pub fn run_while(&self, mut keep_going: impl FnMut() -> bool) -> FilterResult<usize> {
        let _span = tracing::info_span!("windowed_stats").entered();
        let mut buf = WorkBuffer::try_new(self.geometry.buffer_cells())?;

        let mut processed = 0;
        while keep_going() {
            let claim = self.cursor.claim(1);
            if claim.is_empty() {
                break;
            }
            for unit in claim.units() {
                self.process_unit(unit, &mut buf);
            }
            self.cursor.complete(claim.count);
            processed += claim.count;
        }

        debug!(units = processed, "worker finished");
        Ok(processed)
    }

    fn process_unit(&self, unit: usize, buf: &mut WorkBuffer) {
        for tile in self.geometry.unit_tiles(unit) {
            trace!(unit, offset = ?tile.offset, extent = ?tile.extent, "tile");
            sample_tile(&self.image, &tile, &self.spec, &self.swizzle, buf);
            build_summed_area_tables(buf, self.spec.volumetric);

            let sink: &S = &*self.sink;
            let store = |index, stats| {
                // SAFETY: tiles partition the image, each unit is granted to
                // one worker only, and the sink is borrowed exclusively by
                // this scheduler, so `index` is written by no other thread.
                unsafe { sink.store(index, stats) }
            };
            extract_tile_stats(buf, &tile, &self.spec, &self.scale, &self.image, store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::WindowedStats;
    use std::collections::HashSet;

    #[test]
    fn test_claim_sequence_and_drain() {
        let c = WorkCursor::new(5);
        assert_eq!(c.claim(2), Claim { base: 0, count: 2 });
        assert_eq!(c.claim(1), Claim { base: 2, count: 1 });
        assert_eq!(c.claim(4), Claim { base: 3, count: 2 });
        assert!(c.is_drained());
        assert!(c.claim(1).is_empty());
        assert!(c.claim(1).is_empty());
        assert!(!c.is_complete());
        c.complete(5);
        assert!(c.is_complete());
        assert_eq!(c.progress(), (5, 5));
    }

    #[test]
    fn test_claim_zero_granule_requests_one() {
        let c = WorkCursor::new(2);
        assert_eq!(c.claim(0).count, 1);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut c = WorkCursor::new(1);
        assert_eq!(c.claim(1).count, 1);
        c.complete(1);
        c.reset();
        assert!(!c.is_drained());
        assert_eq!(c.progress(), (0, 1));
        assert_eq!(c.claim(1), Claim { base: 0, count: 1 });
    }

    #[test]
    fn test_concurrent_claims_are_unique() {
        let c = WorkCursor::new(1000);
        let claimed: Vec<Vec<usize>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let mut mine = Vec::new();
                        loop {
                            let cl = c.claim(3);
                            if cl.is_empty() {
                                break;
                            }
                            mine.extend(cl.units());
                        }
                        mine
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let all: Vec<usize> = claimed.into_iter().flatten().collect();
        assert_eq!(all.len(), 1000);
        let unique: HashSet<usize> = all.into_iter().collect();
        assert_eq!(unique.len(), 1000);
    }

    #[test]
    fn test_begin_rejects_wrong_sink_size() {
        let data = vec![0u8; 4 * 4 * 4];
        let img = ImageView::from_unorm8(4, 4, 1, &data).unwrap();
        let other = vec![0u8; 4 * 5 * 4];
        let other_img = ImageView::from_unorm8(5, 4, 1, &other).unwrap();
        let mut ws = WindowedStats::for_image(&other_img);
        let mut out = ws.output();
        let err = StatsScheduler::begin(&img, KernelSpec::default(), Swizzle::IDENTITY, &mut out)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            FilterError::OutputSizeMismatch {
                expected: 16,
                actual: 20
            }
        ));
    }

    #[test]
    fn test_begin_rejects_bad_power() {
        let data = vec![0u8; 4];
        let img = ImageView::from_unorm8(1, 1, 1, &data).unwrap();
        let mut ws = WindowedStats::for_image(&img);
        let mut out = ws.output();
        let spec = KernelSpec::builder().rgb_power(-1.0).build();
        let res = StatsScheduler::begin(&img, spec, Swizzle::IDENTITY, &mut out);
        assert!(res.is_err());
    }

    #[test]
    fn test_begin_rejects_overflowing_radius() {
        let data = vec![0.0f32; 4 * 8];
        let img = ImageView::from_f32(2, 2, 2, &data).unwrap();
        let mut ws = WindowedStats::for_image(&img);
        let mut out = ws.output();
        let spec = KernelSpec::builder()
            .radius(1 << 21)
            .volumetric(true)
            .build();
        let err = StatsScheduler::begin(&img, spec, Swizzle::IDENTITY, &mut out)
            .err()
            .unwrap();
        assert!(matches!(err, FilterError::AllocationFailed { .. }));
    }

    #[test]
    fn test_run_reports_allocation_failure_without_claiming() {
        // (2^25 + 4)^2 cells of 16 bytes per plane: far beyond any
        // address space, but still countable
        let data = vec![0u8; 4 * 3 * 3];
        let img = ImageView::from_unorm8(3, 3, 1, &data).unwrap();
        let mut ws = WindowedStats::for_image(&img);
        let mut out = ws.output();
        let spec = KernelSpec::builder().radius(1 << 24).build();
        let sched = StatsScheduler::begin(&img, spec, Swizzle::IDENTITY, &mut out).unwrap();

        let err = sched.run().unwrap_err();
        assert!(matches!(err, FilterError::AllocationFailed { .. }));
        assert_eq!(sched.cursor().progress(), (0, 1));
        assert!(!sched.cursor().is_drained());
    }

    #[test]
    fn test_run_while_stops_between_units() {
        let data = vec![1.0f32; 4 * 8 * 100];
        let img = ImageView::from_f32(8, 100, 1, &data).unwrap();
        let mut ws = WindowedStats::for_image(&img);
        {
            let mut out = ws.output();
            let sched =
                StatsScheduler::begin(&img, KernelSpec::default(), Swizzle::IDENTITY, &mut out)
                    .unwrap();
            assert_eq!(sched.total_units(), 4);

            let mut budget = 2;
            let done = sched
                .run_while(|| {
                    budget -= 1;
                    budget >= 0
                })
                .unwrap();
            assert_eq!(done, 2);
            assert_eq!(sched.cursor().progress(), (2, 4));
            assert!(!sched.is_complete());
        }

        // Units 0 and 1 cover rows 0..64; the rest stay untouched
        assert_eq!(ws.average(3, 63, 0), texstat_core::Float4::ONE);
        assert_eq!(ws.average(3, 64, 0), texstat_core::Float4::ZERO);
    }

    #[test]
    fn test_reset_allows_second_run() {
        let data = vec![0.25f32; 4 * 3 * 3];
        let img = ImageView::from_f32(3, 3, 1, &data).unwrap();
        let mut ws = WindowedStats::for_image(&img);
        let mut out = ws.output();
        let mut sched =
            StatsScheduler::begin(&img, KernelSpec::default(), Swizzle::IDENTITY, &mut out)
                .unwrap();
        assert_eq!(sched.run().unwrap(), 1);
        assert_eq!(sched.run().unwrap(), 0);
        sched.reset();
        assert_eq!(sched.run().unwrap(), 1);
        assert!(sched.is_complete());
    }
}
