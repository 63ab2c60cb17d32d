//! Brent-Kung parallel prefix sum
//!
//! A serial running sum chains every element through one addition after
//! another, so rounding error grows linearly with the line length. The
//! Brent-Kung scan first reduces pairs up a binary tree and then pushes the
//! partial sums back down, so each output is at most `O(log n)` additions
//! deep. That is what lets the summed-area tables stay in `f32`.

use texstat_core::Float4;

/// Turn a strided line into its inclusive prefix sum, in place.
///
/// The line is the `items` elements `data[start]`, `data[start + stride]`,
/// ..., `data[start + (items - 1) * stride]`. Afterwards element `i` holds
/// the sum of the original elements `0..=i`. Lines shorter than 2 are left
/// untouched.
///
/// # Panics
///
/// Panics if the line extends past the end of `data`, or if `items >= 2`
/// and `stride` is 0.
pub fn brent_kung_prefix_sum(data: &mut [Float4], start: usize, items: usize, stride: usize) {
    if items < 2 {
        return;
    }
    assert!(stride > 0, "prefix sum stride must be non-zero");
    assert!(
        start + (items - 1) * stride < data.len(),
        "prefix sum line exceeds buffer"
    );

    let at = |i: usize| start + i * stride;

    // Reduction tree: level spans double each pass
    let mut span = 2usize;
    let mut log2_span = 1u32;
    loop {
        let step = span >> 1;
        let iters = items >> log2_span;
        let mut i = span - 1;
        for _ in 0..iters {
            let left = data[at(i - step)];
            data[at(i)] += left;
            i += span;
        }

        log2_span += 1;
        span <<= 1;
        if span > items {
            break;
        }
    }

    // Expansion tree
    loop {
        log2_span -= 1;
        span >>= 1;

        let step = span >> 1;
        let iters = (items - step) >> log2_span;
        let mut i = step + span - 1;
        for _ in 0..iters {
            let left = data[at(i - step)];
            data[at(i)] += left;
            i += span;
        }

        if span <= 2 {
            break;
        }
    }
}
