//! Pixel format regression test
//!
//! The same image stored as `u8` unorm, `f16` and `f32` must give the same
//! statistics up to the precision of each encoding.

use texstat_core::{PixelFormat, Swizzle};
use texstat_filter::{KernelSpec, WindowedStats, compute_windowed_stats};
use texstat_test::{RegParams, SyntheticImage};

fn stats_for(format: PixelFormat, dims: [usize; 3], spec: &KernelSpec) -> WindowedStats {
    let img = SyntheticImage::random(dims, format, 11);
    compute_windowed_stats(&img.view().unwrap(), spec, Swizzle::IDENTITY).unwrap()
}

fn worst_diff(a: &WindowedStats, b: &WindowedStats) -> f32 {
    let avg = a
        .averages()
        .iter()
        .zip(b.averages())
        .map(|(x, y)| x.max_abs_diff(*y));
    let var = a
        .variances()
        .iter()
        .zip(b.variances())
        .map(|(x, y)| x.max_abs_diff(*y));
    let alpha = a
        .alpha_averages()
        .iter()
        .zip(b.alpha_averages())
        .map(|(x, y)| (x - y).abs());
    avg.chain(var).chain(alpha).fold(0.0f32, f32::max)
}

#[test]
fn format_reg_agreement_2d() {
    let mut rp = RegParams::new("format_agreement_2d");
    let spec = KernelSpec::builder()
        .stats_radius(2)
        .alpha_radius(3)
        .build();
    let dims = [41, 35, 1];

    let unorm = stats_for(PixelFormat::Unorm8, dims, &spec);
    let half = stats_for(PixelFormat::Float16, dims, &spec);
    let full = stats_for(PixelFormat::Float32, dims, &spec);

    // Both decode to the same f32 bits
    rp.compare_values(0.0, worst_diff(&unorm, &full) as f64, 1e-6);
    // f16 rounds each channel by up to 2^-12 relative
    rp.compare_values(0.0, worst_diff(&half, &full) as f64, 1e-3);

    assert!(rp.cleanup(), "format_agreement_2d regression test failed");
}

#[test]
fn format_reg_agreement_3d() {
    let mut rp = RegParams::new("format_agreement_3d");
    let spec = KernelSpec::builder().radius(1).volumetric(true).build();
    let dims = [17, 9, 18];

    let unorm = stats_for(PixelFormat::Unorm8, dims, &spec);
    let half = stats_for(PixelFormat::Float16, dims, &spec);
    let full = stats_for(PixelFormat::Float32, dims, &spec);

    rp.compare_values(0.0, worst_diff(&unorm, &full) as f64, 1e-6);
    rp.compare_values(0.0, worst_diff(&half, &full) as f64, 1e-3);

    assert!(rp.cleanup(), "format_agreement_3d regression test failed");
}

#[test]
fn format_reg_hdr_values() {
    let mut rp = RegParams::new("format_hdr");

    // Float formats are not clamped to [0, 1]
    let img = SyntheticImage::from_fn([8, 8, 1], PixelFormat::Float16, |x, _, _| {
        let v = if x < 4 { 4.0 } else { 8.0 };
        [v, -v, 0.0, 1.0]
    });
    let spec = KernelSpec::builder().stats_radius(1).build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();

    rp.compare_values(4.0, stats.average(0, 4, 0).r as f64, 1e-5);
    rp.compare_values(-8.0, stats.average(7, 4, 0).g as f64, 1e-5);
    // Column 3 sees 4, 4, 8 in every row: mean 16/3
    rp.compare_values(16.0 / 3.0, stats.average(3, 4, 0).r as f64, 1e-5);
    // Six 4s and three 8s: squared deviations sum to 32, over N - 1 = 8
    rp.compare_values(4.0, stats.variance(3, 4, 0).r as f64, 1e-4);

    assert!(rp.cleanup(), "format_hdr regression test failed");
}
