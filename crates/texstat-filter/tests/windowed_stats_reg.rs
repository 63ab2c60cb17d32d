//! Windowed statistics regression test
//!
//! Runs the tiled summed-area-table path end to end and checks it against
//! closed-form values and against the brute-force reference in
//! `texstat_test`, for 2D images, texture arrays and volumes.

use texstat_core::{Float4, PixelFormat, Swizzle};
use texstat_filter::{KernelSpec, WindowedStats, compute_windowed_stats};
use texstat_test::{ReferenceKernel, RegParams, SyntheticImage, reference_windowed_stats};

fn reference_kernel(spec: &KernelSpec) -> ReferenceKernel {
    ReferenceKernel::new(spec.stats_radius as usize, spec.alpha_radius as usize)
        .volumetric(spec.volumetric)
        .powers(spec.rgb_power, spec.alpha_power)
}

/// Compare every pixel of `stats` with the brute-force reference.
fn compare_with_reference(
    rp: &mut RegParams,
    img: &SyntheticImage,
    spec: &KernelSpec,
    swizzle: Swizzle,
    stats: &WindowedStats,
    tol: f32,
) {
    let view = img.view().unwrap();
    let reference = reference_windowed_stats(&view, &swizzle, &reference_kernel(spec));

    let mut worst_avg = 0.0f32;
    let mut worst_var = 0.0f32;
    let mut worst_alpha = 0.0f32;
    for i in 0..view.pixel_count() {
        worst_avg = worst_avg.max(stats.averages()[i].max_abs_diff(reference.average4(i)));
        worst_var = worst_var.max(stats.variances()[i].max_abs_diff(reference.variance4(i)));
        let da = (stats.alpha_averages()[i] as f64 - reference.alpha_average[i]).abs();
        worst_alpha = worst_alpha.max(da as f32);
    }
    eprintln!("  max diff: avg {worst_avg:e}, var {worst_var:e}, alpha {worst_alpha:e}");

    rp.compare_values(0.0, worst_avg as f64, tol as f64);
    rp.compare_values(0.0, worst_var as f64, tol as f64);
    rp.compare_values(0.0, worst_alpha as f64, tol as f64);
}

// ============================================================================
// Closed-form cases
// ============================================================================

#[test]
fn windowed_stats_reg_zero_radius_identity() {
    let mut rp = RegParams::new("windowed_zero_radius");

    let img = SyntheticImage::random([23, 17, 1], PixelFormat::Unorm8, 1);
    let view = img.view().unwrap();
    let swizzle: Swizzle = "bgra".parse().unwrap();
    let spec = KernelSpec::builder().rgb_power(2.0).build();
    let stats = compute_windowed_stats(&view, &spec, swizzle).unwrap();

    for y in 0..17 {
        for x in 0..23 {
            let t = swizzle.apply(view.texel(x, y, 0));
            let expected = Float4::new(
                t.r.max(1e-6).powf(2.0),
                t.g.max(1e-6).powf(2.0),
                t.b.max(1e-6).powf(2.0),
                t.a.max(1e-6),
            );
            // Single-cell boxes still go through f32 table corners
            rp.compare_float4(expected, stats.average(x, y, 0), 5e-4);
            rp.compare_float4(Float4::ZERO, stats.variance(x, y, 0), 0.0);
            rp.compare_values(expected.a as f64, stats.alpha_average(x, y, 0) as f64, 5e-4);
        }
    }

    assert!(rp.cleanup(), "windowed_zero_radius regression test failed");
}

#[test]
fn windowed_stats_reg_uniform_invariance() {
    let mut rp = RegParams::new("windowed_uniform");
    let color = [0.2, 0.4, 0.6, 0.8];

    let cases = [
        ([45, 37, 1], KernelSpec::builder().radius(5).build()),
        (
            [70, 3, 1],
            KernelSpec::builder()
                .stats_radius(9)
                .alpha_radius(2)
                .build(),
        ),
        ([1, 1, 1], KernelSpec::builder().radius(4).build()),
        (
            [18, 20, 17],
            KernelSpec::builder().radius(2).volumetric(true).build(),
        ),
    ];

    for (dims, spec) in cases {
        let img = SyntheticImage::uniform(dims, PixelFormat::Float32, color);
        let view = img.view().unwrap();
        let stats = compute_windowed_stats(&view, &spec, Swizzle::IDENTITY).unwrap();

        // Borders included: clamp-to-edge keeps every window uniform
        let worst_avg = stats
            .averages()
            .iter()
            .map(|a| a.max_abs_diff(Float4::from(color)))
            .fold(0.0f32, f32::max);
        let worst_var = stats
            .variances()
            .iter()
            .map(|v| v.max_abs_diff(Float4::ZERO))
            .fold(0.0f32, f32::max);
        let worst_alpha = stats
            .alpha_averages()
            .iter()
            .map(|a| (a - 0.8).abs())
            .fold(0.0f32, f32::max);

        rp.compare_values(0.0, worst_avg as f64, 1e-4);
        rp.compare_values(0.0, worst_var as f64, 5e-4);
        rp.compare_values(0.0, worst_alpha as f64, 1e-4);
    }

    assert!(rp.cleanup(), "windowed_uniform regression test failed");
}

#[test]
fn windowed_stats_reg_checkerboard() {
    let mut rp = RegParams::new("windowed_checkerboard");

    let img = SyntheticImage::checkerboard([4, 4, 1], PixelFormat::Unorm8, [0.0; 4], [1.0; 4]);
    let view = img.view().unwrap();
    let spec = KernelSpec::builder().stats_radius(1).build();
    let stats = compute_windowed_stats(&view, &spec, Swizzle::IDENTITY).unwrap();

    // Clamped 3x3 neighborhood of (0, 0) holds four ones and five zeros
    rp.compare_values(4.0 / 9.0, stats.average(0, 0, 0).r as f64, 1e-6);
    rp.compare_values(5.0 / 18.0, stats.variance(0, 0, 0).r as f64, 1e-6);
    rp.compare_values(4.0 / 9.0, stats.average(0, 0, 0).a as f64, 1e-6);

    // Interior (1, 1) is a zero surrounded by four ones and four zeros
    rp.compare_values(4.0 / 9.0, stats.average(1, 1, 0).g as f64, 1e-6);
    // Interior (2, 1) is a one: five ones and four zeros
    rp.compare_values(5.0 / 9.0, stats.average(2, 1, 0).g as f64, 1e-6);
    rp.compare_values(5.0 / 18.0, stats.variance(2, 1, 0).g as f64, 1e-6);

    // alpha_radius 0: alpha average is the pixel's own alpha
    rp.compare_values(0.0, stats.alpha_average(0, 0, 0) as f64, 1e-6);
    rp.compare_values(1.0, stats.alpha_average(1, 0, 0) as f64, 1e-6);

    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-6);

    assert!(rp.cleanup(), "windowed_checkerboard regression test failed");
}

// ============================================================================
// Brute-force comparisons
// ============================================================================

#[test]
fn windowed_stats_reg_reference_2d() {
    let mut rp = RegParams::new("windowed_reference_2d");

    // Several tiles along both axes, with partial edge tiles
    let img = SyntheticImage::random([37, 29, 1], PixelFormat::Unorm8, 2);
    let spec = KernelSpec::builder()
        .stats_radius(3)
        .alpha_radius(1)
        .build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-4);

    let img = SyntheticImage::random([70, 66, 1], PixelFormat::Float32, 3);
    let spec = KernelSpec::builder().radius(2).build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-4);

    assert!(rp.cleanup(), "windowed_reference_2d regression test failed");
}

#[test]
fn windowed_stats_reg_reference_3d() {
    let mut rp = RegParams::new("windowed_reference_3d");

    // Crosses the 16-voxel tile boundary on every axis
    let img = SyntheticImage::random([20, 18, 19], PixelFormat::Unorm8, 4);
    let spec = KernelSpec::builder().radius(2).volumetric(true).build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-3);

    let img = SyntheticImage::random([9, 7, 5], PixelFormat::Float32, 5);
    let spec = KernelSpec::builder()
        .stats_radius(1)
        .alpha_radius(3)
        .volumetric(true)
        .build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-4);

    assert!(rp.cleanup(), "windowed_reference_3d regression test failed");
}

#[test]
fn windowed_stats_reg_differing_radii() {
    let mut rp = RegParams::new("windowed_differing_radii");

    // The apron is sized by the larger radius; the smaller window must
    // still land on the right cells, at the borders in particular
    let img = SyntheticImage::random([40, 35, 1], PixelFormat::Float32, 6);
    for (rs, ra) in [(1, 12), (12, 0), (0, 7), (5, 5)] {
        let spec = KernelSpec::builder()
            .stats_radius(rs)
            .alpha_radius(ra)
            .build();
        let stats =
            compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
        compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 5e-4);
    }

    assert!(
        rp.cleanup(),
        "windowed_differing_radii regression test failed"
    );
}

#[test]
fn windowed_stats_reg_texture_array() {
    let mut rp = RegParams::new("windowed_texture_array");

    // Each slice is uniform with its own value; no window may reach across
    let img = SyntheticImage::from_fn([12, 10, 3], PixelFormat::Float32, |_, _, z| {
        let v = z as f32 / 4.0;
        [v, v, v, 1.0]
    });
    let view = img.view().unwrap();
    let spec = KernelSpec::builder().radius(3).build();
    let stats = compute_windowed_stats(&view, &spec, Swizzle::IDENTITY).unwrap();

    for z in 0..3 {
        let v = z as f32 / 4.0;
        for (x, y) in [(0, 0), (5, 5), (11, 9)] {
            rp.compare_float4(Float4::new(v, v, v, 1.0), stats.average(x, y, z), 1e-6);
            rp.compare_float4(Float4::ZERO, stats.variance(x, y, z), 1e-5);
        }
    }

    let img = SyntheticImage::random([33, 34, 4], PixelFormat::Unorm8, 7);
    let spec = KernelSpec::builder()
        .stats_radius(2)
        .alpha_radius(4)
        .build();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, Swizzle::IDENTITY).unwrap();
    compare_with_reference(&mut rp, &img, &spec, Swizzle::IDENTITY, &stats, 1e-4);

    assert!(
        rp.cleanup(),
        "windowed_texture_array regression test failed"
    );
}

#[test]
fn windowed_stats_reg_response_curve() {
    let mut rp = RegParams::new("windowed_response_curve");

    let img = SyntheticImage::random([30, 20, 1], PixelFormat::Float32, 8);
    let spec = KernelSpec::builder()
        .radius(2)
        .rgb_power(2.2)
        .alpha_power(0.5)
        .build();
    let swizzle: Swizzle = "rgb1".parse().unwrap();
    let stats = compute_windowed_stats(&img.view().unwrap(), &spec, swizzle).unwrap();
    compare_with_reference(&mut rp, &img, &spec, swizzle, &stats, 1e-4);

    // Constant-one alpha stays one under any exponent
    rp.compare_values(1.0, stats.alpha_average(0, 0, 0) as f64, 1e-6);

    assert!(
        rp.cleanup(),
        "windowed_response_curve regression test failed"
    );
}
