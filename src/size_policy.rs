//! Resolves an image's on-screen size from its decoded dimensions.
//!
//! Components are configured with optional maximum bounds per axis (0 means
//! unconstrained) and a `resize_exact` switch. [`compute`] turns the decoded
//! (natural) dimensions plus those constraints into the final render size,
//! which is what geometry is built against and what size queries report.

/// Compute the render size for an image.
///
/// Rules, applied in order:
/// 1. No constraints (`max_w == 0 && max_h == 0`) — the natural size is used
///    unchanged.
/// 2. `resize_exact` — each axis independently resolves to its constraint if
///    nonzero, else to the natural value. Aspect ratio may be distorted.
/// 3. Otherwise a single uniform scale is chosen: the minimum of
///    `constraint / natural` over the nonzero-constrained axes, so both
///    bounds are guaranteed to fit and aspect ratio is preserved.
/// 4. Under rule 3 the image is never upscaled: a scale of 1.0 or more
///    leaves the natural size unchanged.
///
/// Dimensions are rounded to the nearest pixel. A constrained axis with a
/// nonzero natural dimension never rounds to zero.
pub fn compute(
    natural_w: u32,
    natural_h: u32,
    max_w: u32,
    max_h: u32,
    resize_exact: bool,
) -> (u32, u32) {
    if max_w == 0 && max_h == 0 {
        return (natural_w, natural_h);
    }

    if resize_exact {
        let w = if max_w != 0 { max_w } else { natural_w };
        let h = if max_h != 0 { max_h } else { natural_h };
        return (w, h);
    }

    // Uniform scale: the more restrictive bound wins so both axes fit.
    let mut scale = f64::INFINITY;
    if max_w != 0 && natural_w != 0 {
        scale = scale.min(max_w as f64 / natural_w as f64);
    }
    if max_h != 0 && natural_h != 0 {
        scale = scale.min(max_h as f64 / natural_h as f64);
    }

    // Only downscale. An image already inside its bounds (or a fully
    // degenerate one) keeps its natural size.
    if scale >= 1.0 || !scale.is_finite() {
        return (natural_w, natural_h);
    }

    (
        scale_axis(natural_w, scale),
        scale_axis(natural_h, scale),
    )
}

fn scale_axis(natural: u32, scale: f64) -> u32 {
    if natural == 0 {
        return 0;
    }
    let rounded = (natural as f64 * scale).round() as u32;
    rounded.max(1)
}
