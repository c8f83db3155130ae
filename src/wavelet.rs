//! CDF 5/3 integer wavelet engine and coefficient blending.
//!
//! The image is split into low and high frequency components with the
//! reversible CDF 5/3 lifting transform, applied to columns and rows
//! independently. Outside the image the reflected border samples are used
//! (`.. 2 1 0 1 2 ..`), which makes the transform self-inverting including
//! at the edges.
//!
//! Forward, per axis:
//!
//! - detail (odd samples): `d[i] = odd[i] - ((even[i-1] + even[i+1]) >> 1)`
//! - approximation (even samples): `a[i] = even[i] + ((d[i-1] + d[i]) >> 2)`
//!
//! Inverse: the exact algebraic opposite, applied in the reverse order of
//! axes. All shifts are arithmetic (floor division), so negative
//! coefficients round the same way in both directions.
//!
//! At the borders the coefficient bands extend by reflection as well: the
//! approximation band duplicates its last value at even lengths
//! (`a[n] = a[n-1]`), the detail band mirrors without duplication
//! (`d[-1] = d[0]`, `d[n] = d[n-2]`). At odd lengths the trailing
//! coefficients fall out of the reflected input samples naturally.
//!
//! The pipeline runs one vertical + one horizontal pass over the original
//! luma, keeping only the approximation band (the "coarse" image), and one
//! vertical + one horizontal pass over the smoothed luma, keeping both
//! bands. Reconstruction inverts the horizontal then the vertical pass,
//! combining the coarse band of the original (optionally blended with the
//! smoothed one, see [`blend_approx`]) with the detail bands of the
//! smoothed image. Because the horizontal transform runs along rows of a
//! row-major layout, each row is staged through the worker's private
//! scratch strip before transforming.

use crate::filter::PipelineState;
use crate::plane::Plane;
use crate::pool::split_range;

/// Vertical detail coefficient `k` of column `x`: the odd row minus the
/// average of its even neighbors.
#[inline]
fn vert_detail(src: &Plane, k: i32, x: i32) -> i32 {
    src.at(2 * k + 1, x) as i32 - ((src.at(2 * k, x) as i32 + src.at(2 * k + 2, x) as i32) >> 1)
}

/// Vertical forward pass over the row bands owned by `worker`.
///
/// Writes the approximation band to `bufy0` (with its column reflections).
/// With `keep_detail`, also writes the detail band to `bufy1` and restores
/// the detail band's row reflections for the rows this worker owns.
pub(crate) fn vert_forward(state: &PipelineState, worker: usize, src: &Plane, keep_detail: bool) {
    let h = state.height;
    let w = state.width as i32;
    let h2a = (h + 1) / 2;
    let bands = (h + 7) / 8;
    let (b0, b1) = split_range(bands, state.threads, worker);
    let j0 = b0 * 4;
    let j1 = (b1 * 4).min(h2a);

    for j in j0..j1 {
        let j = j as i32;
        for x in 0..w {
            let d_prev = vert_detail(src, j - 1, x);
            let d_cur = vert_detail(src, j, x);
            let a = src.at(2 * j, x) as i32 + ((d_prev + d_cur) >> 2);
            state.bufy0.set(j, x, a as i16);
            if keep_detail {
                state.bufy1.set(j, x, d_cur as i16);
            }
        }
        state.bufy0.reflect_cols(j, w);
    }

    if keep_detail {
        let h2d = h / 2;
        if j0 == 0 && j1 > 0 {
            state.bufy1.copy_row(-1, 0);
        }
        if h % 2 == 0 {
            // The trailing reflection belongs to whichever worker owns the
            // mirrored source row.
            let src_row = h2d - 2;
            if j0 <= src_row && src_row < j1 {
                state.bufy1.copy_row(h2d as i32, src_row as i32);
            }
        }
    }
}

/// Horizontal forward pass over the sub-band rows owned by `worker`.
///
/// Reads the vertical approximation band, stages each row through the
/// worker's scratch strip, and emits the horizontal approximation band to
/// `approx` and/or the horizontal detail band to `detail` (detail column -1
/// and the right-edge reflections included).
pub(crate) fn horz_forward(
    state: &PipelineState,
    worker: usize,
    approx: Option<&Plane>,
    detail: Option<&Plane>,
) {
    let h = state.height;
    let w = state.width as i32;
    let h2a = (h + 1) / 2;
    let bands = (h + 15) / 16;
    let (b0, b1) = split_range(bands, state.threads, worker);
    let r0 = b0 * 8;
    let r1 = (b1 * 8).min(h2a);
    let scratch = &state.work[worker];
    let half = w / 2;

    for r in r0..r1 {
        let r = r as i32;

        // Stage the row, columns -2..=w+1.
        for col in -2..w + 2 {
            scratch.set(0, col, state.bufy0.at(r, col));
        }

        // Detail coefficients, including the reflected ones at both edges.
        let jd = if w % 2 == 0 { half - 1 } else { half };
        for j in -1..=jd {
            let d = scratch.at(0, 2 * j + 1) as i32
                - ((scratch.at(0, 2 * j) as i32 + scratch.at(0, 2 * j + 2) as i32) >> 1);
            scratch.set(1, j, d as i16);
        }
        if w % 2 == 0 {
            scratch.set(1, half, scratch.at(1, half - 2));
        }

        if let Some(det) = detail {
            for j in -1..=half {
                det.set(r, j, scratch.at(1, j));
            }
        }

        if let Some(apx) = approx {
            let computed = (w + 1) / 2;
            for j in 0..computed {
                let a = scratch.at(0, 2 * j) as i32
                    + ((scratch.at(1, j - 1) as i32 + scratch.at(1, j) as i32) >> 2);
                apx.set(r, j, a as i16);
            }
            if w % 2 == 0 {
                apx.set(r, half, apx.at(r, half - 1));
            }
        }
    }
}

/// Blend the coarse bands of the smoothed and original images.
///
/// `restore = 0` would keep the smoothed band entirely (that case skips the
/// wavelet stages altogether), `restore = 128` keeps the original band; the
/// pipeline only runs this stage for partial weights. The weighted sum of
/// two 12-bit-range coefficients fits a 32-bit accumulator, so no
/// saturation is needed before the shift.
pub(crate) fn blend_approx(state: &PipelineState, worker: usize) {
    let h2a = (state.height + 1) / 2;
    let half = state.width as i32 / 2;
    let restore = state.restore;
    let (r0, r1) = split_range(h2a, state.threads, worker);

    for r in r0 as i32..r1 as i32 {
        for j in 0..=half {
            let smoothed = state.bufx0.at(r, j) as i32;
            let original = state.luma0.at(r, j) as i32;
            let v = (smoothed * (128 - restore) + original * restore + 64) >> 7;
            state.luma0.set(r, j, v as i16);
        }
    }
}

/// Horizontal inverse pass: recombine the (possibly blended) coarse band
/// with the horizontal detail band back into the vertical approximation
/// plane.
pub(crate) fn horz_inverse(state: &PipelineState, worker: usize) {
    let h = state.height;
    let w = state.width as i32;
    let h2a = (h + 1) / 2;
    let bands = (h + 15) / 16;
    let (b0, b1) = split_range(bands, state.threads, worker);
    let r0 = b0 * 8;
    let r1 = (b1 * 8).min(h2a);
    let scratch = &state.work[worker];
    let half = w / 2;

    for r in r0..r1 {
        let r = r as i32;

        // Even samples into the scratch strip first.
        for j in 0..=half {
            let e = state.luma0.at(r, j) as i32
                - ((state.bufx1.at(r, j - 1) as i32 + state.bufx1.at(r, j) as i32) >> 2);
            scratch.set(0, j, e as i16);
        }

        // Interleave evens and recovered odds into the output row.
        for j in 0..=half {
            let even_col = 2 * j;
            if even_col < w {
                state.bufy0.set(r, even_col, scratch.at(0, j));
            }
            let odd_col = 2 * j + 1;
            if odd_col < w {
                let v = state.bufx1.at(r, j) as i32
                    + ((scratch.at(0, j) as i32 + scratch.at(0, j + 1) as i32) >> 1);
                state.bufy0.set(r, odd_col, v as i16);
            }
        }
    }

    if h % 2 == 0 {
        // Duplicate the last approximation row for the vertical inverse.
        let last = h2a - 1;
        if r0 <= last && last < r1 {
            state.bufy0.copy_row(h2a as i32, last as i32);
        }
    }
}

/// Vertical inverse pass: rebuild the result luma plane from the vertical
/// approximation and detail bands.
pub(crate) fn vert_inverse(state: &PipelineState, worker: usize) {
    let h = state.height;
    let w = state.width as i32;
    let h2d = h / 2;
    let bands = (h + 7) / 8;
    let (b0, b1) = split_range(bands, state.threads, worker);

    for band in b0..b1 {
        let jlo = (band * 4) as i32;
        let je = (band * 4 + 4).min(h2d) as i32;

        for x in 0..w {
            let mut evens = [0i32; 5];
            for j in jlo..=je {
                evens[(j - jlo) as usize] = state.bufy0.at(j, x) as i32
                    - ((state.bufy1.at(j - 1, x) as i32 + state.bufy1.at(j, x) as i32) >> 2);
            }

            for j in jlo..jlo + 4 {
                let even_row = 2 * j;
                if even_row < h as i32 {
                    state.luma1.set(even_row, x, evens[(j - jlo) as usize] as i16);
                }
                let odd_row = 2 * j + 1;
                if odd_row < h as i32 {
                    let v = state.bufy1.at(j, x) as i32
                        + ((evens[(j - jlo) as usize] + evens[(j - jlo + 1) as usize]) >> 1);
                    state.luma1.set(odd_row, x, v as i16);
                }
            }
        }
    }
}
