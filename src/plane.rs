//! Padded plane storage for 12-bit fixed-point luma samples.
//!
//! Every working buffer of the pipeline is a [`Plane`]: a grid of `i16`
//! samples with a SIMD-friendly row pitch and a border margin, addressed
//! relative to an interior origin so that reflected border cells sit at
//! negative indices. 8-bit source samples are widened to 12-bit fixed point
//! (`sample << 4`) on load and narrowed with a rounding bias (`(v + 8) >> 4`,
//! saturating) on store.
//!
//! Border cells are exact copies of interior cells, mirrored without
//! duplicating the edge sample (`p[-1] = p[1]`, `p[-2] = p[2]`, and the
//! symmetric rule at the far edge), so edge-pixel computations need no
//! special-casing and reproduce bit-for-bit.

use std::cell::UnsafeCell;

/// Row pitch in samples for a frame of the given width.
pub(crate) fn pitch_for(width: usize) -> usize {
    ((width + 7) & !7) + 16
}

/// Padded row count for a full-resolution luma plane.
pub(crate) fn luma_rows(height: usize) -> usize {
    ((height + 7) & !7) + 4
}

/// Padded row count for a half-height sub-band plane, plus `extra` rows.
pub(crate) fn band_rows(height: usize, extra: usize) -> usize {
    ((height + 15) & !15) / 2 + extra
}

/// A shared, padded sample plane.
///
/// Planes are shared read / partitioned write: within one pipeline stage,
/// every cell is written by at most one worker thread, and stages are
/// separated by a full barrier before any other thread reads those cells.
/// Under that invariant the per-cell accessors below are race-free; the
/// `Sync` impl asserts it.
pub(crate) struct Plane {
    data: Box<[UnsafeCell<i16>]>,
    pitch: usize,
    rows: usize,
    origin_row: usize,
    origin_col: usize,
}

// SAFETY: all access goes through `at`/`set`, which touch disjoint cells
// across worker threads within a stage (see the stage partitioning rules in
// `filter.rs`); a full barrier orders writes before any cross-thread read.
unsafe impl Sync for Plane {}

impl Plane {
    /// Allocate a zeroed plane of `rows` x `pitch` samples with the interior
    /// origin at (`origin_row`, `origin_col`).
    pub(crate) fn new(rows: usize, pitch: usize, origin_row: usize, origin_col: usize) -> Self {
        let data = (0..rows * pitch)
            .map(|_| UnsafeCell::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            data,
            pitch,
            rows,
            origin_row,
            origin_col,
        }
    }

    #[inline]
    fn index(&self, row: i32, col: i32) -> usize {
        let r = self.origin_row as i32 + row;
        let c = self.origin_col as i32 + col;
        debug_assert!(r >= 0 && (r as usize) < self.rows, "row {row} out of range");
        debug_assert!(c >= 0 && (c as usize) < self.pitch, "col {col} out of range");
        r as usize * self.pitch + c as usize
    }

    /// Read the sample at (`row`, `col`), relative to the interior origin.
    #[inline]
    pub(crate) fn at(&self, row: i32, col: i32) -> i16 {
        let idx = self.index(row, col);
        // SAFETY: disjoint-write invariant, see the `Sync` impl.
        unsafe { *self.data[idx].get() }
    }

    /// Write the sample at (`row`, `col`), relative to the interior origin.
    #[inline]
    pub(crate) fn set(&self, row: i32, col: i32, value: i16) {
        let idx = self.index(row, col);
        // SAFETY: disjoint-write invariant, see the `Sync` impl.
        unsafe { *self.data[idx].get() = value }
    }

    /// Copy a full padded row (all `pitch` samples, margins included).
    pub(crate) fn copy_row(&self, dst_row: i32, src_row: i32) {
        let dst = self.index(dst_row, -(self.origin_col as i32));
        let src = self.index(src_row, -(self.origin_col as i32));
        for c in 0..self.pitch {
            // SAFETY: disjoint-write invariant, see the `Sync` impl.
            unsafe { *self.data[dst + c].get() = *self.data[src + c].get() }
        }
    }

    /// Mirror two columns of border on each side of a row of `width`
    /// interior samples, without duplicating the edge sample.
    pub(crate) fn reflect_cols(&self, row: i32, width: i32) {
        self.set(row, -1, self.at(row, 1));
        self.set(row, -2, self.at(row, 2));
        self.set(row, width, self.at(row, width - 2));
        self.set(row, width + 1, self.at(row, width - 3));
    }

    /// Load an 8-bit plane into the interior as 12-bit fixed point and
    /// rebuild all border reflections.
    pub(crate) fn load_u8(&self, src: &[u8], stride: usize, width: usize, height: usize) {
        for y in 0..height {
            let row = &src[y * stride..y * stride + width];
            for (x, &s) in row.iter().enumerate() {
                self.set(y as i32, x as i32, (s as i16) << 4);
            }
            self.reflect_cols(y as i32, width as i32);
        }

        let h = height as i32;
        self.copy_row(-1, 1);
        self.copy_row(-2, 2);
        self.copy_row(h, h - 2);
        self.copy_row(h + 1, h - 3);
    }

    /// Store the interior back to an 8-bit plane with the fixed-point
    /// rounding bias, saturating to the 8-bit range.
    pub(crate) fn store_u8(&self, dst: &mut [u8], stride: usize, width: usize, height: usize) {
        for y in 0..height {
            for x in 0..width {
                let v = (self.at(y as i32, x as i32) as i32 + 8) >> 4;
                dst[y * stride + x] = v.clamp(0, 255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_plane(width: usize, height: usize) -> Plane {
        Plane::new(luma_rows(height), pitch_for(width), 2, 8)
    }

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..width * height).map(|i| (i * 7 % 251) as u8).collect()
    }

    #[test]
    fn test_load_store_round_trip() {
        let (w, h) = (12, 10);
        let plane = test_plane(w, h);
        let src = gradient(w, h);
        let mut dst = vec![0u8; w * h];

        plane.load_u8(&src, w, w, h);
        plane.store_u8(&mut dst, w, w, h);

        assert_eq!(src, dst);
    }

    #[test]
    fn test_fixed_point_conversion() {
        let plane = test_plane(8, 8);
        plane.load_u8(&[128; 64], 8, 8, 8);
        assert_eq!(plane.at(0, 0), 128 << 4);
        assert_eq!(plane.at(7, 7), 2048);
    }

    #[test]
    fn test_reflections_mirror_without_duplication() {
        let (w, h) = (8, 8);
        let plane = test_plane(w, h);
        plane.load_u8(&gradient(w, h), w, w, h);

        for y in 0..h as i32 {
            assert_eq!(plane.at(y, -1), plane.at(y, 1));
            assert_eq!(plane.at(y, -2), plane.at(y, 2));
            assert_eq!(plane.at(y, 8), plane.at(y, 6));
            assert_eq!(plane.at(y, 9), plane.at(y, 5));
        }
        for x in -2..w as i32 + 2 {
            assert_eq!(plane.at(-1, x), plane.at(1, x));
            assert_eq!(plane.at(-2, x), plane.at(2, x));
            assert_eq!(plane.at(8, x), plane.at(6, x));
            assert_eq!(plane.at(9, x), plane.at(5, x));
        }
    }

    #[test]
    fn test_reflection_idempotence() {
        let (w, h) = (16, 16);
        let plane = test_plane(w, h);
        plane.load_u8(&gradient(w, h), w, w, h);

        let snapshot: Vec<i16> = (-2..h as i32 + 2)
            .flat_map(|y| (-2..w as i32 + 2).map(move |x| (y, x)))
            .map(|(y, x)| plane.at(y, x))
            .collect();

        // Reapplying the reflection step must not change anything.
        for y in 0..h as i32 {
            plane.reflect_cols(y, w as i32);
        }
        plane.copy_row(-1, 1);
        plane.copy_row(-2, 2);
        plane.copy_row(h as i32, h as i32 - 2);
        plane.copy_row(h as i32 + 1, h as i32 - 3);

        let after: Vec<i16> = (-2..h as i32 + 2)
            .flat_map(|y| (-2..w as i32 + 2).map(move |x| (y, x)))
            .map(|(y, x)| plane.at(y, x))
            .collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    fn test_store_saturates() {
        let plane = test_plane(8, 8);
        plane.set(0, 0, 4095 + 512); // above the 8-bit range after narrowing
        plane.set(0, 1, -64);
        let mut dst = vec![0u8; 64];
        plane.store_u8(&mut dst, 8, 8, 8);
        assert_eq!(dst[0], 255);
        assert_eq!(dst[1], 0);
    }
}
