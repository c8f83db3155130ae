//! # mosquito-nr
//!
//! Mosquito noise reduction for block-compressed video.
//!
//! Mosquito noise is the shimmering ring of artifacts that block-based
//! codecs leave around sharp edges. This crate removes it from the luma
//! channel of a frame with a two-step pipeline:
//!
//! 1. **Directional smoothing**: for every pixel, eight 1-D sampling
//!    directions through the pixel are scored by local variation and the
//!    pixel is blended along the quietest one. Edges are preserved because
//!    the blur always runs *along* the local edge, never across it.
//! 2. **Detail restoration**: a two-level CDF 5/3 integer wavelet
//!    decomposition of both the original and the smoothed image; the coarse
//!    band of the original is mixed back in (weighted by `restore`) and the
//!    result reconstructed, recovering texture the blur took away while the
//!    ringing stays gone.
//!
//! All arithmetic is exact 12-bit fixed point. Frames are processed by a
//! fixed pool of worker threads over contiguous row ranges with a full
//! barrier between pipeline stages, and the output is bit-identical for
//! any thread count, including one.
//!
//! ## Parameters
//!
//! | Parameter  | Range | Default | Meaning |
//! |------------|-------|---------|---------|
//! | `strength` | 0-32  | 16      | blur weight; 0 = pass-through |
//! | `restore`  | 0-128 | 128     | detail restoration weight; 0 = skip wavelets |
//! | `radius`   | 1-2   | 2       | smoothing neighborhood (3x3 or 5x5) |
//! | `threads`  | 0-32  | 0       | worker count; 0 = logical CPUs |
//!
//! ## Quick start
//!
//! ```no_run
//! use mosquito_nr::{DenoiseConfig, MosquitoDenoiser};
//!
//! # fn main() -> mosquito_nr::Result<()> {
//! let config = DenoiseConfig::default().with_strength(20).with_radius(1);
//! let mut filter = MosquitoDenoiser::new(1920, 1080, config)?;
//!
//! let src = vec![0u8; 1920 * 1080];
//! let mut dst = vec![0u8; 1920 * 1080];
//! filter.process_plane(&src, 1920, &mut dst, 1920)?;
//! # Ok(())
//! # }
//! ```
//!
//! This filter only touches luma; copy chroma planes through unchanged. It
//! accepts only 8-bit planar input: the cost arithmetic of the smoothing
//! pass assumes 8-bit samples widened to 12-bit fixed point.

#![allow(clippy::needless_range_loop)]

mod config;
mod error;
mod filter;
mod plane;
mod pool;
mod smooth;
mod wavelet;

pub use config::{DenoiseConfig, MAX_THREADS};
pub use error::{DenoiseError, Result};
pub use filter::MosquitoDenoiser;
