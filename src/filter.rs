//! Filter state and per-frame pipeline orchestration.

use crate::config::DenoiseConfig;
use crate::error::{DenoiseError, Result};
use crate::plane::{band_rows, luma_rows, pitch_for, Plane};
use crate::pool::WorkerPool;
use crate::{smooth, wavelet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Named pipeline stages, dispatched to the worker pool in order.
///
/// Every stage is a full barrier: border reflections written by one
/// worker's row range may be read by a neighboring range in the next stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Directional smoothing, source luma -> result luma.
    Smooth,
    /// Vertical forward pass over the original luma (approximation only).
    VertDecompose,
    /// Horizontal forward pass: coarse band of the original image, stored
    /// back into the (now free) source luma plane.
    HorzDecompose,
    /// Vertical forward pass over the smoothed luma (both bands).
    VertDecomposeSmoothed,
    /// Horizontal forward pass over the smoothed bands, detail band only
    /// (full restore).
    HorzDetail,
    /// Horizontal forward pass emitting both bands (partial restore).
    HorzDetailApprox,
    /// Blend the coarse bands of the original and smoothed images.
    BlendApprox,
    /// Horizontal inverse pass.
    HorzReconstruct,
    /// Vertical inverse pass into the result luma plane.
    VertReconstruct,
}

/// Shared buffers and immutable parameters for one filter instance.
///
/// All planes are allocated once, sized from the frame dimensions, and
/// reused every frame. Within a stage, workers write disjoint row ranges
/// (see the partitioning rules in `pool::split_range` callers); the worker
/// pool's barrier orders those writes before the next stage reads them.
pub(crate) struct PipelineState {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) strength: i32,
    pub(crate) restore: i32,
    pub(crate) radius: u8,
    pub(crate) threads: usize,
    /// Source luma; reused for the coarse band of the original image once
    /// the forward passes have consumed the full-resolution samples.
    pub(crate) luma0: Plane,
    /// Result luma (smoothing output, later the reconstruction output).
    pub(crate) luma1: Plane,
    /// Vertical approximation band.
    pub(crate) bufy0: Plane,
    /// Vertical detail band, offset one row so index -1 is addressable.
    pub(crate) bufy1: Plane,
    /// Horizontal approximation band of the smoothed image.
    pub(crate) bufx0: Plane,
    /// Horizontal detail band of the smoothed image.
    pub(crate) bufx1: Plane,
    /// Per-worker scratch strips for the horizontal passes.
    pub(crate) work: Vec<Plane>,
}

impl PipelineState {
    pub(crate) fn new(
        width: usize,
        height: usize,
        config: &DenoiseConfig,
        threads: usize,
    ) -> Self {
        let pitch = pitch_for(width);
        let luma = luma_rows(height);
        Self {
            width,
            height,
            strength: config.strength as i32,
            restore: config.restore as i32,
            radius: config.radius,
            threads,
            luma0: Plane::new(luma, pitch, 2, 8),
            luma1: Plane::new(luma, pitch, 2, 8),
            bufy0: Plane::new(band_rows(height, 1), pitch, 0, 8),
            bufy1: Plane::new(band_rows(height, 2), pitch, 1, 8),
            bufx0: Plane::new(band_rows(height, 1), pitch, 0, 8),
            bufx1: Plane::new(band_rows(height, 1), pitch, 0, 8),
            work: (0..threads).map(|_| Plane::new(8, pitch, 0, 4)).collect(),
        }
    }

    pub(crate) fn run_stage(&self, stage: Stage, worker: usize) {
        match stage {
            Stage::Smooth => smooth::smooth(self, worker),
            Stage::VertDecompose => wavelet::vert_forward(self, worker, &self.luma0, false),
            Stage::HorzDecompose => wavelet::horz_forward(self, worker, Some(&self.luma0), None),
            Stage::VertDecomposeSmoothed => wavelet::vert_forward(self, worker, &self.luma1, true),
            Stage::HorzDetail => wavelet::horz_forward(self, worker, None, Some(&self.bufx1)),
            Stage::HorzDetailApprox => {
                wavelet::horz_forward(self, worker, Some(&self.bufx0), Some(&self.bufx1))
            }
            Stage::BlendApprox => wavelet::blend_approx(self, worker),
            Stage::HorzReconstruct => wavelet::horz_inverse(self, worker),
            Stage::VertReconstruct => wavelet::vert_inverse(self, worker),
        }
    }
}

/// Mosquito noise reduction filter for 8-bit luma planes.
///
/// A filter instance owns its padded working planes and a fixed pool of
/// worker threads, both created at construction and sized from the frame
/// dimensions; [`process_plane`](Self::process_plane) can then be called
/// once per frame with no further allocation. Output is bit-identical for
/// any worker count.
pub struct MosquitoDenoiser {
    config: DenoiseConfig,
    state: Arc<PipelineState>,
    pool: WorkerPool<Stage>,
}

impl MosquitoDenoiser {
    /// Create a filter for frames of `width` x `height` luma samples.
    ///
    /// Validates the dimensions and configuration, allocates all working
    /// buffers, and spawns the worker threads. Any failure here is fatal;
    /// per-frame processing does not fail in steady state.
    pub fn new(width: u32, height: u32, config: DenoiseConfig) -> Result<Self> {
        if width < 4 || height < 4 {
            return Err(DenoiseError::invalid_dimensions(width, height));
        }
        config.validate()?;

        let threads = config.effective_threads();
        let state = Arc::new(PipelineState::new(
            width as usize,
            height as usize,
            &config,
            threads,
        ));

        let runner = {
            let state = Arc::clone(&state);
            move |stage: Stage, worker: usize| state.run_stage(stage, worker)
        };
        let pool = WorkerPool::new(threads, runner)?;

        debug!(
            width,
            height,
            strength = config.strength,
            restore = config.restore,
            radius = config.radius,
            threads,
            "created mosquito noise reduction filter"
        );

        Ok(Self {
            config,
            state,
            pool,
        })
    }

    /// Configured frame width.
    pub fn width(&self) -> u32 {
        self.state.width as u32
    }

    /// Configured frame height.
    pub fn height(&self) -> u32 {
        self.state.height as u32
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &DenoiseConfig {
        &self.config
    }

    /// Resolved worker thread count.
    pub fn threads(&self) -> usize {
        self.pool.threads()
    }

    /// Denoise one 8-bit luma plane from `src` into `dst`.
    ///
    /// Both planes must hold the configured dimensions at the given row
    /// strides. The host is responsible for chroma planes and color-format
    /// negotiation; this core only touches luma.
    pub fn process_plane(
        &mut self,
        src: &[u8],
        src_stride: usize,
        dst: &mut [u8],
        dst_stride: usize,
    ) -> Result<()> {
        let width = self.state.width;
        let height = self.state.height;
        check_plane(src.len(), src_stride, width, height)?;
        check_plane(dst.len(), dst_stride, width, height)?;

        trace!(width, height, "processing luma plane");

        if self.config.strength == 0 {
            for y in 0..height {
                let s = &src[y * src_stride..y * src_stride + width];
                dst[y * dst_stride..y * dst_stride + width].copy_from_slice(s);
            }
            return Ok(());
        }

        self.state.luma0.load_u8(src, src_stride, width, height);
        self.pool.run(Stage::Smooth);

        if self.config.restore == 0 {
            self.state.luma1.store_u8(dst, dst_stride, width, height);
            return Ok(());
        }

        self.pool.run(Stage::VertDecompose);
        self.pool.run(Stage::HorzDecompose);
        self.pool.run(Stage::VertDecomposeSmoothed);

        if self.config.restore == 128 {
            self.pool.run(Stage::HorzDetail);
        } else {
            self.pool.run(Stage::HorzDetailApprox);
            self.pool.run(Stage::BlendApprox);
        }

        self.pool.run(Stage::HorzReconstruct);
        self.pool.run(Stage::VertReconstruct);

        self.state.luma1.store_u8(dst, dst_stride, width, height);
        Ok(())
    }
}

fn check_plane(len: usize, stride: usize, width: usize, height: usize) -> Result<()> {
    if stride < width {
        return Err(DenoiseError::stride_too_small(stride, width as u32));
    }
    let needed = (height - 1) * stride + width;
    if len < needed {
        return Err(DenoiseError::buffer_too_small(needed, len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_small_dimensions() {
        let err = MosquitoDenoiser::new(3, 16, DenoiseConfig::default());
        assert!(matches!(err, Err(DenoiseError::InvalidDimensions { .. })));
        let err = MosquitoDenoiser::new(16, 2, DenoiseConfig::default());
        assert!(matches!(err, Err(DenoiseError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DenoiseConfig::default().with_strength(40);
        let err = MosquitoDenoiser::new(16, 16, config);
        assert!(matches!(err, Err(DenoiseError::InvalidParameter { .. })));
    }

    #[test]
    fn test_rejects_undersized_buffers() {
        let mut filter = MosquitoDenoiser::new(16, 16, DenoiseConfig::default()).unwrap();
        let src = vec![0u8; 16 * 16];
        let mut dst = vec![0u8; 16 * 16];

        let err = filter.process_plane(&src[..100], 16, &mut dst, 16);
        assert!(matches!(err, Err(DenoiseError::BufferTooSmall { .. })));

        let err = filter.process_plane(&src, 8, &mut dst, 16);
        assert!(matches!(err, Err(DenoiseError::StrideTooSmall { .. })));
    }

    #[test]
    fn test_accessors() {
        let config = DenoiseConfig::default().with_threads(2);
        let filter = MosquitoDenoiser::new(20, 12, config).unwrap();
        assert_eq!(filter.width(), 20);
        assert_eq!(filter.height(), 12);
        assert_eq!(filter.threads(), 2);
        assert_eq!(filter.config().radius, 2);
    }

    #[test]
    fn test_strength_zero_passes_through() {
        let config = DenoiseConfig::default().with_strength(0);
        let mut filter = MosquitoDenoiser::new(8, 8, config).unwrap();
        let src: Vec<u8> = (0..64).map(|i| (i * 3 % 256) as u8).collect();
        let mut dst = vec![0u8; 64];
        filter.process_plane(&src, 8, &mut dst, 8).unwrap();
        assert_eq!(src, dst);
    }
}
