//! Owned RGBA pixel storage.
//!
//! [`PixelBuffer`] owns one contiguous allocation of `width * height * 4`
//! bytes in row-major, top-to-bottom, interleaved RGBA order. Sizing is
//! fallible (checked byte arithmetic, fallible reservation) so oversized
//! requests surface as errors instead of aborts. Typed views use
//! `rgb::Rgba<u8>` pixels through `imgref`.

use core::fmt;

use imgref::ImgRef;
use rgb::Rgba;

use crate::error::BridgeError;

/// Bytes per pixel in the interleaved RGBA layout.
pub const BYTES_PER_PIXEL: usize = 4;

/// Owned pixel buffer in interleaved RGBA order.
///
/// Once sized for `(width, height)`, the backing memory addresses every
/// pixel `(x, y)` with `x < width`, `y < height`. The allocation can be
/// larger than the logical extent after a padded decode; only the first
/// `width * height * 4` bytes are valid pixels.
#[derive(Default)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create an empty (0x0) buffer with no allocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-filled buffer for the given dimensions.
    pub fn with_size(width: u32, height: u32) -> Result<Self, BridgeError> {
        let mut buffer = Self::new();
        buffer.resize(width, height)?;
        Ok(buffer)
    }

    /// (Re)size the buffer to `width * height * 4` bytes.
    ///
    /// Prior contents are not guaranteed preserved. Growing reuses the
    /// existing allocation when it is large enough; shrinking never
    /// releases memory.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), BridgeError> {
        let len = byte_len(width, height)?;
        if len > self.data.capacity() {
            let additional = len - self.data.len();
            self.data
                .try_reserve_exact(additional)
                .map_err(BridgeError::AllocationFailed)?;
        }
        self.data.resize(len, 0);
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the buffer has a degenerate (zero-area) extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size of the backing allocation in bytes.
    ///
    /// After a decode with a non-aligned origin this exceeds
    /// `width * height * 4`; the tail is not valid pixel data.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The full pixel extent as raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The full pixel extent as mutable raw bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The pixels as a typed slice.
    pub fn as_pixels(&self) -> &[Rgba<u8>] {
        bytemuck::cast_slice(&self.data)
    }

    /// The pixels as a mutable typed slice.
    pub fn as_pixels_mut(&mut self) -> &mut [Rgba<u8>] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Borrow the buffer as a typed 2D view.
    pub fn as_imgref(&self) -> ImgRef<'_, Rgba<u8>> {
        imgref::Img::new(self.as_pixels(), self.width as usize, self.height as usize)
    }

    /// Bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.height, "row {} out of range for height {}", y, self.height);
        let pitch = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * pitch;
        &self.data[start..start + pitch]
    }

    /// Shrink the logical width without touching the allocation.
    ///
    /// Used after in-place row compaction: the leading `new_width` pixels
    /// of each row are already contiguous, so the byte length drops to
    /// `new_width * height * 4` while capacity keeps the padded decode's
    /// extra columns.
    pub(crate) fn truncate_width(&mut self, new_width: u32) {
        debug_assert!(new_width <= self.width);
        let len = new_width as usize * self.height as usize * BYTES_PER_PIXEL;
        self.data.truncate(len);
        self.width = new_width;
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{} rgba8, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, BridgeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
        .ok_or(BridgeError::DimensionsTooLarge { width, height })
}
