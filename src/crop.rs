//! Crop rectangles and macroblock alignment arithmetic.

use crate::error::BridgeError;

/// Horizontal alignment the codec imposes on cropped decode origins.
///
/// Backends can only begin a cropped decode at x offsets that are multiples
/// of this block size.
pub const MACROBLOCK_ALIGN: u32 = 8;

/// A rectangular region of the source image, in source pixel coordinates.
///
/// `(x, y)` is the top-left corner; `w` and `h` are the extracted size.
/// The rectangle must be non-empty ([`validate`](Self::validate)). Whether
/// it lies inside the source image is not checked here: the host never
/// parses the compressed stream, so an out-of-bounds origin surfaces as a
/// decode error from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Origin x, in source pixels.
    pub x: u32,
    /// Origin y, in source pixels.
    pub y: u32,
    /// Width of the extracted region.
    pub w: u32,
    /// Height of the extracted region.
    pub h: u32,
}

impl CropRect {
    /// Create a crop rectangle.
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Columns between the requested origin and the nearest lower aligned
    /// offset (`x mod 8`).
    ///
    /// This many extra leading columns must be decoded and then discarded
    /// by row compaction.
    #[inline]
    pub const fn padding(&self) -> u32 {
        self.x % MACROBLOCK_ALIGN
    }

    /// The aligned origin the backend actually decodes from.
    #[inline]
    pub const fn aligned_x(&self) -> u32 {
        self.x - self.padding()
    }

    /// Reject empty rectangles.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.w == 0 || self.h == 0 {
            return Err(BridgeError::EmptyCrop);
        }
        Ok(())
    }
}
