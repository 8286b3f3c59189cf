//! The decode-with-crop engine.
//!
//! Codec backends can only begin a cropped decode at horizontal offsets
//! that are multiples of [`MACROBLOCK_ALIGN`](crate::MACROBLOCK_ALIGN). For
//! an arbitrary requested origin the engine decodes a region widened by
//! `x mod 8` columns starting from the nearest aligned offset, then shifts
//! every row left in place to discard the extra leading columns. The
//! buffer's logical extent is truncated to the requested rectangle; the
//! allocation keeps the padding columns.

use log::trace;

use crate::abi::{self, DIAG_CAP, PIXEL_FORMAT_RGBA8};
use crate::backend::Backend;
use crate::buffer::{BYTES_PER_PIXEL, PixelBuffer};
use crate::crop::CropRect;
use crate::error::BridgeError;

pub(crate) fn decode_into(
    backend: &Backend,
    data: &[u8],
    crop: CropRect,
    buffer: &mut PixelBuffer,
) -> Result<(), BridgeError> {
    crop.validate()?;

    let padding = crop.padding();
    let padded_w = crop.w.checked_add(padding).ok_or(too_large(crop))?;

    // The ABI carries geometry as i32.
    let width = i32::try_from(padded_w).map_err(|_| too_large(crop))?;
    let height = i32::try_from(crop.h).map_err(|_| too_large(crop))?;
    let crop_x = i32::try_from(crop.aligned_x()).map_err(|_| origin_too_large(crop))?;
    let crop_y = i32::try_from(crop.y).map_err(|_| origin_too_large(crop))?;

    buffer.resize(padded_w, crop.h)?;

    trace!(
        "decode crop {}x{} at ({}, {}): padding {}, oversized width {}",
        crop.w, crop.h, crop.x, crop.y, padding, padded_w
    );

    let mut diag = [0u8; DIAG_CAP];
    // SAFETY: the entry point conforms to the abi contract (upheld by
    // whoever built the Backend); dst spans width * height * 4 bytes after
    // the resize above, and pitch 0 selects tightly packed rows.
    let code = unsafe {
        (backend.decompress)(
            data.as_ptr(),
            data.len(),
            buffer.as_bytes_mut().as_mut_ptr(),
            width,
            0,
            height,
            crop_x,
            crop_y,
            PIXEL_FORMAT_RGBA8,
            diag.as_mut_ptr(),
            diag.len(),
        )
    };
    match code {
        abi::result::OK => {}
        abi::result::ERR_INIT => return Err(BridgeError::CodecInit),
        _ => return Err(BridgeError::Decode(abi::diag_message(&diag))),
    }

    if padding > 0 {
        compact_rows(
            buffer.as_bytes_mut(),
            crop.w as usize,
            crop.h as usize,
            padding as usize,
        );
    }
    buffer.truncate_width(crop.w);

    Ok(())
}

fn too_large(crop: CropRect) -> BridgeError {
    BridgeError::DimensionsTooLarge {
        width: crop.w,
        height: crop.h,
    }
}

fn origin_too_large(crop: CropRect) -> BridgeError {
    BridgeError::CropOriginTooLarge {
        x: crop.x,
        y: crop.y,
    }
}

/// Left-shift each row in place, discarding `padding` leading pixels.
///
/// On entry `data` holds `height` rows of `width + padding` pixels; on
/// return its first `width * height * 4` bytes are the tightly packed
/// `width`-wide image. Rows are processed top down, so every read offset
/// is at or ahead of its write offset; within a row the ranges can
/// overlap, which `copy_within` permits.
pub(crate) fn compact_rows(data: &mut [u8], width: usize, height: usize, padding: usize) {
    if padding == 0 {
        return;
    }
    let dst_pitch = width * BYTES_PER_PIXEL;
    let src_pitch = (width + padding) * BYTES_PER_PIXEL;
    let lead = padding * BYTES_PER_PIXEL;
    for row in 0..height {
        let src = row * src_pitch + lead;
        let dst = row * dst_pitch;
        data.copy_within(src..src + dst_pitch, dst);
    }
}
