//! The C ABI shared with codec backend modules.
//!
//! A backend is a shared library exporting three entry points, resolved by
//! exact name when the backend is opened:
//!
//! - [`SYM_DECOMPRESS`]: decode a cropped region whose origin is
//!   macroblock-aligned into a caller-provided buffer.
//! - [`SYM_COMPRESS`]: encode a pixel buffer into a newly allocated byte
//!   sequence, ownership transferred to the caller.
//! - [`SYM_RELEASE`]: free exactly the allocations produced by the same
//!   module's encoder. Keeping release next to the allocation avoids
//!   allocator/deallocator mismatches across the module boundary.
//!
//! Geometry parameters are `i32`, lengths are `usize`, and a `pitch` of 0
//! means rows are tightly packed. Result codes are listed in [`result`].
//! Fallible entry points take a caller-provided scratch buffer (`diag`,
//! `diag_cap`); on failure the backend writes a NUL-terminated UTF-8
//! diagnostic into it, truncated to fit. A null `diag` or zero `diag_cap`
//! declines diagnostics.

/// Entry point name for the cropped decoder.
pub const SYM_DECOMPRESS: &str = "decompress_image";

/// Entry point name for the encoder.
pub const SYM_COMPRESS: &str = "compress_image";

/// Entry point name for the encoder's buffer release routine.
pub const SYM_RELEASE: &str = "release_buffer";

/// Pixel format selector: interleaved 8-bit RGBA, the only format this
/// contract defines.
pub const PIXEL_FORMAT_RGBA8: i32 = 0;

/// Result codes returned by [`DecompressImageFn`] and [`CompressImageFn`].
///
/// Codes the host does not recognize are treated like [`ERR_CODEC`](result::ERR_CODEC).
pub mod result {
    /// Operation completed.
    pub const OK: i32 = 0;
    /// Codec context could not be established.
    pub const ERR_INIT: i32 = 1;
    /// The codec rejected the operation.
    pub const ERR_CODEC: i32 = 2;
    /// An argument was rejected (null pointer, bad geometry, misaligned
    /// crop origin).
    pub const ERR_ARGS: i32 = 3;
}

/// `decompress_image`: decode the `width x height` region at origin
/// `(crop_x, crop_y)` of the compressed image in `data` into `dst`, rows
/// `pitch` bytes apart.
///
/// `crop_x` must be a multiple of the macroblock alignment; a misaligned
/// origin is an argument error. The host's decode engine owns the padding
/// arithmetic and never passes a misaligned origin.
///
/// # Safety
///
/// `data` must be readable for `data_len` bytes and `dst` writable for
/// `max(pitch, width * 4) * height` bytes. If `diag` is non-null it must be
/// writable for `diag_cap` bytes.
pub type DecompressImageFn = unsafe extern "C" fn(
    data: *const u8,
    data_len: usize,
    dst: *mut u8,
    width: i32,
    pitch: i32,
    height: i32,
    crop_x: i32,
    crop_y: i32,
    pixel_format: i32,
    diag: *mut u8,
    diag_cap: usize,
) -> i32;

/// `compress_image`: encode `width x height` pixels into a newly allocated
/// byte sequence, stored through `out_buf`/`out_len` on success.
///
/// The allocation must be released through the same module's
/// `release_buffer`. `subsampling` and `quality` follow
/// [`ChromaSubsampling`](crate::ChromaSubsampling) discriminants and the
/// 0-100 quality scale.
///
/// # Safety
///
/// `pixels` must be readable for `max(pitch, width * 4) * height` bytes;
/// `out_buf` and `out_len` must be writable. If `diag` is non-null it must
/// be writable for `diag_cap` bytes.
pub type CompressImageFn = unsafe extern "C" fn(
    out_buf: *mut *mut u8,
    out_len: *mut usize,
    pixels: *const u8,
    width: i32,
    pitch: i32,
    height: i32,
    pixel_format: i32,
    subsampling: i32,
    quality: i32,
    diag: *mut u8,
    diag_cap: usize,
) -> i32;

/// `release_buffer`: free an allocation produced by the same module's
/// `compress_image`. `len` is the length reported at allocation. A null
/// `buf` is a no-op.
///
/// # Safety
///
/// `buf` must be null or a pointer obtained from this module's encoder that
/// has not already been released.
pub type ReleaseBufferFn = unsafe extern "C" fn(buf: *mut u8, len: usize);

/// Bytes the host reserves on the stack for backend diagnostics.
pub(crate) const DIAG_CAP: usize = 256;

/// Decode a diagnostic scratch buffer after a failed call.
///
/// Takes everything up to the first NUL (the whole buffer if the backend
/// forgot to terminate) and substitutes a fixed message when the backend
/// wrote nothing.
pub(crate) fn diag_message(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    if end == 0 {
        return "backend reported no diagnostic".into();
    }
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
