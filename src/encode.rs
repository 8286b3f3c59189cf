//! The encode engine and encoded-output ownership.

use core::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::slice;

use log::trace;

use crate::abi::{self, DIAG_CAP, PIXEL_FORMAT_RGBA8};
use crate::backend::Backend;
use crate::buffer::PixelBuffer;
use crate::config::EncodeConfig;
use crate::error::BridgeError;

/// Compressed bytes allocated by a backend.
///
/// Dereferences to `&[u8]`. The allocation is released through the owning
/// backend's `release_buffer` entry point on drop, and the borrow keeps
/// that backend (and its module) loaded for the guard's lifetime.
pub struct EncodedImage<'b> {
    ptr: NonNull<u8>,
    len: usize,
    backend: &'b Backend,
}

// The allocation is exclusively owned by this guard and the backend's
// entry points are callable from any thread.
unsafe impl Send for EncodedImage<'_> {}
unsafe impl Sync for EncodedImage<'_> {}

impl Deref for EncodedImage<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: ptr/len describe the backend's live allocation, untouched
        // until drop.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl AsRef<[u8]> for EncodedImage<'_> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl fmt::Debug for EncodedImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedImage({} bytes)", self.len)
    }
}

impl Drop for EncodedImage<'_> {
    fn drop(&mut self) {
        // SAFETY: the pointer came from this backend's encoder with this
        // length and is released exactly once.
        unsafe { (self.backend.release)(self.ptr.as_ptr(), self.len) }
    }
}

pub(crate) fn encode_with<'b>(
    backend: &'b Backend,
    config: EncodeConfig,
    buffer: &PixelBuffer,
) -> Result<EncodedImage<'b>, BridgeError> {
    if buffer.is_empty() {
        return Err(BridgeError::EmptyImage);
    }
    let width = i32::try_from(buffer.width()).map_err(|_| too_large(buffer))?;
    let height = i32::try_from(buffer.height()).map_err(|_| too_large(buffer))?;

    trace!(
        "encode {}x{}: quality {}, subsampling {:?}",
        buffer.width(),
        buffer.height(),
        config.quality,
        config.subsampling
    );

    let mut out_buf: *mut u8 = std::ptr::null_mut();
    let mut out_len: usize = 0;
    let mut diag = [0u8; DIAG_CAP];
    // SAFETY: the entry point conforms to the abi contract (upheld by
    // whoever built the Backend); pixels spans width * height * 4 bytes and
    // pitch 0 selects tightly packed rows.
    let code = unsafe {
        (backend.compress)(
            &mut out_buf,
            &mut out_len,
            buffer.as_bytes().as_ptr(),
            width,
            0,
            height,
            PIXEL_FORMAT_RGBA8,
            config.subsampling as i32,
            i32::from(config.quality.min(100)),
            diag.as_mut_ptr(),
            diag.len(),
        )
    };
    match code {
        abi::result::OK => {}
        abi::result::ERR_INIT => return Err(BridgeError::CodecInit),
        _ => return Err(BridgeError::Encode(abi::diag_message(&diag))),
    }

    // A success report with no output is a broken backend, not a valid
    // empty encoding.
    let Some(ptr) = NonNull::new(out_buf) else {
        return Err(BridgeError::Encode(
            "backend returned no output buffer".into(),
        ));
    };
    if out_len == 0 {
        // SAFETY: hand the claimed allocation straight back so it cannot leak.
        unsafe { (backend.release)(ptr.as_ptr(), 0) };
        return Err(BridgeError::Encode(
            "backend returned an empty output buffer".into(),
        ));
    }

    Ok(EncodedImage {
        ptr,
        len: out_len,
        backend,
    })
}

fn too_large(buffer: &PixelBuffer) -> BridgeError {
    BridgeError::DimensionsTooLarge {
        width: buffer.width(),
        height: buffer.height(),
    }
}
