//! Unified error types for backend loading and codec calls.

use std::collections::TryReserveError;
use std::path::PathBuf;

/// Unified error type for backend and codec operations.
///
/// Failures carry enough context to tell a bad input image apart from a
/// missing or incompatible backend module. None of these conditions are
/// transient; the library never retries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// Backend module failed to load (missing file, architecture mismatch,
    /// unresolved link dependencies).
    #[error("backend unavailable: {}", path.display())]
    Unavailable {
        /// Path the load was attempted from.
        path: PathBuf,
        /// Loader error from the platform mechanism.
        #[source]
        source: libloading::Error,
    },
    /// Required entry point missing from an otherwise-loaded module.
    #[error("entry point `{name}` not found in backend module")]
    SymbolNotFound {
        /// The entry point that could not be resolved.
        name: &'static str,
        /// Loader error from the platform mechanism. `None` when the export
        /// exists but resolved to a null address.
        #[source]
        source: Option<libloading::Error>,
    },
    /// Backend could not establish an internal codec context.
    #[error("backend could not establish a codec context")]
    CodecInit,
    /// Backend rejected a decode operation; carries its diagnostic.
    #[error("decode failed: {0}")]
    Decode(String),
    /// Backend rejected an encode operation; carries its diagnostic.
    #[error("encode failed: {0}")]
    Encode(String),
    /// Pixel buffer memory could not be allocated.
    #[error("pixel buffer allocation failed")]
    AllocationFailed(#[source] TryReserveError),
    /// Crop rectangle has zero width or height.
    #[error("crop rectangle is empty")]
    EmptyCrop,
    /// Pixel buffer passed to encode has zero width or height.
    #[error("pixel buffer is empty")]
    EmptyImage,
    /// Requested geometry exceeds what buffers or the backend ABI can address.
    #[error("image dimensions {width}x{height} are too large")]
    DimensionsTooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// Crop origin lies outside the range the backend ABI can address.
    #[error("crop origin ({x}, {y}) is too large")]
    CropOriginTooLarge {
        /// Requested horizontal origin in pixels.
        x: u32,
        /// Requested vertical origin in pixels.
        y: u32,
    },
}
