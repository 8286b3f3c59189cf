//! # zenbridge
//!
//! Host-side bridge to dynamically loaded image codec backends.
//!
//! A backend is a shared module exporting three C entry points
//! (`decompress_image`, `compress_image`, `release_buffer`; see [`abi`]).
//! The bridge loads it, resolves the entry points up front, and wraps them
//! in a safe decode/encode surface:
//!
//! - **Cropped decode.** Backends only accept crop origins on macroblock
//!   boundaries (multiples of 8). [`Backend::decode`] takes any origin,
//!   widens the request to the boundary on the left, then compacts each
//!   row in place so the caller sees exactly the rectangle asked for.
//! - **Reusable pixel buffers.** [`Backend::decode_into`] decodes into a
//!   caller-owned [`PixelBuffer`] and only grows its allocation when the
//!   request does not fit.
//! - **Backend-owned output.** Encoding returns an [`EncodedImage`] guard
//!   that hands the bytes back to the backend's `release_buffer` on drop.
//!
//! ```toml
//! [dependencies]
//! zenbridge = "0.1"
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zenbridge::{Backend, CropRect, EncodeConfig};
//!
//! let backend = unsafe { Backend::open("./libzenjpeg.so") }?;
//!
//! let data: &[u8] = &[]; // your compressed image bytes
//!
//! // Decode a 256x256 window at (100, 100). The unaligned origin is
//! // corrected internally: the backend decodes from x = 96 and the four
//! // extra leading columns are compacted away.
//! let pixels = backend.decode(data, CropRect::new(100, 100, 256, 256))?;
//!
//! // Re-encode the window through the same backend.
//! let encoded = backend.encode_with(EncodeConfig::default().with_quality(90), &pixels)?;
//! assert!(!encoded.is_empty());
//! # Ok::<(), zenbridge::BridgeError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod abi;

mod backend;
mod buffer;
mod config;
mod crop;
mod decode;
mod encode;
mod error;
mod loader;

pub use backend::Backend;
pub use buffer::{BYTES_PER_PIXEL, PixelBuffer};
pub use config::{ChromaSubsampling, EncodeConfig};
pub use crop::{CropRect, MACROBLOCK_ALIGN};
pub use encode::EncodedImage;
pub use error::BridgeError;
pub use loader::{Module, library_filename};
