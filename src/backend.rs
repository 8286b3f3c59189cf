//! A loaded codec backend and its entry points.

use core::fmt;
use std::path::Path;

use log::debug;

use crate::abi::{
    CompressImageFn, DecompressImageFn, ReleaseBufferFn, SYM_COMPRESS, SYM_DECOMPRESS, SYM_RELEASE,
};
use crate::buffer::PixelBuffer;
use crate::config::EncodeConfig;
use crate::crop::CropRect;
use crate::encode::EncodedImage;
use crate::error::BridgeError;
use crate::loader::Module;

/// A codec backend with all entry points resolved.
///
/// Construction is all-or-nothing: a `Backend` only exists once
/// `decompress_image`, `compress_image` and `release_buffer` have all been
/// found, so calls never discover a missing symbol mid-operation.
pub struct Backend {
    pub(crate) decompress: DecompressImageFn,
    pub(crate) compress: CompressImageFn,
    pub(crate) release: ReleaseBufferFn,
    module: Option<Module>,
}

impl Backend {
    /// Loads the module at `path` and resolves the codec entry points.
    ///
    /// # Safety
    ///
    /// Loading a module runs its initialization code, and the resolved
    /// symbols must actually implement the `abi` contract.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let module = unsafe { Module::open(path) }?;
        let decompress = unsafe { module.resolve::<DecompressImageFn>(SYM_DECOMPRESS) }?;
        let compress = unsafe { module.resolve::<CompressImageFn>(SYM_COMPRESS) }?;
        let release = unsafe { module.resolve::<ReleaseBufferFn>(SYM_RELEASE) }?;
        debug!("backend ready: {}", module.path().display());
        Ok(Self {
            decompress,
            compress,
            release,
            module: Some(module),
        })
    }

    /// Builds a backend from entry points that are already in the process,
    /// such as a statically linked codec.
    ///
    /// # Safety
    ///
    /// Each function must implement its `abi` contract and stay valid for
    /// the backend's lifetime.
    pub unsafe fn from_entry_points(
        decompress: DecompressImageFn,
        compress: CompressImageFn,
        release: ReleaseBufferFn,
    ) -> Self {
        Self {
            decompress,
            compress,
            release,
            module: None,
        }
    }

    /// Path of the loaded module, if the backend came from [`Backend::open`].
    #[inline]
    pub fn module_path(&self) -> Option<&Path> {
        self.module.as_ref().map(Module::path)
    }

    /// Decodes the `crop` rectangle of the compressed `data` into a fresh
    /// pixel buffer.
    pub fn decode(&self, data: &[u8], crop: CropRect) -> Result<PixelBuffer, BridgeError> {
        let mut buffer = PixelBuffer::new();
        self.decode_into(data, crop, &mut buffer)?;
        Ok(buffer)
    }

    /// Decodes the `crop` rectangle of `data` into `buffer`, reusing its
    /// allocation where it is already large enough.
    ///
    /// On success the buffer holds exactly `crop.w` by `crop.h` pixels, even
    /// when the crop origin forced a wider aligned decode underneath. On
    /// error the buffer contents are unspecified.
    pub fn decode_into(
        &self,
        data: &[u8],
        crop: CropRect,
        buffer: &mut PixelBuffer,
    ) -> Result<(), BridgeError> {
        crate::decode::decode_into(self, data, crop, buffer)
    }

    /// Encodes `buffer` with the default [`EncodeConfig`].
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<EncodedImage<'_>, BridgeError> {
        self.encode_with(EncodeConfig::default(), buffer)
    }

    /// Encodes `buffer` with an explicit configuration.
    ///
    /// The returned bytes live in backend-owned memory and are handed back
    /// to the backend when the [`EncodedImage`] drops.
    pub fn encode_with(
        &self,
        config: EncodeConfig,
        buffer: &PixelBuffer,
    ) -> Result<EncodedImage<'_>, BridgeError> {
        crate::encode::encode_with(self, config, buffer)
    }

    /// Unloads the backing module, if any.
    ///
    /// Dropping a `Backend` unloads it too; this form only makes the point
    /// in time explicit.
    pub fn close(self) {
        if let Some(module) = self.module {
            module.close();
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "Backend({})", module.path().display()),
            None => f.write_str("Backend(in-process entry points)"),
        }
    }
}
