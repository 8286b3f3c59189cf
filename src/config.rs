//! Encoder configuration.

/// Chroma subsampling modes the backend ABI understands.
///
/// Discriminants are the values passed over the ABI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum ChromaSubsampling {
    /// Full chroma resolution (4:4:4).
    #[default]
    None = 0,
    /// Chroma halved horizontally (4:2:2).
    TwoByOne = 1,
    /// Chroma halved in both directions (4:2:0).
    TwoByTwo = 2,
}

/// Encoder settings passed through to the backend.
///
/// Defaults to maximum quality with no subsampling.
///
/// # Example
///
/// ```
/// use zenbridge::{ChromaSubsampling, EncodeConfig};
///
/// let config = EncodeConfig::default()
///     .with_quality(85)
///     .with_subsampling(ChromaSubsampling::TwoByTwo);
/// assert_eq!(config.quality, 85);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeConfig {
    /// Quality, 0-100. Values above 100 are clamped at the call boundary.
    pub quality: u8,
    /// Chroma subsampling mode.
    pub subsampling: ChromaSubsampling,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: 100,
            subsampling: ChromaSubsampling::None,
        }
    }
}

impl EncodeConfig {
    /// Set quality (0-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set the chroma subsampling mode.
    pub fn with_subsampling(mut self, subsampling: ChromaSubsampling) -> Self {
        self.subsampling = subsampling;
        self
    }
}
