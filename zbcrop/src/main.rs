//! zbcrop — crop a region out of a compressed image.
//!
//! Loads a codec backend module, decodes just the requested window, and
//! re-encodes it. The crop origin can sit anywhere; zenbridge corrects the
//! macroblock alignment underneath.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use zenbridge::{Backend, ChromaSubsampling, CropRect, EncodeConfig, library_filename};

/// Crop a region out of a compressed image through a codec backend.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input image.
    input: PathBuf,

    /// Output file.
    #[arg(short, long, default_value = "crop.jpg")]
    output: PathBuf,

    /// Backend module: a path, or a bare stem like `zenjpeg` resolved to
    /// the platform library name.
    #[arg(short, long, env = "ZENBRIDGE_BACKEND")]
    backend: String,

    /// Region as X,Y,WxH (e.g., 100,100,256x256).
    #[arg(short, long)]
    crop: String,

    /// Quality (0-100).
    #[arg(short, long, default_value_t = 100)]
    quality: u8,

    /// Chroma subsampling.
    #[arg(long, value_enum, default_value = "none")]
    subsampling: SubsamplingArg,
}

/// Chroma subsampling factors.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum SubsamplingArg {
    /// Full resolution chroma (4:4:4).
    None,
    /// Chroma halved horizontally (4:2:2).
    TwoByOne,
    /// Chroma halved both ways (4:2:0).
    TwoByTwo,
}

impl SubsamplingArg {
    fn to_subsampling(self) -> ChromaSubsampling {
        match self {
            SubsamplingArg::None => ChromaSubsampling::None,
            SubsamplingArg::TwoByOne => ChromaSubsampling::TwoByOne,
            SubsamplingArg::TwoByTwo => ChromaSubsampling::TwoByTwo,
        }
    }
}

/// Parse X,Y,WxH into a crop rectangle.
fn parse_crop(spec: &str) -> anyhow::Result<CropRect> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        anyhow::bail!("--crop must be X,Y,WxH (e.g., 100,100,256x256), got: {spec}");
    }
    let x: u32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid x in --crop: {}", parts[0]))?;
    let y: u32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid y in --crop: {}", parts[1]))?;

    let dims: Vec<&str> = parts[2].split('x').collect();
    if dims.len() != 2 {
        anyhow::bail!("--crop size must be WxH (e.g., 256x256), got: {}", parts[2]);
    }
    let w: u32 = dims[0]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in --crop: {}", dims[0]))?;
    let h: u32 = dims[1]
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in --crop: {}", dims[1]))?;

    Ok(CropRect::new(x, y, w, h))
}

/// A spec with a separator or extension is a path; a bare stem maps to the
/// platform library name (`zenjpeg` → `libzenjpeg.so` on Linux).
fn resolve_backend(spec: &str) -> PathBuf {
    if spec.contains(std::path::MAIN_SEPARATOR) || spec.contains('.') {
        PathBuf::from(spec)
    } else {
        PathBuf::from(library_filename(spec))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let crop = parse_crop(&args.crop)?;
    let module = resolve_backend(&args.backend);
    let backend = unsafe { Backend::open(&module) }
        .with_context(|| format!("loading backend {}", module.display()))?;

    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let pixels = backend
        .decode(&data, crop)
        .with_context(|| format!("decoding {}x{} at ({}, {})", crop.w, crop.h, crop.x, crop.y))?;

    let config = EncodeConfig::default()
        .with_quality(args.quality)
        .with_subsampling(args.subsampling.to_subsampling());
    let encoded = backend.encode_with(config, &pixels)?;
    std::fs::write(&args.output, &encoded)
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "{}: {}x{} at ({}, {}) -> {} ({} bytes)",
        args.input.display(),
        crop.w,
        crop.h,
        crop.x,
        crop.y,
        args.output.display(),
        encoded.len()
    );

    drop(encoded);
    backend.close();
    Ok(())
}
