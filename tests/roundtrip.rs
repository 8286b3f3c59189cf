//! End-to-end decode/encode against an in-process mock backend.
//!
//! The mock implements the full `zenbridge::abi` contract over a trivial
//! container: a 12-byte header (`MCK1`, width, height, little endian)
//! optionally followed by raw RGBA rows. With no payload it synthesizes a
//! gradient whose pixels encode their own source coordinates, which makes
//! misplaced rows and columns show up as concrete value mismatches.

use std::sync::atomic::{AtomicUsize, Ordering};

use zenbridge::abi::result;
use zenbridge::{
    BYTES_PER_PIXEL, Backend, BridgeError, ChromaSubsampling, CropRect, EncodeConfig, PixelBuffer,
};

const MAGIC: &[u8; 4] = b"MCK1";
const HEADER_LEN: usize = 12;

fn mock_image(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN);
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data
}

/// Pixel the gradient source holds at (x, y), in source coordinates.
fn gradient_pixel(x: u32, y: u32) -> [u8; 4] {
    [x as u8, y as u8, (x >> 8) as u8, (y >> 8) as u8]
}

fn expected_window(x0: u32, y0: u32, w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h) as usize * BYTES_PER_PIXEL);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            out.extend_from_slice(&gradient_pixel(x, y));
        }
    }
    out
}

unsafe fn write_diag(diag: *mut u8, diag_cap: usize, msg: &str) {
    if diag.is_null() || diag_cap == 0 {
        return;
    }
    let n = msg.len().min(diag_cap - 1);
    unsafe {
        std::ptr::copy_nonoverlapping(msg.as_ptr(), diag, n);
        *diag.add(n) = 0;
    }
}

unsafe extern "C" fn mock_decompress(
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
) -> i32 {
    if data.is_null() || dst.is_null() || width <= 0 || height <= 0 || crop_x < 0 || crop_y < 0 {
        return result::ERR_ARGS;
    }
    if pixel_format != 0 {
        unsafe { write_diag(diag, diag_cap, "unsupported pixel format") };
        return result::ERR_ARGS;
    }
    // Real codecs only seek to macroblock boundaries; reject anything else
    // so a broken alignment correction cannot pass unnoticed.
    if crop_x % 8 != 0 {
        unsafe { write_diag(diag, diag_cap, "misaligned crop origin") };
        return result::ERR_ARGS;
    }

    let data = unsafe { std::slice::from_raw_parts(data, data_len) };
    if data.len() < HEADER_LEN || &data[..4] != MAGIC {
        unsafe { write_diag(diag, diag_cap, "bad magic") };
        return result::ERR_CODEC;
    }
    let src_w = u32::from_le_bytes(data[4..8].try_into().unwrap());
    let src_h = u32::from_le_bytes(data[8..12].try_into().unwrap());
    let payload = &data[HEADER_LEN..];
    if !payload.is_empty() && payload.len() != (src_w * src_h) as usize * BYTES_PER_PIXEL {
        unsafe { write_diag(diag, diag_cap, "truncated payload") };
        return result::ERR_CODEC;
    }

    let (width, height) = (width as u32, height as u32);
    let (crop_x, crop_y) = (crop_x as u32, crop_y as u32);
    if crop_x + width > src_w || crop_y + height > src_h {
        unsafe { write_diag(diag, diag_cap, "crop outside image") };
        return result::ERR_CODEC;
    }

    let pitch = if pitch == 0 {
        width as usize * BYTES_PER_PIXEL
    } else {
        pitch as usize
    };
    for y in 0..height {
        for x in 0..width {
            let (sx, sy) = (crop_x + x, crop_y + y);
            let px = if payload.is_empty() {
                gradient_pixel(sx, sy)
            } else {
                let off = (sy * src_w + sx) as usize * BYTES_PER_PIXEL;
                [payload[off], payload[off + 1], payload[off + 2], payload[off + 3]]
            };
            let out = y as usize * pitch + x as usize * BYTES_PER_PIXEL;
            unsafe { std::ptr::copy_nonoverlapping(px.as_ptr(), dst.add(out), BYTES_PER_PIXEL) };
        }
    }
    result::OK
}

unsafe extern "C" fn mock_compress(
    out_buf: *mut *mut u8,
    out_len: *mut usize,
    pixels: *const u8,
    width: i32,
    pitch: i32,
    height: i32,
    pixel_format: i32,
    _subsampling: i32,
    _quality: i32,
    diag: *mut u8,
    diag_cap: usize,
) -> i32 {
    if out_buf.is_null() || out_len.is_null() || pixels.is_null() || width <= 0 || height <= 0 {
        return result::ERR_ARGS;
    }
    if pixel_format != 0 {
        unsafe { write_diag(diag, diag_cap, "unsupported pixel format") };
        return result::ERR_ARGS;
    }
    let (w, h) = (width as usize, height as usize);
    let pitch = if pitch == 0 { w * BYTES_PER_PIXEL } else { pitch as usize };

    let mut data = mock_image(width as u32, height as u32);
    for y in 0..h {
        let row = unsafe { std::slice::from_raw_parts(pixels.add(y * pitch), w * BYTES_PER_PIXEL) };
        data.extend_from_slice(row);
    }
    let len = data.len();
    let raw = Box::into_raw(data.into_boxed_slice());
    unsafe {
        *out_buf = raw.cast::<u8>();
        *out_len = len;
    }
    result::OK
}

unsafe extern "C" fn mock_release(buf: *mut u8, len: usize) {
    if buf.is_null() {
        return;
    }
    // Reconstruct the Box<[u8]> handed out by mock_compress.
    unsafe { drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(buf, len))) };
}

static RELEASED: AtomicUsize = AtomicUsize::new(0);

unsafe extern "C" fn counting_release(buf: *mut u8, len: usize) {
    RELEASED.fetch_add(1, Ordering::SeqCst);
    unsafe { mock_release(buf, len) };
}

fn backend() -> Backend {
    unsafe { Backend::from_entry_points(mock_decompress, mock_compress, mock_release) }
}

#[test]
fn decodes_requested_rectangle() {
    let backend = backend();
    let data = mock_image(4096, 3072);
    let window = backend
        .decode(&data, CropRect::new(100, 100, 256, 256))
        .unwrap();

    assert_eq!(window.width(), 256);
    assert_eq!(window.height(), 256);
    assert_eq!(window.as_bytes().len(), 256 * 256 * BYTES_PER_PIXEL);
    // x = 100 forces a decode from x = 96, four pixels wider per row.
    assert!(window.capacity() >= 260 * 256 * BYTES_PER_PIXEL);

    let px = window.as_pixels()[0];
    assert_eq!([px.r, px.g, px.b, px.a], gradient_pixel(100, 100));
    let px = window.as_pixels()[255 * 256 + 255];
    assert_eq!([px.r, px.g, px.b, px.a], gradient_pixel(355, 355));

    let encoded = backend.encode(&window).unwrap();
    assert!(!encoded.is_empty());
    let reread = backend
        .decode(&encoded, CropRect::new(0, 0, 256, 256))
        .unwrap();
    assert_eq!(reread.as_bytes(), window.as_bytes());
}

#[test]
fn any_crop_origin_yields_the_same_window() {
    let data = mock_image(512, 256);
    let backend = backend();
    for offset in 0..8 {
        let x = 96 + offset;
        let window = backend.decode(&data, CropRect::new(x, 50, 64, 16)).unwrap();
        assert_eq!(window.width(), 64, "origin x = {x}");
        assert_eq!(window.height(), 16, "origin x = {x}");
        assert_eq!(window.as_bytes(), &expected_window(x, 50, 64, 16)[..], "origin x = {x}");
    }
}

#[test]
fn narrow_crop_with_large_padding() {
    let data = mock_image(64, 64);
    let window = backend().decode(&data, CropRect::new(5, 3, 7, 6)).unwrap();
    assert_eq!(window.as_bytes(), &expected_window(5, 3, 7, 6)[..]);
}

#[test]
fn reencode_roundtrip_preserves_pixels() {
    let backend = backend();
    let source = mock_image(512, 256);
    let mut window = backend
        .decode(&source, CropRect::new(100, 100, 64, 32))
        .unwrap();
    window.as_pixels_mut()[0].r = 7;

    let config = EncodeConfig::default()
        .with_quality(90)
        .with_subsampling(ChromaSubsampling::TwoByTwo);
    let encoded = backend.encode_with(config, &window).unwrap();
    assert_eq!(encoded.len(), HEADER_LEN + 64 * 32 * BYTES_PER_PIXEL);

    let reread = backend.decode(&encoded, CropRect::new(0, 0, 64, 32)).unwrap();
    assert_eq!(reread.as_bytes(), window.as_bytes());
}

#[test]
fn release_buffer_called_once_per_encode() {
    let backend =
        unsafe { Backend::from_entry_points(mock_decompress, mock_compress, counting_release) };
    let window = backend
        .decode(&mock_image(64, 64), CropRect::new(0, 0, 16, 16))
        .unwrap();

    let before = RELEASED.load(Ordering::SeqCst);
    let encoded = backend.encode(&window).unwrap();
    assert_eq!(RELEASED.load(Ordering::SeqCst), before);
    drop(encoded);
    assert_eq!(RELEASED.load(Ordering::SeqCst), before + 1);
}

#[test]
fn decode_into_reuses_the_allocation() {
    let backend = backend();
    let data = mock_image(512, 256);
    let mut buffer = PixelBuffer::new();
    backend
        .decode_into(&data, CropRect::new(0, 0, 128, 128), &mut buffer)
        .unwrap();
    let cap = buffer.capacity();

    backend
        .decode_into(&data, CropRect::new(13, 7, 32, 32), &mut buffer)
        .unwrap();
    assert_eq!(buffer.width(), 32);
    assert_eq!(buffer.height(), 32);
    assert_eq!(buffer.capacity(), cap);
    assert_eq!(buffer.as_bytes(), &expected_window(13, 7, 32, 32)[..]);
}

#[test]
fn empty_crop_rejected() {
    let data = mock_image(64, 64);
    let err = backend().decode(&data, CropRect::new(0, 0, 0, 16)).unwrap_err();
    assert!(matches!(err, BridgeError::EmptyCrop));
}

#[test]
fn oversized_geometry_rejected() {
    let data = mock_image(64, 64);
    let err = backend()
        .decode(&data, CropRect::new(0, 0, u32::MAX, 8))
        .unwrap_err();
    assert!(matches!(err, BridgeError::DimensionsTooLarge { .. }));
}

#[test]
fn oversized_origin_rejected() {
    let data = mock_image(64, 64);
    let err = backend()
        .decode(&data, CropRect::new(u32::MAX, 0, 8, 8))
        .unwrap_err();
    match err {
        BridgeError::CropOriginTooLarge { x, y } => assert_eq!((x, y), (u32::MAX, 0)),
        other => panic!("expected CropOriginTooLarge, got {other:?}"),
    }
}

#[test]
fn backend_error_carries_diagnostic() {
    let err = backend()
        .decode(b"not a mock image", CropRect::new(0, 0, 8, 8))
        .unwrap_err();
    match err {
        BridgeError::Decode(msg) => assert!(msg.contains("bad magic"), "{msg}"),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[test]
fn out_of_bounds_crop_is_a_backend_error() {
    let data = mock_image(64, 64);
    let err = backend()
        .decode(&data, CropRect::new(0, 0, 128, 128))
        .unwrap_err();
    match err {
        BridgeError::Decode(msg) => assert!(msg.contains("crop outside image"), "{msg}"),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[test]
fn backend_debug_states_its_provenance() {
    assert_eq!(format!("{:?}", backend()), "Backend(in-process entry points)");
}
