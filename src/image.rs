//! Image post-processing: decode, downscale, and re-encode as JPEG.
//!
//! Providers return large PNG or JPEG payloads; [`compress`] shrinks them to
//! a client-friendly size before streaming. The work is pure CPU, so the
//! orchestrator runs it on [`tokio::task::spawn_blocking`].

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::Result;
use crate::GenerationError;

/// Width cap applied during compression. Images are never upscaled.
pub const MAX_WIDTH: u32 = 600;

/// Decode a base64 image, cap its width at [`MAX_WIDTH`] (preserving aspect
/// ratio, never upscaling), and re-encode as JPEG at the given quality.
///
/// Accepts any format the `image` crate can sniff (the providers send PNG or
/// JPEG). Alpha is dropped by the RGB conversion; JPEG has no transparency.
/// Returns the re-encoded bytes as base64.
pub fn compress(b64: &str, quality: u8) -> Result<String> {
    let bytes = BASE64
        .decode(b64.trim())
        .map_err(|e| GenerationError::InvalidImage(format!("base64 decode failed: {}", e)))?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| GenerationError::InvalidImage(format!("could not decode image: {}", e)))?;

    let (width, height) = (img.width(), img.height());
    let resized = if width > MAX_WIDTH {
        let new_height = (height as u64 * MAX_WIDTH as u64 / width as u64) as u32;
        img.resize(MAX_WIDTH, new_height.max(1), FilterType::Triangle)
    } else {
        img
    };

    let rgb = resized.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| GenerationError::InvalidImage(format!("JPEG encode failed: {}", e)))?;

    debug!(
        original_bytes = bytes.len(),
        compressed_bytes = out.len(),
        width = rgb.width(),
        height = rgb.height(),
        quality,
        "image compressed"
    );

    Ok(BASE64.encode(&out))
}

/// Wrap a base64 JPEG payload as a `data:` URI for direct embedding.
pub fn data_uri(b64: &str) -> String {
    format!("data:image/jpeg;base64,{}", b64)
}
