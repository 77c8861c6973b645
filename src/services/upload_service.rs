use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;

use crate::{
    dto::upload::{UploadRequest, UploadResponse},
    error::{AppError, AppResult},
    validation::required_text,
};

/// JPEG quality for stored product photos.
const JPEG_QUALITY: u8 = 85;

/// Longest edge of the generated thumbnail.
const THUMBNAIL_EDGE: u32 = 300;

/// Decode an inline base64 image, re-encode it as JPEG and derive a thumbnail.
/// Everything stays inline: the returned URLs are data URLs, so the storefront
/// needs no object storage for a one-day bazaar.
pub fn process_upload(payload: UploadRequest) -> AppResult<UploadResponse> {
    let image_b64 = required_text(payload.image.as_deref(), "image")?;
    let _filename = required_text(payload.filename.as_deref(), "filename")?;

    let raw = STANDARD
        .decode(strip_data_url_prefix(&image_b64))
        .map_err(|_| AppError::validation("image is not valid base64"))?;

    let img = image::load_from_memory(&raw)
        .map_err(|e| AppError::validation(format!("invalid image: {e}")))?;

    let full = encode_jpeg(&img)?;
    let thumb = encode_jpeg(&img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE))?;

    Ok(UploadResponse {
        image_url: to_data_url(&full),
        thumbnail_url: to_data_url(&thumb),
    })
}

/// Accept both a bare base64 string and a full `data:image/...;base64,` URL.
fn strip_data_url_prefix(input: &str) -> &str {
    match input.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => input,
    }
}

fn encode_jpeg(img: &DynamicImage) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        img.to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode image: {e}")))?;
    }
    Ok(buffer)
}

fn to_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}
