//! Client side: turns an image and a label into one `POST /upload` call.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::dtos::UploadDto;

pub const DEFAULT_QUALITY: u8 = 75;
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/upload";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, PartialEq)]
pub enum UploadOutcome {
    Uploaded,
    Rejected { status: StatusCode, body: String },
}

/// Drops alpha, palette, grayscale and wide channels down to 8-bit RGB.
pub fn normalize(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, UploadError> {
    let rgb = normalize(image);
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut bytes), quality);
    encoder.encode_image(&rgb)?;
    Ok(bytes)
}

/// Local wall-clock time in ISO-8601 with microseconds.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

pub fn build_payload(
    image: &DynamicImage,
    name: &str,
    quality: u8,
    timestamp: String,
) -> Result<UploadDto, UploadError> {
    let jpeg = encode_jpeg(image, quality)?;
    debug!(bytes = jpeg.len(), "encoded jpeg");
    Ok(UploadDto {
        image: STANDARD.encode(jpeg),
        name: name.to_string(),
        timestamp,
    })
}

pub fn upload(client: &Client, url: &str, payload: &UploadDto) -> Result<UploadOutcome, UploadError> {
    let response = client.post(url).json(payload).send()?;
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(UploadOutcome::Uploaded);
    }
    let body = response.text()?;
    Ok(UploadOutcome::Rejected { status, body })
}

/// Reads the image at `path` and uploads it under `name`.
pub fn upload_image(
    path: &Path,
    name: &str,
    url: &str,
    quality: u8,
) -> Result<UploadOutcome, UploadError> {
    let image = image::open(path)?;
    let payload = build_payload(&image, name, quality, timestamp_now())?;
    upload(&Client::new(), url, &payload)
}
