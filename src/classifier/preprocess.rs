//! Fixed resize-and-normalize step in front of the classifier.
//!
//! Decode (JPEG/PNG) → RGB → 224×224 → scale to [0, 1], laid out NHWC to match
//! a Keras-exported model.

use image::imageops::FilterType;
use image::GenericImageView;

use super::ClassifierError;
use crate::config::MODEL_INPUT_SIZE;

/// Reject uploads smaller than any real image header.
pub const MIN_IMAGE_BYTES: usize = 64;
/// Upload size ceiling.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

const CHANNELS: usize = 3;

/// Normalized float image, NHWC with batch size 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub data: Vec<f32>,
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageTensor {
    pub fn shape(&self) -> [usize; 4] {
        [1, self.height, self.width, self.channels]
    }
}

pub fn validate_image_bytes(bytes: &[u8]) -> Result<(), ClassifierError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(ClassifierError::InvalidImage(
            "Image data too small to be valid".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ClassifierError::InvalidImage(format!(
            "Image data exceeds {}MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

pub fn prepare_image(bytes: &[u8]) -> Result<ImageTensor, ClassifierError> {
    validate_image_bytes(bytes)?;

    let img = image::load_from_memory(bytes).map_err(|e| {
        ClassifierError::ImageProcessing(format!("Failed to decode image: {e}"))
    })?;
    let (orig_w, orig_h) = img.dimensions();

    let rgb = img.to_rgb8();
    let side = MODEL_INPUT_SIZE;
    let resized = image::imageops::resize(&rgb, side, side, FilterType::CatmullRom);

    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| f32::from(v) / 255.0)
        .collect();

    tracing::debug!(
        original = format!("{orig_w}x{orig_h}"),
        output = format!("{side}x{side}"),
        "Image prepared for classifier"
    );

    Ok(ImageTensor {
        data,
        height: side as usize,
        width: side as usize,
        channels: CHANNELS,
    })
}
