//! Conversion between [`ImageContainer`] and the `image` crate.
//!
//! Only 8-bit grayscale is supported: a `GrayImage` of `w × h` pixels maps to
//! an `ImageContainer<u8, 2>` over `[(0, 0)..(w - 1, h - 1)]`, with the first
//! coordinate being the column.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, ImageReader, Luma};

use super::{Image, ImageContainer};
use crate::domain::{Domain, Point};
use crate::error::TileError;

impl ImageContainer<u8, 2> {
    /// Copy a grayscale image into a container.
    pub fn from_gray_image(source: &GrayImage) -> Result<Self, TileError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(TileError::Decode {
                message: format!("image has no pixels ({}x{})", width, height),
            });
        }

        let domain = Domain::new(
            Point::new([0, 0]),
            Point::new([i64::from(width) - 1, i64::from(height) - 1]),
        );
        let data = source.as_raw().clone();

        ImageContainer::from_vec(domain, data).ok_or_else(|| TileError::Decode {
            message: "pixel buffer does not match image dimensions".to_string(),
        })
    }

    /// Copy the container into a grayscale image.
    ///
    /// The container's lower corner becomes pixel `(0, 0)`.
    pub fn to_gray_image(&self) -> Result<GrayImage, TileError> {
        let domain = *self.domain();
        let [width, height] = domain
            .extent()
            .ok_or_else(|| TileError::SizeOverflow(domain.to_string()))?;
        let width = u32::try_from(width).map_err(|_| TileError::SizeOverflow(domain.to_string()))?;
        let height =
            u32::try_from(height).map_err(|_| TileError::SizeOverflow(domain.to_string()))?;

        let lower = *domain.lower();
        Ok(GrayImage::from_fn(width, height, |x, y| {
            Luma([self.get(&Point::new([
                lower[0] + i64::from(x),
                lower[1] + i64::from(y),
            ]))])
        }))
    }
}

/// Decode an image file as 8-bit grayscale.
pub fn load_gray_jpeg(path: impl AsRef<Path>) -> Result<ImageContainer<u8, 2>, TileError> {
    let reader = ImageReader::open(path.as_ref())?.with_guessed_format()?;
    let decoded = reader.decode().map_err(|e| TileError::Decode {
        message: e.to_string(),
    })?;

    ImageContainer::from_gray_image(&decoded.to_luma8())
}

/// Encode a grayscale container as a JPEG file.
///
/// `quality` is clamped to 1-100.
pub fn save_gray_jpeg(
    image: &ImageContainer<u8, 2>,
    path: impl AsRef<Path>,
    quality: u8,
) -> Result<(), TileError> {
    let gray = image.to_gray_image()?;
    let mut writer = BufWriter::new(File::create(path.as_ref())?);

    JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
        .encode_image(&gray)
        .map_err(|e| TileError::Encode {
            message: e.to_string(),
        })?;

    writer.flush()?;
    Ok(())
}
