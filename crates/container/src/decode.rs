use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::{instrument, trace};

/// Decode the raw bytes of an entry into pixels.
///
/// The format is sniffed from the leading bytes, falling back to the entry
/// name's extension when the bytes are not recognised. With `autorotate`,
/// embedded orientation metadata is applied so the result is upright; missing
/// or unreadable metadata leaves the pixels as stored.
#[instrument(level = "trace", skip(bytes), fields(size = bytes.len()))]
pub(crate) fn decode(name: &str, bytes: Vec<u8>, autorotate: bool) -> Result<DynamicImage> {
    let failed = || ErrorKind::DecodeFailed(name.to_string());
    let mut reader = ImageReader::new(Cursor::new(bytes));
    if let Ok(format) = ImageFormat::from_path(name) {
        reader.set_format(format);
    }
    // Sniffed content wins over a misleading extension.
    let mut decoder = reader.with_guessed_format().or_raise(failed)?.into_decoder().or_raise(failed)?;
    let orientation = match autorotate {
        true => decoder.orientation().unwrap_or(Orientation::NoTransforms),
        false => Orientation::NoTransforms,
    };
    let mut image = DynamicImage::from_decoder(decoder).or_raise(failed)?;
    if image.width() == 0 || image.height() == 0 {
        exn::bail!(failed());
    }
    if orientation != Orientation::NoTransforms {
        trace!(?orientation, "applying embedded orientation");
        image.apply_orientation(orientation);
    }
    Ok(image)
}
