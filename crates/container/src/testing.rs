//! Fixture builders shared by this crate's unit tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Encode a solid-colour PNG.
pub(crate) fn png(width: u32, height: u32, colour: Rgb<u8>) -> Vec<u8> {
    encode(&DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, colour)))
}

/// Encode a PNG whose brightness increases from left to right.
pub(crate) fn gradient_png(width: u32, height: u32) -> Vec<u8> {
    encode(&DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        let value = (x * 255 / (width - 1)) as u8;
        Rgb([value, value, value])
    })))
}

fn encode(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Write a zip archive with the given members. Names ending in `/` become
/// directory entries.
pub(crate) fn write_zip(path: &Path, members: &[(&str, Vec<u8>)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, bytes) in members {
        if name.ends_with('/') {
            writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            continue;
        }
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// Write each member as a file inside `dir`.
pub(crate) fn write_dir(dir: &Path, members: &[(&str, Vec<u8>)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, bytes) in members {
        fs::write(dir.join(name), bytes).unwrap();
    }
}
