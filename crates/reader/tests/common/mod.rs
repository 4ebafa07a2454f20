//! Fixture library shared by the session tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Pages that fingerprint to all-zero bits.
pub fn flat() -> Vec<u8> {
    png(RgbImage::from_pixel(90, 80, Rgb([90, 90, 90])))
}

/// Pages that fingerprint to all-one bits.
pub fn gradient() -> Vec<u8> {
    png(RgbImage::from_fn(90, 80, |x, _| Rgb([(x * 255 / 89) as u8; 3])))
}

fn png(image: RgbImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image).write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub fn write_zip(path: &Path, pages: &[Vec<u8>]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (index, bytes) in pages.iter().enumerate() {
        writer.start_file(format!("{:02}.png", index + 1), SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

/// A directory holding, in natural order:
///
/// - `a.zip`: four flat pages then three gradient pages,
/// - `b.cbz`: three flat pages,
/// - `c/`: two gradient pages,
///
/// plus a `d.rar` and a `notes.txt` that aren't containers.
pub struct Library {
    pub dir: TempDir,
}

impl Library {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let (flat, gradient) = (flat(), gradient());
        write_zip(&dir.path().join("a.zip"), &[
            flat.clone(),
            flat.clone(),
            flat.clone(),
            flat.clone(),
            gradient.clone(),
            gradient.clone(),
            gradient.clone(),
        ]);
        write_zip(&dir.path().join("b.cbz"), &[flat.clone(), flat.clone(), flat]);
        fs::create_dir(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c").join("1.png"), &gradient).unwrap();
        fs::write(dir.path().join("c").join("2.png"), &gradient).unwrap();
        fs::write(dir.path().join("d.rar"), b"Rar!").unwrap();
        fs::write(dir.path().join("notes.txt"), b"not a container").unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
