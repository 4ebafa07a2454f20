use crate::backend::{Backend, Member};
use crate::cache::FingerprintCache;
use crate::decode::decode;
use crate::error::{ErrorKind, Result};
use crate::extensions::ImageExtensions;
use crate::{ContainerKind, MAX_ENTRIES};
use exn::OptionExt;
use folio_imgdiff::{Fingerprint, fingerprint};
use image::DynamicImage;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// An opened archive or directory, presented as a naturally sorted sequence of
/// images.
///
/// Entries are listed once on open; nothing is decoded until asked for.
/// Closing (or dropping) the container releases the underlying archive handle.
///
/// ```no_run
/// use folio_container::{Container, ImageExtensions};
///
/// # fn example() -> folio_container::error::Result<()> {
/// let mut container = Container::open("volume-01.cbz", &ImageExtensions::default())?;
/// let first = container.decode_at(0, true)?;
/// println!("{} has {} pages; the first is {}x{}", container.name(), container.len(), first.width(), first.height());
/// # Ok(())
/// # }
/// ```
pub struct Container {
    name: String,
    path: PathBuf,
    kind: ContainerKind,
    entries: Vec<Member>,
    backend: Option<Backend>,
    fingerprints: FingerprintCache,
}

impl Container {
    /// Open `path` and list its image entries in natural order of their names.
    ///
    /// At most [`MAX_ENTRIES`] qualifying entries are kept: the first ones in
    /// natural order. Any beyond that are ignored.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OpenFailed`] if the path can't be read or the archive
    ///   structure is corrupt.
    /// - [`ErrorKind::UnsupportedFormat`] for files that aren't zip archives.
    /// - [`ErrorKind::EmptyContainer`] if no entry is a recognised image.
    #[instrument(skip(path, extensions), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, extensions: &ImageExtensions) -> Result<Self> {
        let path = path.as_ref();
        let kind = ContainerKind::from_path(path)?;
        let mut backend = Backend::open(kind, path)?;
        let entries = first_entries(backend.members(extensions)?, MAX_ENTRIES);
        if entries.is_empty() {
            exn::bail!(ErrorKind::EmptyContainer(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        debug!(%kind, entries = entries.len(), "opened container");
        Ok(Self {
            name,
            path: path.to_path_buf(),
            kind,
            entries,
            backend: Some(backend),
            fingerprints: FingerprintCache::default(),
        })
    }

    /// Number of image entries; zero once closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name: the final path component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Entry names in display order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|member| member.name.as_str())
    }

    pub fn name_at(&self, index: usize) -> Result<&str> {
        if self.is_closed() {
            exn::bail!(ErrorKind::Closed);
        }
        Ok(&locate(&self.entries, index)?.name)
    }

    /// Read and decode the entry at `index`. With `autorotate`, embedded
    /// orientation metadata is applied.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::OutOfBounds`] if `index >= len()`.
    /// - [`ErrorKind::DecodeFailed`] if the entry's bytes are not a supported
    ///   image, or decode to zero width or height.
    /// - [`ErrorKind::Closed`] after [`Container::close`].
    #[instrument(skip(self), fields(container = %self.name))]
    pub fn decode_at(&mut self, index: usize, autorotate: bool) -> Result<DynamicImage> {
        let backend = self.backend.as_mut().ok_or_raise(|| ErrorKind::Closed)?;
        let member = locate(&self.entries, index)?;
        trace!(name = member.name, "reading entry");
        let bytes = backend.read(member)?;
        decode(&member.name, bytes, autorotate)
    }

    /// Fingerprint of the entry at `index`, decoding it on first request.
    ///
    /// Results are cached per container. The cache only holds fingerprints
    /// computed under one `autorotate` setting at a time; asking with the
    /// other setting starts over.
    pub fn fingerprint_at(&mut self, index: usize, autorotate: bool) -> Result<Fingerprint> {
        if let Some(cached) = self.fingerprints.get(index, autorotate) {
            trace!(index, "fingerprint cache hit");
            return Ok(cached);
        }
        let image = self.decode_at(index, autorotate)?;
        Ok(self.fingerprints.insert(index, autorotate, fingerprint(&image)))
    }

    /// Seed the cache with the fingerprint of an image the caller already
    /// decoded from entry `index` (with the same `autorotate` setting). An
    /// existing cached fingerprint is never replaced.
    pub fn prime_fingerprint(&mut self, index: usize, image: &DynamicImage, autorotate: bool) -> Result<Fingerprint> {
        if self.is_closed() {
            exn::bail!(ErrorKind::Closed);
        }
        locate(&self.entries, index)?;
        if let Some(cached) = self.fingerprints.get(index, autorotate) {
            return Ok(cached);
        }
        Ok(self.fingerprints.insert(index, autorotate, fingerprint(image)))
    }

    /// Number of fingerprints currently cached.
    #[must_use]
    pub fn cached_fingerprints(&self) -> usize {
        self.fingerprints.len()
    }

    /// Release the backend and forget all entries. Idempotent.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            debug!(container = %self.name, "closed container");
        }
        self.entries.clear();
        self.fingerprints.clear();
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("entries", &self.entries.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Sort `members` naturally by name and keep the first `limit` of them.
fn first_entries(mut members: Vec<Member>, limit: usize) -> Vec<Member> {
    folio_natsort::sort_by_key(&mut members, |member| member.name.as_str());
    if members.len() > limit {
        debug!(limit, ignored = members.len() - limit, "entry limit reached, remaining members ignored");
        members.truncate(limit);
    }
    members
}

fn locate(entries: &[Member], index: usize) -> Result<&Member> {
    entries.get(index).ok_or_raise(|| ErrorKind::OutOfBounds { index, len: entries.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Handle;
    use crate::testing::{gradient_png, png, write_dir, write_zip};
    use image::Rgb;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use rstest::rstest;
    use tempfile::TempDir;

    const GREY: Rgb<u8> = Rgb([128, 128, 128]);

    fn zip_fixture(members: &[(&str, Vec<u8>)]) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.cbz");
        write_zip(&path, members);
        (dir, path)
    }

    #[test]
    fn test_open_zip_sorts_and_filters() {
        let (_dir, path) = zip_fixture(&[
            ("p10.png", png(4, 4, GREY)),
            ("notes.txt", b"hello".to_vec()),
            ("p2.PNG", png(4, 4, GREY)),
            ("chapter/", Vec::new()),
            ("chapter/p1.png", png(4, 4, GREY)),
            (".png", png(4, 4, GREY)),
        ]);
        let container = Container::open(&path, &ImageExtensions::default()).unwrap();
        assert_eq!(container.kind(), ContainerKind::Zip);
        assert_eq!(container.name(), "book.cbz");
        assert_eq!(container.path(), path);
        assert_eq!(container.names().collect::<Vec<_>>(), ["chapter/p1.png", "p2.PNG", "p10.png"]);
        assert_eq!(container.len(), 3);
        assert_eq!(container.name_at(1).unwrap(), "p2.PNG");
    }

    #[test]
    fn test_open_directory() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("Book 2");
        write_dir(&book, &[("10.jpg", png(2, 2, GREY)), ("9.png", png(2, 2, GREY)), ("cover.txt", Vec::new())]);
        std::fs::create_dir(book.join("nested.png")).unwrap();
        let container = Container::open(&book, &ImageExtensions::default()).unwrap();
        assert_eq!(container.kind(), ContainerKind::Directory);
        assert_eq!(container.name(), "Book 2");
        assert_eq!(container.names().collect::<Vec<_>>(), ["9.png", "10.jpg"]);
    }

    #[test]
    fn test_open_respects_extension_set() {
        let (_dir, path) = zip_fixture(&[("a.png", png(2, 2, GREY)), ("b.gif", png(2, 2, GREY))]);
        let extensions: ImageExtensions = ["gif"].into_iter().collect();
        let container = Container::open(&path, &extensions).unwrap();
        assert_eq!(container.names().collect::<Vec<_>>(), ["b.gif"]);
    }

    #[test]
    fn test_open_empty() {
        let (_dir, path) = zip_fixture(&[("readme.txt", b"nothing to see".to_vec())]);
        let err = Container::open(&path, &ImageExtensions::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::EmptyContainer(path));
    }

    #[test]
    fn test_open_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"PK\x03\x04 this is not really a zip").unwrap();
        let err = Container::open(&path, &ImageExtensions::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::OpenFailed(path));
    }

    #[rstest]
    #[case("missing.zip")]
    #[case("missing")]
    fn test_open_missing(#[case] name: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let err = Container::open(&path, &ImageExtensions::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::OpenFailed(path));
    }

    #[test]
    fn test_open_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.cbr");
        std::fs::write(&path, b"Rar!").unwrap();
        let err = Container::open(&path, &ImageExtensions::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat("cbr".to_string()));
    }

    #[test]
    fn test_decode_at() {
        let (_dir, path) = zip_fixture(&[("a.png", png(6, 3, Rgb([10, 20, 30]))), ("b.png", png(2, 9, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        let first = container.decode_at(0, true).unwrap();
        assert_eq!((first.width(), first.height()), (6, 3));
        assert_eq!(first.to_rgb8().get_pixel(5, 2), &Rgb([10, 20, 30]));
        let second = container.decode_at(1, false).unwrap();
        assert_eq!((second.width(), second.height()), (2, 9));
    }

    #[rstest]
    #[case(2)]
    #[case(100)]
    #[case(usize::MAX)]
    fn test_out_of_bounds(#[case] index: usize) {
        let (_dir, path) = zip_fixture(&[("a.png", png(2, 2, GREY)), ("b.png", png(2, 2, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        let expected = ErrorKind::OutOfBounds { index, len: 2 };
        assert_eq!(*container.decode_at(index, true).unwrap_err(), expected);
        assert_eq!(*container.fingerprint_at(index, true).unwrap_err(), expected);
        assert_eq!(*container.name_at(index).unwrap_err(), expected);
    }

    #[test]
    fn test_decode_failed_is_recoverable() {
        let (_dir, path) = zip_fixture(&[("a.png", b"not an image".to_vec()), ("b.png", png(2, 2, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        let err = container.decode_at(0, true).unwrap_err();
        assert_eq!(*err, ErrorKind::DecodeFailed("a.png".to_string()));
        assert!(container.decode_at(1, true).is_ok());
    }

    #[test]
    fn test_fingerprint_cached() {
        let (_dir, path) = zip_fixture(&[("a.png", gradient_png(90, 80)), ("b.png", png(90, 80, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        assert_eq!(container.cached_fingerprints(), 0);
        let a = container.fingerprint_at(0, true).unwrap();
        assert_eq!(a, Fingerprint::new(u64::MAX));
        assert_eq!(container.fingerprint_at(0, true).unwrap(), a);
        assert_eq!(container.cached_fingerprints(), 1);
        assert_eq!(container.fingerprint_at(1, true).unwrap(), Fingerprint::new(0));
        assert_eq!(container.cached_fingerprints(), 2);
        // Switching orientation handling starts the cache over.
        assert_eq!(container.fingerprint_at(1, false).unwrap(), Fingerprint::new(0));
        assert_eq!(container.cached_fingerprints(), 1);
    }

    #[test]
    fn test_prime_fingerprint() {
        let (_dir, path) = zip_fixture(&[("a.png", gradient_png(90, 80))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        let image = container.decode_at(0, true).unwrap();
        assert_eq!(container.prime_fingerprint(0, &image, true).unwrap(), Fingerprint::new(u64::MAX));
        // Write-once: a different image does not replace the cached value.
        let other = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(9, 8, GREY));
        assert_eq!(container.prime_fingerprint(0, &other, true).unwrap(), Fingerprint::new(u64::MAX));
        assert_eq!(container.fingerprint_at(0, true).unwrap(), Fingerprint::new(u64::MAX));
        assert_eq!(
            *container.prime_fingerprint(1, &image, true).unwrap_err(),
            ErrorKind::OutOfBounds { index: 1, len: 1 }
        );
    }

    #[test]
    fn test_close() {
        let (_dir, path) = zip_fixture(&[("a.png", png(2, 2, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        container.fingerprint_at(0, true).unwrap();
        container.close();
        container.close();
        assert!(container.is_closed());
        assert!(container.is_empty());
        assert_eq!(container.cached_fingerprints(), 0);
        assert_eq!(*container.decode_at(0, true).unwrap_err(), ErrorKind::Closed);
        assert_eq!(*container.fingerprint_at(0, true).unwrap_err(), ErrorKind::Closed);
        assert_eq!(*container.name_at(0).unwrap_err(), ErrorKind::Closed);
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        assert_eq!(*container.prime_fingerprint(0, &image, true).unwrap_err(), ErrorKind::Closed);
    }

    #[rstest]
    #[case(&["p3.png", "p10.png", "p1.png", "p2.png"], &["p1.png", "p2.png"])]
    #[case(&["b/2.png", "a/9.png", "a/10.png"], &["a/9.png", "a/10.png"])]
    #[case(&["x.png"], &["x.png"])]
    fn test_first_entries_keeps_natural_head(#[case] names: &[&str], #[case] expected: &[&str]) {
        let members = names
            .iter()
            .enumerate()
            .map(|(index, name)| Member { name: (*name).to_string(), handle: Handle::ZipIndex(index) })
            .collect();
        let kept = first_entries(members, 2);
        assert_eq!(kept.iter().map(|member| member.name.as_str()).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_decoding_twice_gives_identical_fingerprints() {
        let (_dir, path) = zip_fixture(&[("a.png", gradient_png(120, 70)), ("b.png", png(33, 17, GREY))]);
        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        for index in 0..container.len() {
            let first = fingerprint(&container.decode_at(index, true).unwrap());
            let second = fingerprint(&container.decode_at(index, true).unwrap());
            assert_eq!(first, second, "entry {index}");
        }
    }

    fn le16(bytes: &[u8], at: usize) -> usize {
        usize::from(u16::from_le_bytes([bytes[at], bytes[at + 1]]))
    }

    /// Rewrite the uncompressed size the central directory declares for the
    /// first member of the archive at `path`.
    fn declare_uncompressed_size(path: &Path, size: u64) {
        let mut bytes = std::fs::read(path).unwrap();
        let header = bytes.windows(4).position(|window| window == b"PK\x01\x02").unwrap();
        let (name_len, extra_len) = (le16(&bytes, header + 28), le16(&bytes, header + 30));
        if bytes[header + 24..header + 28] == [0xff; 4] {
            // Zip64: the real size is the first value of the extended information field.
            let mut cursor = header + 46 + name_len;
            let end = cursor + extra_len;
            while cursor + 4 <= end {
                let (id, len) = (le16(&bytes, cursor), le16(&bytes, cursor + 2));
                if id == 0x0001 {
                    bytes[cursor + 4..cursor + 12].copy_from_slice(&size.to_le_bytes());
                    break;
                }
                cursor += 4 + len;
            }
        } else {
            let size = u32::try_from(size).unwrap_or(0xffff_fff0);
            bytes[header + 24..header + 28].copy_from_slice(&size.to_le_bytes());
        }
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_oversized_declared_member_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.cbz");
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored).large_file(true);
        writer.start_file("a.png", options).unwrap();
        writer.write_all(&png(4, 4, GREY)).unwrap();
        writer.finish().unwrap();
        declare_uncompressed_size(&path, 1 << 50);

        let mut container = Container::open(&path, &ImageExtensions::default()).unwrap();
        match container.decode_at(0, true) {
            Ok(image) => assert_eq!((image.width(), image.height()), (4, 4)),
            Err(err) => assert_eq!(*err, ErrorKind::DecodeFailed("a.png".to_string())),
        }
    }
}
