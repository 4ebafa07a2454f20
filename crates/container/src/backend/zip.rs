use super::{Handle, Member};
use crate::MAX_ENTRY_BYTES;
use crate::error::{ErrorKind, Result};
use crate::extensions::ImageExtensions;
use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};
use ::zip::ZipArchive;

const INITIAL_CAPACITY: u64 = 1 << 20;

/// Reads members out of a zip (or cbz) archive. The archive's file handle
/// stays open until the backend is dropped.
pub(crate) struct ZipBackend {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
}

impl ZipBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).or_raise(|| ErrorKind::OpenFailed(path.to_path_buf()))?;
        let archive = ZipArchive::new(BufReader::new(file)).or_raise(|| ErrorKind::OpenFailed(path.to_path_buf()))?;
        Ok(Self { path: path.to_path_buf(), archive })
    }

    #[instrument(level = "trace", skip(self, extensions), fields(path = %self.path.display(), members = self.archive.len()))]
    pub fn members(&mut self, extensions: &ImageExtensions) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index).or_raise(|| ErrorKind::OpenFailed(self.path.clone()))?;
            if !file.is_file() || !extensions.matches(file.name()) {
                trace!(name = file.name(), "skipping zip member");
                continue;
            }
            members.push(Member { name: file.name().to_string(), handle: Handle::ZipIndex(index) });
        }
        Ok(members)
    }

    pub fn read(&mut self, member: &Member) -> Result<Vec<u8>> {
        let Handle::ZipIndex(index) = member.handle else {
            exn::bail!(ErrorKind::DecodeFailed(member.name.clone()));
        };
        let file = self.archive.by_index(index).or_raise(|| ErrorKind::DecodeFailed(member.name.clone()))?;
        let declared = file.size();
        read_bounded(file, declared, MAX_ENTRY_BYTES, &member.name)
    }
}

/// Read at most `limit` bytes. The declared size only sizes the initial
/// buffer and is never trusted beyond `limit`.
fn read_bounded(reader: impl Read, declared: u64, limit: u64, name: &str) -> Result<Vec<u8>> {
    let capacity = declared.min(limit).min(INITIAL_CAPACITY);
    let mut bytes = Vec::with_capacity(usize::try_from(capacity).unwrap_or_default());
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .or_raise(|| ErrorKind::DecodeFailed(name.to_string()))?;
    if bytes.len() as u64 > limit {
        debug!(name, declared, limit, "zip member exceeds the size limit");
        exn::bail!(ErrorKind::DecodeFailed(name.to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_bounded_ignores_declared_size() {
        let bytes = read_bounded(Cursor::new(vec![7u8; 16]), u64::MAX, 64, "a.png").unwrap();
        assert_eq!(bytes, vec![7u8; 16]);
    }

    #[test]
    fn test_read_bounded_rejects_oversized_member() {
        let err = read_bounded(Cursor::new(vec![0u8; 65]), 8, 64, "a.png").unwrap_err();
        assert_eq!(*err, ErrorKind::DecodeFailed("a.png".to_string()));
        assert_eq!(read_bounded(Cursor::new(vec![0u8; 64]), 8, 64, "a.png").unwrap().len(), 64);
    }
}
