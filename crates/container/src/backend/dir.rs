use super::{Handle, Member};
use crate::error::{ErrorKind, Result};
use crate::extensions::ImageExtensions;
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

/// Reads image files directly inside a directory. Subdirectories are not
/// descended into.
pub(crate) struct DirBackend {
    path: PathBuf,
}

impl DirBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).or_raise(|| ErrorKind::OpenFailed(path.to_path_buf()))?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::OpenFailed(path.to_path_buf()));
        }
        Ok(Self { path: path.to_path_buf() })
    }

    #[instrument(level = "trace", skip(self, extensions), fields(path = %self.path.display()))]
    pub fn members(&mut self, extensions: &ImageExtensions) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        for entry in fs::read_dir(&self.path).or_raise(|| ErrorKind::OpenFailed(self.path.clone()))? {
            let entry = entry.or_raise(|| ErrorKind::OpenFailed(self.path.clone()))?;
            let Ok(name) = entry.file_name().into_string() else {
                trace!(name = ?entry.file_name(), "skipping non UTF-8 file name");
                continue;
            };
            if !extensions.matches(&name) {
                continue;
            }
            // Follows symlinks; dangling ones are skipped like any other non-file.
            let path = entry.path();
            if !fs::metadata(&path).is_ok_and(|metadata| metadata.is_file()) {
                trace!(name, "skipping non-file entry");
                continue;
            }
            members.push(Member { name, handle: Handle::File(path) });
        }
        Ok(members)
    }

    pub fn read(&mut self, member: &Member) -> Result<Vec<u8>> {
        let Handle::File(path) = &member.handle else {
            exn::bail!(ErrorKind::DecodeFailed(member.name.clone()));
        };
        fs::read(path).or_raise(|| ErrorKind::Io)
    }
}
