use crate::error::{Error, ErrorKind, Result};
use std::{fmt, fs, path::Path, str::FromStr};

use exn::ResultExt;

/// File extensions of archives that can be opened as containers.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "cbz"];

/// Archive formats that are recognised by name but cannot be read. Listed so
/// that opening one reports [`ErrorKind::UnsupportedFormat`] with the format's
/// name rather than a generic open failure.
const UNSUPPORTED_ARCHIVE_EXTENSIONS: &[&str] =
    &["7z", "rar", "tar", "tar.gz", "tgz", "tbz2", "cb7", "cbr", "cbt", "lha"];

/// Which backend a container is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A zip archive (`.zip`, `.cbz`).
    Zip,
    /// A plain filesystem directory.
    Directory,
}

impl ContainerKind {
    /// Detect the container kind of an existing path: directories are
    /// [`ContainerKind::Directory`], files are classified by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).or_raise(|| ErrorKind::OpenFailed(path.to_path_buf()))?;
        if metadata.is_dir() {
            return Ok(Self::Directory);
        }
        Self::from_extension(path)
    }

    /// Classify a file path by its extension alone, without touching the
    /// filesystem.
    pub fn from_extension(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_lowercase();
        if let Some(ext) = UNSUPPORTED_ARCHIVE_EXTENSIONS.iter().find(|ext| has_extension(&name, ext)) {
            exn::bail!(ErrorKind::UnsupportedFormat(ext.to_string()));
        }
        if is_archive_name(path) {
            return Ok(Self::Zip);
        }
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => exn::bail!(ErrorKind::UnsupportedFormat(ext.to_lowercase())),
            None => exn::bail!(ErrorKind::UnsupportedFormat(name)),
        }
    }

    /// Short lowercase name, as used in logs and the CLI.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Directory => "directory",
        }
    }
}

impl FromStr for ContainerKind {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zip" | "cbz" => Ok(Self::Zip),
            "dir" | "directory" => Ok(Self::Directory),
            other => exn::bail!(ErrorKind::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a file name carries one of the [`ARCHIVE_EXTENSIONS`]
/// (case-insensitive).
#[must_use]
pub fn is_archive_name(name: impl AsRef<Path>) -> bool {
    name.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Dotfiles have no extension: `.rar` is not a RAR archive.
fn has_extension(lowercase_name: &str, ext: &str) -> bool {
    lowercase_name
        .strip_suffix(ext)
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|stem| !stem.is_empty())
}
