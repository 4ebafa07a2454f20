//! Container backends.
//!
//! A backend enumerates the image members of one container and reads a
//! member's raw bytes on demand. The set of backends is closed, so dispatch is
//! a plain enum rather than a trait object.

mod dir;
mod zip;

pub(crate) use self::dir::DirBackend;
pub(crate) use self::zip::ZipBackend;
use crate::ContainerKind;
use crate::error::Result;
use crate::extensions::ImageExtensions;
use std::path::{Path, PathBuf};

/// How a backend finds a member again after listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Handle {
    /// Position in the zip central directory.
    ZipIndex(usize),
    /// Full path to a file inside the directory.
    File(PathBuf),
}

/// One image member discovered while listing a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Member {
    pub name: String,
    pub handle: Handle,
}

pub(crate) enum Backend {
    Zip(ZipBackend),
    Directory(DirBackend),
}

impl Backend {
    pub fn open(kind: ContainerKind, path: &Path) -> Result<Self> {
        Ok(match kind {
            ContainerKind::Zip => Self::Zip(ZipBackend::open(path)?),
            ContainerKind::Directory => Self::Directory(DirBackend::open(path)?),
        })
    }

    /// List every member whose name matches `extensions`, in backend order.
    /// Non-file members are skipped.
    pub fn members(&mut self, extensions: &ImageExtensions) -> Result<Vec<Member>> {
        match self {
            Self::Zip(backend) => backend.members(extensions),
            Self::Directory(backend) => backend.members(extensions),
        }
    }

    /// Read the complete raw bytes of one member.
    pub fn read(&mut self, member: &Member) -> Result<Vec<u8>> {
        match self {
            Self::Zip(backend) => backend.read(member),
            Self::Directory(backend) => backend.read(member),
        }
    }
}
