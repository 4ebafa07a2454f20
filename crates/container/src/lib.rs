//! Image containers: archives and directories read as ordered sequences of
//! pages.
//!
//! A [`Container`] lists the image entries of one zip/cbz archive or one
//! directory, sorted in natural order of their names, and decodes entries
//! lazily on request. Each container keeps a cache of entry
//! [fingerprints](folio_imgdiff::Fingerprint) for scene detection.
//!
//! A [`ContainerSet`] is the directory a container lives in, listing the
//! neighbouring containers so a reader can move on to the next volume.

mod backend;
mod cache;
mod container;
mod decode;
pub mod error;
mod extensions;
mod kind;
mod siblings;
#[cfg(test)]
mod testing;

pub use crate::container::Container;
pub use crate::extensions::ImageExtensions;
pub use crate::kind::{ARCHIVE_EXTENSIONS, ContainerKind, is_archive_name};
pub use crate::siblings::ContainerSet;

/// Upper bound on the number of entries listed from one container. Entries
/// are sorted in natural order first, and those sorting after this count are
/// ignored.
pub const MAX_ENTRIES: usize = 4096 * 64;

/// Upper bound on the uncompressed size of one archive member. Larger members
/// fail to decode.
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;
