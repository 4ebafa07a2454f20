use crate::error::{ErrorKind, Result};
use crate::kind::is_archive_name;
use exn::{OptionExt, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{instrument, trace};

/// The openable containers that live side by side in one directory: every
/// subdirectory plus every file with a recognised archive extension, in
/// natural order of their names.
///
/// The directory is listed afresh on every call, so containers added, removed
/// or renamed in the meantime are picked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerSet {
    directory: PathBuf,
}

impl ContainerSet {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    /// The set a container belongs to, and the container's name within it.
    pub fn of(container: impl AsRef<Path>) -> Result<(Self, String)> {
        let container = container.as_ref();
        let name = container
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_raise(|| ErrorKind::NotFound(container.display().to_string()))?;
        let directory = match container.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok((Self::new(directory), name.to_string()))
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Names of all containers in the directory, in natural order.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotADirectory`] if the set's path is not a directory, and
    /// [`ErrorKind::Io`] for any filesystem error while listing.
    #[instrument(level = "debug", skip(self), fields(directory = %self.directory.display()))]
    pub fn list(&self) -> Result<Vec<String>> {
        let metadata = fs::metadata(&self.directory).or_raise(|| ErrorKind::Io)?;
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(self.directory.clone()));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.directory).or_raise(|| ErrorKind::Io)? {
            let entry = entry.or_raise(|| ErrorKind::Io)?;
            let Ok(name) = entry.file_name().into_string() else {
                trace!(name = ?entry.file_name(), "skipping non UTF-8 file name");
                continue;
            };
            let is_dir = fs::metadata(entry.path()).or_raise(|| ErrorKind::Io)?.is_dir();
            if is_dir || is_archive_name(&name) {
                names.push(name);
            }
        }
        folio_natsort::sort(&mut names);
        trace!(containers = names.len(), "listed siblings");
        Ok(names)
    }

    /// Position of `current` in [`ContainerSet::list`].
    pub fn index_of(&self, current: &str) -> Result<usize> {
        position(&self.list()?, current)
    }

    /// The container `offset` places away from `current`: `1` is the next
    /// one, `-1` the previous.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotFound`] if `current` is no longer listed, and
    /// [`ErrorKind::NoMoreSiblings`] if the target falls outside the listing.
    pub fn relative(&self, current: &str, offset: isize) -> Result<String> {
        let mut names = self.list()?;
        let target = position(&names, current)?
            .checked_add_signed(offset)
            .filter(|target| *target < names.len())
            .ok_or_raise(|| ErrorKind::NoMoreSiblings)?;
        Ok(names.swap_remove(target))
    }

    /// Like [`ContainerSet::relative`], joined onto the set's directory.
    pub fn relative_path(&self, current: &str, offset: isize) -> Result<PathBuf> {
        Ok(self.directory.join(self.relative(current, offset)?))
    }
}

fn position(names: &[String], current: &str) -> Result<usize> {
    names.iter().position(|name| name == current).ok_or_raise(|| ErrorKind::NotFound(current.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    /// `a.zip`, `b/`, `c2.cbz`, `c10.zip`, plus some files that aren't containers.
    fn library() -> (TempDir, ContainerSet) {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c10.zip", "a.zip", "c2.cbz", "notes.txt", "cover.png", "d.rar"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("b")).unwrap();
        let set = ContainerSet::new(dir.path());
        (dir, set)
    }

    #[test]
    fn test_list() {
        let (_dir, set) = library();
        assert_eq!(set.list().unwrap(), ["a.zip", "b", "c2.cbz", "c10.zip"]);
    }

    #[test]
    fn test_list_not_a_directory() {
        let (dir, _) = library();
        let set = ContainerSet::new(dir.path().join("a.zip"));
        assert_eq!(*set.list().unwrap_err(), ErrorKind::NotADirectory(dir.path().join("a.zip")));
    }

    #[test]
    fn test_list_missing_directory() {
        let (dir, _) = library();
        let set = ContainerSet::new(dir.path().join("nope"));
        assert_eq!(*set.list().unwrap_err(), ErrorKind::Io);
    }

    #[test]
    fn test_index_of() {
        let (_dir, set) = library();
        assert_eq!(set.index_of("c2.cbz").unwrap(), 2);
        assert_eq!(*set.index_of("gone.zip").unwrap_err(), ErrorKind::NotFound("gone.zip".to_string()));
    }

    #[rstest]
    #[case("a.zip", 1, "b")]
    #[case("b", 1, "c2.cbz")]
    #[case("c2.cbz", -1, "b")]
    #[case("c10.zip", -3, "a.zip")]
    #[case("a.zip", 0, "a.zip")]
    fn test_relative(#[case] current: &str, #[case] offset: isize, #[case] expected: &str) {
        let (dir, set) = library();
        assert_eq!(set.relative(current, offset).unwrap(), expected);
        assert_eq!(set.relative_path(current, offset).unwrap(), dir.path().join(expected));
    }

    #[rstest]
    #[case("a.zip", -1)]
    #[case("c10.zip", 1)]
    #[case("b", 3)]
    #[case("b", isize::MIN)]
    fn test_relative_exhausted(#[case] current: &str, #[case] offset: isize) {
        let (_dir, set) = library();
        assert_eq!(*set.relative(current, offset).unwrap_err(), ErrorKind::NoMoreSiblings);
    }

    #[test]
    fn test_relative_sees_deletions() {
        let (dir, set) = library();
        assert_eq!(set.relative("a.zip", 1).unwrap(), "b");
        fs::remove_dir(dir.path().join("b")).unwrap();
        assert_eq!(set.relative("a.zip", 1).unwrap(), "c2.cbz");
        fs::remove_file(dir.path().join("a.zip")).unwrap();
        assert_eq!(*set.relative("a.zip", 1).unwrap_err(), ErrorKind::NotFound("a.zip".to_string()));
    }

    #[rstest]
    #[case("library/book.zip", "library", "book.zip")]
    #[case("/srv/library/Book 1/", "/srv/library", "Book 1")]
    #[case("book.cbz", ".", "book.cbz")]
    fn test_of(#[case] path: &str, #[case] directory: &str, #[case] name: &str) {
        let (set, found) = ContainerSet::of(path).unwrap();
        assert_eq!(set.directory(), Path::new(directory));
        assert_eq!(found, name);
    }
}
