use image::ImageFormat;
use std::{collections::BTreeSet, path::Path};

/// The set of file extensions treated as images when listing a container.
///
/// Extensions are stored lowercase without a leading dot and matched
/// case-insensitively against the last extension of an entry name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageExtensions(BTreeSet<String>);

impl ImageExtensions {
    /// Every extension of every image format the linked codecs can decode.
    #[must_use]
    pub fn from_codecs() -> Self {
        ImageFormat::all()
            .filter(ImageFormat::reading_enabled)
            .flat_map(|format| format.extensions_str().iter().copied())
            .collect()
    }

    /// Whether `name` (an entry name or path) has one of these extensions.
    /// Names without an extension, including dotfiles, never match.
    #[must_use]
    pub fn matches(&self, name: impl AsRef<Path>) -> bool {
        name.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.0.contains(&ext.to_lowercase()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ImageExtensions {
    fn default() -> Self {
        Self::from_codecs()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ImageExtensions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        )
    }
}
