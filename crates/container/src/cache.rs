use folio_imgdiff::Fingerprint;
use std::collections::HashMap;

/// Per-container memo of entry fingerprints.
///
/// Fingerprints depend on whether orientation metadata was applied before
/// hashing, so the cache remembers which setting its contents were computed
/// under and forgets everything when asked about the other one.
#[derive(Debug, Default)]
pub(crate) struct FingerprintCache {
    autorotate: bool,
    fingerprints: HashMap<usize, Fingerprint>,
}

impl FingerprintCache {
    pub fn get(&self, index: usize, autorotate: bool) -> Option<Fingerprint> {
        match self.autorotate == autorotate {
            true => self.fingerprints.get(&index).copied(),
            false => None,
        }
    }

    /// Record a fingerprint unless one is already cached for `index`; returns
    /// whichever is cached afterwards.
    pub fn insert(&mut self, index: usize, autorotate: bool, fingerprint: Fingerprint) -> Fingerprint {
        if self.autorotate != autorotate {
            self.fingerprints.clear();
            self.autorotate = autorotate;
        }
        *self.fingerprints.entry(index).or_insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn clear(&mut self) {
        self.fingerprints.clear();
    }
}
