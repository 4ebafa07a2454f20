use folio_container::Container;
use folio_imgdiff::Fingerprint;

/// Anything that can hand out fingerprints for a fixed-length sequence of
/// entries.
///
/// The scanner only ever talks to this trait; [`Container`] implements it
/// through [`ContainerSource`].
pub trait FingerprintSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fingerprint_at(&mut self, index: usize) -> Result<Fingerprint, exn::Exn<Self::Error>>;
}

/// A container viewed as a fingerprint source under one orientation setting.
/// Fingerprints land in (and come from) the container's own cache.
pub struct ContainerSource<'a> {
    container: &'a mut Container,
    autorotate: bool,
}

impl<'a> ContainerSource<'a> {
    pub fn new(container: &'a mut Container, autorotate: bool) -> Self {
        Self { container, autorotate }
    }
}

impl FingerprintSource for ContainerSource<'_> {
    type Error = folio_container::error::ErrorKind;

    fn len(&self) -> usize {
        self.container.len()
    }

    fn fingerprint_at(&mut self, index: usize) -> folio_container::error::Result<Fingerprint> {
        self.container.fingerprint_at(index, self.autorotate)
    }
}
