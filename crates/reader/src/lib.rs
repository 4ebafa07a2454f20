//! Navigation state for reading one container at a time.
//!
//! A [`Session`] holds the open [`Container`] and the current page, and turns
//! "next page", "next volume" and "next scene" requests into container, sibling
//! and scene-scanner calls. Rendering the decoded page is up to the caller.
//!
//! ```no_run
//! use folio_config::Config;
//! use folio_reader::Session;
//!
//! # fn example() -> folio_reader::error::Result<()> {
//! let mut session = Session::new(Config::default());
//! session.open("library/volume-01.cbz")?;
//! if let Some(page) = session.next_scene()? {
//!     let image = session.current_image()?;
//!     println!("scene starts on page {page}: {}x{}", image.width(), image.height());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use folio_config::Config;
use folio_container::error::ErrorKind as ContainerErrorKind;
use folio_container::{Container, ContainerSet, ImageExtensions};
use folio_scene::{Direction, find_boundary};
use image::DynamicImage;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub struct Session {
    config: Config,
    extensions: ImageExtensions,
    container: Option<Container>,
    position: usize,
}

impl Session {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let extensions = config.image_extensions();
        Self { config, extensions, container: None, position: 0 }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open `path` and show its first page. The previously loaded container
    /// is only closed once the new one has opened successfully.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let container = Container::open(path, &self.extensions).or_raise(|| ErrorKind::Container)?;
        self.close();
        self.container = Some(container);
        Ok(())
    }

    /// Close the current container, if any.
    pub fn close(&mut self) {
        if let Some(mut container) = self.container.take() {
            container.close();
        }
        self.position = 0;
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.container.is_some()
    }

    #[must_use]
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    /// Index of the current page; zero when nothing is loaded.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Go to page `page`, clamped to the container. Returns the new position.
    pub fn set_page(&mut self, page: usize) -> Result<usize> {
        let last = self.last_index()?;
        self.position = page.min(last);
        Ok(self.position)
    }

    /// One page forward. Past the last page this continues into the next
    /// container when seamless paging is on, and stays put otherwise. With
    /// random paging on it jumps to a random page instead.
    pub fn next_page(&mut self) -> Result<usize> {
        if self.config.random {
            return self.random_page();
        }
        if self.position < self.last_index()? {
            self.position += 1;
        } else if self.config.seamless {
            self.next_container()?;
        }
        Ok(self.position)
    }

    /// One page back. Before the first page this continues onto the last page
    /// of the previous container when seamless paging is on.
    pub fn previous_page(&mut self) -> Result<usize> {
        if self.config.random {
            return self.random_page();
        }
        self.last_index()?;
        if self.position > 0 {
            self.position -= 1;
        } else if self.config.seamless {
            self.previous_container()?;
        }
        Ok(self.position)
    }

    /// Jump to a page picked uniformly at random.
    pub fn random_page(&mut self) -> Result<usize> {
        let last = self.last_index()?;
        let page = rand::thread_rng().gen_range(0..=last);
        debug!(page, "jumped to random page");
        self.set_page(page)
    }

    /// Move forward by the configured page skip, stopping at the last page.
    pub fn skip_forward(&mut self) -> Result<usize> {
        self.set_page(self.position.saturating_add(self.config.page_skip))
    }

    /// Move back by the configured page skip, stopping at the first page.
    pub fn skip_backward(&mut self) -> Result<usize> {
        self.set_page(self.position.saturating_sub(self.config.page_skip))
    }

    pub fn first_page(&mut self) -> Result<usize> {
        self.set_page(0)
    }

    pub fn last_page(&mut self) -> Result<usize> {
        self.set_page(usize::MAX)
    }

    /// Open the next container in the current one's directory. Returns
    /// `false` (and stays put) if the current container is the last one.
    pub fn next_container(&mut self) -> Result<bool> {
        self.open_sibling(1)
    }

    /// Open the previous container in the current one's directory, at its
    /// last page. Returns `false` if the current container is the first one.
    pub fn previous_container(&mut self) -> Result<bool> {
        if !self.open_sibling(-1)? {
            return Ok(false);
        }
        self.last_page()?;
        Ok(true)
    }

    /// Jump to the next scene boundary after the current page, if there is
    /// one.
    pub fn next_scene(&mut self) -> Result<Option<usize>> {
        self.scene(Direction::Forward)
    }

    /// Jump to the nearest scene boundary before the current page, if there
    /// is one.
    pub fn previous_scene(&mut self) -> Result<Option<usize>> {
        self.scene(Direction::Backward)
    }

    /// Decode the current page. Its fingerprint is cached on the way so a
    /// scene search starting here doesn't decode it again.
    pub fn current_image(&mut self) -> Result<DynamicImage> {
        let autorotate = self.config.embedded_orientation;
        let position = self.position;
        let container = self.container.as_mut().ok_or_raise(|| ErrorKind::NotLoaded)?;
        let image = container.decode_at(position, autorotate).or_raise(|| ErrorKind::Container)?;
        container.prime_fingerprint(position, &image, autorotate).or_raise(|| ErrorKind::Container)?;
        Ok(image)
    }

    fn last_index(&self) -> Result<usize> {
        let container = self.container.as_ref().ok_or_raise(|| ErrorKind::NotLoaded)?;
        Ok(container.len().saturating_sub(1))
    }

    #[instrument(skip(self))]
    fn scene(&mut self, direction: Direction) -> Result<Option<usize>> {
        let options = self.config.scan_options();
        let container = self.container.as_mut().ok_or_raise(|| ErrorKind::NotLoaded)?;
        let boundary = find_boundary(container, self.position, direction, &options).or_raise(|| ErrorKind::Scene)?;
        if let Some(index) = boundary {
            debug!(from = self.position, to = index, "moved to scene boundary");
            self.position = index;
        }
        Ok(boundary)
    }

    fn open_sibling(&mut self, offset: isize) -> Result<bool> {
        let Some(path) = self.sibling_path(offset)? else {
            debug!(offset, "no more containers");
            return Ok(false);
        };
        self.open(path)?;
        Ok(true)
    }

    fn sibling_path(&self, offset: isize) -> Result<Option<PathBuf>> {
        let container = self.container.as_ref().ok_or_raise(|| ErrorKind::NotLoaded)?;
        let (siblings, name) = ContainerSet::of(container.path()).or_raise(|| ErrorKind::Siblings)?;
        match siblings.relative_path(&name, offset) {
            Ok(path) => Ok(Some(path)),
            Err(err) if *err == ContainerErrorKind::NoMoreSiblings => Ok(None),
            Err(err) => Err(err).or_raise(|| ErrorKind::Siblings),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("container", &self.container.as_ref().map(Container::name))
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
