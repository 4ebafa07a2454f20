//! Layered configuration for folio.
//!
//! Sources are merged in increasing order of precedence:
//!
//! 1. built-in defaults,
//! 2. `config.toml` in the platform configuration directory,
//! 3. an explicitly given configuration file,
//! 4. `FOLIO_*` environment variables, with `__` separating nested keys
//!    (`FOLIO_SCENE__THRESHOLD=0.3`).
//!
//! ```toml
//! page_skip = 20
//! seamless = false
//! image_extensions = ["png", "jpg"]
//!
//! [scene]
//! skip = 3
//! threshold = 0.35
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use folio_container::ImageExtensions;
use folio_scene::ScanOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Prefix of environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "FOLIO_";
/// Name of the configuration file looked up in the platform config directory.
pub const FILE_NAME: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scene: SceneConfig,
    /// Apply embedded orientation metadata (EXIF) when decoding.
    pub embedded_orientation: bool,
    /// Pages moved by a skip forward/backward.
    pub page_skip: usize,
    /// Paging past either end of a container continues into its neighbour.
    pub seamless: bool,
    /// Paging forward or back jumps to a random page of the container instead.
    pub random: bool,
    /// Replaces the set of image extensions derived from the linked codecs.
    pub image_extensions: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub skip: usize,
    pub threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            embedded_orientation: true,
            page_skip: 10,
            seamless: true,
            random: false,
            image_extensions: None,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self { skip: ScanOptions::DEFAULT_SKIP, threshold: ScanOptions::DEFAULT_THRESHOLD }
    }
}

impl Config {
    /// Load the configuration from every source, with `explicit` (if given)
    /// taking precedence over the user's configuration file.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::Load`] if `explicit` doesn't exist or any source fails to
    /// parse, and [`ErrorKind::Invalid`] if the merged result doesn't
    /// validate.
    #[instrument(skip_all, fields(explicit = ?explicit))]
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut files: Vec<PathBuf> = Self::user_path().into_iter().collect();
        if let Some(path) = explicit {
            fs::metadata(path).or_raise(|| ErrorKind::Load)?;
            files.push(path.to_path_buf());
        }
        Self::from_figment(Self::figment(&files))
    }

    /// Location of the per-user configuration file, if the platform has a
    /// configuration directory.
    #[must_use]
    pub fn user_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "folio").map(|dirs| dirs.config_dir().join(FILE_NAME))
    }

    /// Defaults, then each TOML file in order (missing files are skipped),
    /// then the environment.
    #[must_use]
    pub fn figment(files: &[PathBuf]) -> Figment {
        let figment = files
            .iter()
            .filter(|path| path.is_file())
            .fold(Figment::from(Serialized::defaults(Self::default())), |figment, path| {
                figment.merge(Toml::file_exact(path))
            });
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        debug!(?config, "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.scan_options().validate().or_raise(|| ErrorKind::Invalid("scene".to_string()))?;
        if self.page_skip == 0 {
            exn::bail!(ErrorKind::Invalid("page_skip must be at least 1".to_string()));
        }
        if let Some(extensions) = &self.image_extensions
            && self.image_extensions().is_empty()
        {
            exn::bail!(ErrorKind::Invalid(format!("image_extensions has no usable entries: {extensions:?}")));
        }
        Ok(())
    }

    /// Scan options for scene detection.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(self.scene.skip, self.scene.threshold).with_autorotate(self.embedded_orientation)
    }

    /// The configured extension override, or every extension the linked
    /// codecs can decode.
    #[must_use]
    pub fn image_extensions(&self) -> ImageExtensions {
        match &self.image_extensions {
            Some(extensions) => extensions.iter().collect(),
            None => ImageExtensions::from_codecs(),
        }
    }
}
