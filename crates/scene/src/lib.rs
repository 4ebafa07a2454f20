//! Scene-boundary detection.
//!
//! A "scene" is a run of consecutive entries that look alike. Scanning from
//! an entry, [`find_boundary`] reports the nearest entry whose
//! [fingerprint](folio_imgdiff::Fingerprint) is further than a threshold from
//! the starting entry's, fingerprinting only every `skip`-th entry and then
//! refining inside the window where the change happened.

pub mod error;
mod options;
mod scan;
mod source;

pub use crate::options::{Direction, ScanOptions};
pub use crate::scan::{find_boundary, find_boundary_in};
pub use crate::source::{ContainerSource, FingerprintSource};
