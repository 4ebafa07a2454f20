use crate::error::{ErrorKind, Result};
use crate::options::{Direction, ScanOptions};
use crate::source::{ContainerSource, FingerprintSource};
use exn::ResultExt;
use folio_container::Container;
use folio_imgdiff::Fingerprint;
use tracing::{debug, instrument, trace};

/// Find the nearest scene boundary from `start` in `direction`.
///
/// Candidates are fingerprinted every `options.skip` entries (the first one is
/// always the immediate neighbour of `start`, and the stride drops to one when
/// fewer than `skip` entries are left). Once a candidate is further than
/// `options.threshold` from the fingerprint of `start`, the window just
/// skipped over is walked back one entry at a time to place the boundary
/// exactly.
///
/// The returned index is the entry nearest to `start` that differs from it
/// and directly follows (in scan order) an entry that doesn't. A scene
/// shorter than the stride can sit entirely inside a skipped window and go
/// unnoticed.
///
/// Returns `Ok(None)` when the end of the sequence is reached without
/// crossing the threshold.
///
/// # Errors
///
/// - [`ErrorKind::InvalidOptions`] if the options don't validate.
/// - [`ErrorKind::InvalidStart`] if `start` is not an index of `source`.
/// - [`ErrorKind::Fingerprint`] if the source fails on any visited entry.
#[instrument(skip(source, options), fields(len = source.len(), skip = options.skip, threshold = options.threshold))]
pub fn find_boundary_in<S>(
    source: &mut S,
    start: usize,
    direction: Direction,
    options: &ScanOptions,
) -> Result<Option<usize>>
where
    S: FingerprintSource + ?Sized,
{
    options.validate()?;
    let len = source.len();
    if start >= len {
        exn::bail!(ErrorKind::InvalidStart { start, len });
    }
    let reference = source.fingerprint_at(start).or_raise(|| ErrorKind::Fingerprint(start))?;
    let mut scan = Scan { source, reference, threshold: options.threshold };

    // Last visited entry that is still within threshold of the reference.
    let mut similar = start;
    let mut candidate = direction.step(start, 1, len);
    while let Some(index) = candidate {
        if !scan.exceeds(index)? {
            similar = index;
            let stride = match direction.remaining(index, len) < options.skip {
                true => 1,
                false => options.skip,
            };
            if stride != options.skip {
                trace!(index, "near the edge, stepping one entry at a time");
            }
            candidate = direction.step(index, stride, len);
            continue;
        }
        if direction.step(similar, 1, len) == Some(index) {
            debug!(boundary = index, "found scene boundary");
            return Ok(Some(index));
        }
        let boundary = scan.refine(similar, index, direction, len)?;
        debug!(boundary, window_start = similar, window_end = index, "found scene boundary after refinement");
        return Ok(Some(boundary));
    }
    debug!("no scene boundary");
    Ok(None)
}

/// [`find_boundary_in`] over an open container, using (and filling) its
/// fingerprint cache.
pub fn find_boundary(
    container: &mut Container,
    start: usize,
    direction: Direction,
    options: &ScanOptions,
) -> Result<Option<usize>> {
    find_boundary_in(&mut ContainerSource::new(container, options.autorotate), start, direction, options)
}

struct Scan<'a, S: ?Sized> {
    source: &'a mut S,
    reference: Fingerprint,
    threshold: f32,
}

impl<S: FingerprintSource + ?Sized> Scan<'_, S> {
    fn exceeds(&mut self, index: usize) -> Result<bool> {
        let fingerprint = self.source.fingerprint_at(index).or_raise(|| ErrorKind::Fingerprint(index))?;
        let distance = fingerprint.normalized_distance(&self.reference);
        trace!(index, distance, "compared candidate");
        Ok(distance > self.threshold)
    }

    /// Walk back from `exceeded` towards `similar` (exclusive) and return the
    /// entry just past the first one found within threshold. If the whole
    /// window exceeds, the boundary is right after `similar`.
    fn refine(&mut self, similar: usize, exceeded: usize, direction: Direction, len: usize) -> Result<usize> {
        let back = direction.reverse();
        let mut index = exceeded;
        while let Some(previous) = back.step(index, 1, len)
            && previous != similar
        {
            if !self.exceeds(previous)? {
                return Ok(index);
            }
            index = previous;
        }
        Ok(index)
    }
}
