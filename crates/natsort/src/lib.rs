//! Natural ordering for names containing numbers.
//!
//! Digit runs are compared by their numeric value instead of byte by byte, so
//! `page2.png` sorts before `page10.png`. Everything else is compared as raw
//! bytes, which for UTF-8 input is the same as comparing code points.
//!
//! ```
//! use folio_natsort::{less, sort};
//!
//! assert!(less("img2.png", "img10.png"));
//!
//! let mut names = vec!["c10.zip", "b.zip", "c2.zip", "a.zip"];
//! sort(&mut names);
//! assert_eq!(names, ["a.zip", "b.zip", "c2.zip", "c10.zip"]);
//! ```

use std::cmp::Ordering;

/// Compare two strings in natural order.
///
/// Two digit runs with the same numeric value but a different number of
/// leading zeros are ordered immediately: the run with more zeros is less
/// (`"a050" < "a50"`, and so `"a01b3" < "a1b2"`). As a consequence this is a
/// total order, returning [`Ordering::Equal`] only for identical strings.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let run_a = digit_run(a, i);
            let run_b = digit_run(b, j);
            match compare_digit_runs(&a[i..run_a], &b[j..run_b]) {
                Ordering::Equal => {},
                decided => return decided,
            }
            i = run_a;
            j = run_b;
            continue;
        }
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {},
            decided => return decided,
        }
        i += 1;
        j += 1;
    }
    // Whichever string still has input left is the longer one.
    (a.len() - i).cmp(&(b.len() - j))
}

/// Shorthand for `compare(a, b) == Ordering::Less`.
#[inline]
#[must_use]
pub fn less(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

/// Sort a slice of anything string-like in natural order.
pub fn sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

/// Sort a slice in natural order of a string key projected from each element.
///
/// Used for container entries (sorted by entry name) and sibling listings
/// (sorted by file name) alike; the sort is stable.
///
/// ```
/// use folio_natsort::sort_by_key;
///
/// let mut pages = vec![(7, "p10.jpg"), (3, "p9.jpg")];
/// sort_by_key(&mut pages, |(_, name)| *name);
/// assert_eq!(pages, [(3, "p9.jpg"), (7, "p10.jpg")]);
/// ```
pub fn sort_by_key<T, F>(items: &mut [T], mut key: F)
where
    F: FnMut(&T) -> &str,
{
    items.sort_by(|a, b| compare(key(a), key(b)));
}

/// Index one past the end of the digit run starting at `start`.
fn digit_run(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().position(|b| !b.is_ascii_digit()).map_or(bytes.len(), |offset| start + offset)
}

/// Compare two runs of ASCII digits as integers of arbitrary length.
fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let significant_a = strip_leading_zeros(a);
    let significant_b = strip_leading_zeros(b);
    significant_a
        .len()
        .cmp(&significant_b.len())
        .then_with(|| significant_a.cmp(significant_b))
        // Same value: more leading zeros sorts first.
        .then_with(|| b.len().cmp(&a.len()))
}

fn strip_leading_zeros(run: &[u8]) -> &[u8] {
    let zeros = run.iter().take_while(|&&b| b == b'0').count();
    &run[zeros..]
}
