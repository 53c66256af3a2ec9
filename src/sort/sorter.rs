//! Prefix-keyed ordering of a `LineIndex`.
//!
//! Only the first `prefix_length` bytes of each line take part in the
//! comparison. The first 16 of those bytes are packed once into a
//! big-endian `u128` head so most comparisons never touch the mapped data;
//! the slice comparison only runs when two heads are equal.
use std::cmp::Ordering;

use rayon::prelude::*;

use super::config::{SortConfig, TieBreak};
use super::index::{LineIndex, LineRef};

/// Below this many lines a sequential sort beats rayon's split overhead.
const PARALLEL_THRESHOLD: usize = 10_000;

/// Bytes packed into the cached head of every entry.
const HEAD_BYTES: usize = 16;

/// First `min(len, k)` bytes of `line`.
#[inline]
pub fn prefix(line: &[u8], k: usize) -> &[u8] {
    &line[..line.len().min(k)]
}

/// Lexicographic comparison of the `k`-byte prefixes (shorter-is-less).
#[inline]
pub fn compare_prefix(a: &[u8], b: &[u8], k: usize) -> Ordering {
    prefix(a, k).cmp(prefix(b, k))
}

/// Pack up to 16 prefix bytes into a u128.
/// Big-endian byte order ensures u128 comparison matches lexicographic order
/// whenever two heads differ; zero padding can make a short prefix tie with
/// a longer one ending in NUL bytes, which the slice fallback resolves.
#[inline]
fn prefix_head(line: &[u8], k: usize) -> u128 {
    let n = line.len().min(k).min(HEAD_BYTES);
    let mut bytes = [0u8; HEAD_BYTES];
    bytes[..n].copy_from_slice(&line[..n]);
    u128::from_be_bytes(bytes)
}

#[derive(Debug, Clone, Copy)]
pub struct PrefixSorter {
    prefix_length: usize,
    tie_break: TieBreak,
}

impl PrefixSorter {
    pub fn new(prefix_length: usize, tie_break: TieBreak) -> Self {
        PrefixSorter {
            prefix_length,
            tie_break,
        }
    }

    pub fn from_config(config: &SortConfig) -> Self {
        Self::new(config.prefix_length, config.tie_break)
    }

    pub fn prefix_length(&self) -> usize {
        self.prefix_length
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Order two lines under this sorter's key and tie-break policy.
    /// `InputOrder` ties compare equal here; the stable sort keeps them in place.
    #[inline]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match compare_prefix(a, b, self.prefix_length) {
            Ordering::Equal if self.tie_break == TieBreak::FullLine => a.cmp(b),
            ord => ord,
        }
    }

    /// True when every adjacent pair is non-decreasing under `compare`.
    pub fn is_sorted(&self, lines: &[LineRef<'_>]) -> bool {
        lines
            .windows(2)
            .all(|w| self.compare(w[0], w[1]) != Ordering::Greater)
    }

    /// Sort the index in place. Runs on the current rayon pool, so callers
    /// bound its parallelism with `ThreadPool::install`.
    pub fn sort(&self, index: &mut LineIndex<'_>) {
        let lines = index.lines_mut();
        if lines.len() < 2 {
            return;
        }

        let k = self.prefix_length;
        let mut entries: Vec<(u128, LineRef<'_>)> =
            lines.par_iter().map(|&line| (prefix_head(line, k), line)).collect();

        let cmp = |a: &(u128, LineRef<'_>), b: &(u128, LineRef<'_>)| -> Ordering {
            match a.0.cmp(&b.0) {
                Ordering::Equal => self.compare(a.1, b.1),
                ord => ord,
            }
        };

        let n = entries.len();
        if self.tie_break == TieBreak::InputOrder {
            if n > PARALLEL_THRESHOLD {
                entries.par_sort_by(cmp);
            } else {
                entries.sort_by(cmp);
            }
        } else if n > PARALLEL_THRESHOLD {
            entries.par_sort_unstable_by(cmp);
        } else {
            entries.sort_unstable_by(cmp);
        }

        lines
            .par_iter_mut()
            .zip(entries.par_iter())
            .for_each(|(slot, &(_, line))| *slot = line);
    }
}
