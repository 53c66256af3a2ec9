/// Input side of the sort: mapping files and counting their lines.
///
/// Each input is mapped once and kept alive for the whole run; every line
/// reference built later borrows straight from these mappings.
use memchr::{memchr, memchr_iter};
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::common::io::{FileData, map_file};
use crate::error::Result;

/// One mapped input and the number of lines it contributes.
pub struct FileMeta {
    path: String,
    data: FileData,
    /// First byte after the skipped header (0 when no header is skipped).
    start: usize,
    num_lines: usize,
}

impl FileMeta {
    /// Wrap already-loaded bytes, applying header skip and counting lines.
    pub fn new(path: impl Into<String>, data: FileData, skip: bool) -> Self {
        let start = if skip { data.len() - skip_header(&data).len() } else { 0 };
        let num_lines = count_lines(&data[start..]);
        FileMeta {
            path: path.into(),
            data,
            start,
            num_lines,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bytes that take part in the sort (post header-skip).
    #[inline]
    pub fn content(&self) -> &[u8] {
        &self.data[self.start..]
    }

    #[inline]
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    pub fn data(&self) -> &FileData {
        &self.data
    }
}

/// Count logical lines: every newline ends one, and a non-empty trailing
/// run without a newline counts as one more.
#[inline]
pub fn count_lines(data: &[u8]) -> usize {
    let newlines = memchr_iter(b'\n', data).count();
    match data.last() {
        Some(&b) if b != b'\n' => newlines + 1,
        _ => newlines,
    }
}

/// Drop everything up to and including the first newline.
/// Data without a newline is all header, so the result is empty.
#[inline]
pub fn skip_header(data: &[u8]) -> &[u8] {
    match memchr(b'\n', data) {
        Some(pos) => &data[pos + 1..],
        None => &data[data.len()..],
    }
}

/// Map one input file and count its lines.
pub fn map_source(path: &str, skip: bool) -> Result<FileMeta> {
    let data = map_file(path)?;
    data.advise_sequential();
    let meta = FileMeta::new(path, data, skip);
    tracing::debug!(
        path = meta.path(),
        bytes = meta.content().len(),
        lines = meta.num_lines(),
        mapped = meta.data().is_mapped(),
        "mapped source"
    );
    Ok(meta)
}

/// Map every input on the given pool.
///
/// Results come back in input order no matter which file finishes first.
/// The first failure aborts the whole set; no partial results are returned.
pub fn map_sources(paths: &[String], skip: bool, pool: &ThreadPool) -> Result<Vec<FileMeta>> {
    pool.install(|| {
        paths
            .par_iter()
            .with_max_len(1)
            .map(|path| map_source(path, skip))
            .collect()
    })
}
