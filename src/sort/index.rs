/// Line index: one borrowed view per input line, across all inputs.
///
/// The index is allocated once at its final size. Each file owns the
/// contiguous range starting at the running total of the line counts before
/// it, so per-file fill tasks receive disjoint `&mut` sub-slices and need no
/// locking.
use std::ops::Range;

use memchr::memchr_iter;
use rayon::ThreadPool;
use rayon::prelude::*;

use super::source::FileMeta;

/// A zero-copy view of one line's bytes, without its newline.
pub type LineRef<'a> = &'a [u8];

pub struct LineIndex<'a> {
    lines: Vec<LineRef<'a>>,
    /// Exclusive prefix sums of per-file line counts, plus the total.
    file_starts: Vec<usize>,
}

/// Starting index of every file, followed by the total line count.
pub fn start_offsets(files: &[FileMeta]) -> Vec<usize> {
    let mut starts = Vec::with_capacity(files.len() + 1);
    let mut total = 0usize;
    starts.push(0);
    for meta in files {
        total += meta.num_lines();
        starts.push(total);
    }
    starts
}

impl<'a> LineIndex<'a> {
    /// Build the index for `files` in file order, then line order.
    pub fn build(files: &'a [FileMeta], pool: &ThreadPool) -> Self {
        let file_starts = start_offsets(files);
        let total = file_starts[files.len()];
        let empty: LineRef<'a> = &[];
        let mut lines = vec![empty; total];

        // Carve the array into one exclusive slot range per file.
        let mut slots: Vec<&mut [LineRef<'a>]> = Vec::with_capacity(files.len());
        let mut rest = lines.as_mut_slice();
        for window in file_starts.windows(2) {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(window[1] - window[0]);
            slots.push(head);
            rest = tail;
        }
        debug_assert!(rest.is_empty());

        pool.install(|| {
            slots
                .into_par_iter()
                .zip(files.par_iter())
                .with_max_len(1)
                .for_each(|(slot, meta)| fill_lines(meta.content(), slot));
        });

        LineIndex { lines, file_starts }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn lines(&self) -> &[LineRef<'a>] {
        &self.lines
    }

    #[inline]
    pub fn lines_mut(&mut self) -> &mut [LineRef<'a>] {
        &mut self.lines
    }

    /// Index range holding file `file`'s lines. Only meaningful before sorting.
    pub fn file_range(&self, file: usize) -> Range<usize> {
        self.file_starts[file]..self.file_starts[file + 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineRef<'a>> {
        self.lines.iter()
    }
}

impl<'a> From<Vec<LineRef<'a>>> for LineIndex<'a> {
    /// Treat an existing list of lines as a single input.
    fn from(lines: Vec<LineRef<'a>>) -> Self {
        let file_starts = vec![0, lines.len()];
        LineIndex { lines, file_starts }
    }
}

/// Write one view per line of `content` into `slots`, in order.
/// `slots.len()` must equal `count_lines(content)`.
fn fill_lines<'a>(content: &'a [u8], slots: &mut [LineRef<'a>]) {
    let mut start = 0usize;
    let mut n = 0usize;

    for pos in memchr_iter(b'\n', content) {
        slots[n] = &content[start..pos];
        n += 1;
        start = pos + 1;
    }

    // Last line without trailing newline
    if start < content.len() {
        slots[n] = &content[start..];
        n += 1;
    }

    debug_assert_eq!(n, slots.len());
}
