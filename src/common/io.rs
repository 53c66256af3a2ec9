use std::fs::{self, File};
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

#[cfg(target_os = "linux")]
use std::sync::atomic::{AtomicBool, Ordering};

use memmap2::{Mmap, MmapOptions};

use crate::error::{Result, SortError};

/// Holds file data, either zero-copy mmap or an owned Vec.
/// Dereferences to `&[u8]` for transparent use.
pub enum FileData {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

impl FileData {
    /// True when the bytes are backed by the page cache rather than the heap.
    pub fn is_mapped(&self) -> bool {
        matches!(self, FileData::Mmap(_))
    }

    /// Hint that upcoming access jumps between arbitrary lines (sort phase).
    pub fn advise_random(&self) {
        #[cfg(target_os = "linux")]
        if let FileData::Mmap(mmap) = self {
            let _ = mmap.advise(memmap2::Advice::Random);
        }
    }

    /// Hint that upcoming access walks the bytes front to back (scan, output).
    pub fn advise_sequential(&self) {
        #[cfg(target_os = "linux")]
        if let FileData::Mmap(mmap) = self {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }
    }
}

/// Track whether O_NOATIME is supported to avoid repeated failed open() attempts.
/// After the first EPERM, we never try O_NOATIME again (saves one syscall per file).
#[cfg(target_os = "linux")]
static NOATIME_SUPPORTED: AtomicBool = AtomicBool::new(true);

/// Open a file with O_NOATIME on Linux to avoid atime inode writes.
/// Caches whether O_NOATIME works to avoid double-open on every file.
#[cfg(target_os = "linux")]
fn open_noatime(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    if NOATIME_SUPPORTED.load(Ordering::Relaxed) {
        match fs::OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOATIME)
            .open(path)
        {
            Ok(f) => return Ok(f),
            Err(ref e) if e.raw_os_error() == Some(libc::EPERM) => {
                // O_NOATIME requires file ownership or CAP_FOWNER
                NOATIME_SUPPORTED.store(false, Ordering::Relaxed);
            }
            Err(e) => return Err(e),
        }
    }
    File::open(path)
}

#[cfg(not(target_os = "linux"))]
fn open_noatime(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Map a file read-only for the lifetime of the returned `FileData`.
///
/// Non-empty regular files are always mapped; a mapping failure is reported
/// as `SortError::Map` rather than silently falling back to a copy.
/// Everything else is read into memory: FIFOs and `/dev/stdin` cannot be
/// mapped, and zero-length mappings are rejected by the OS even though
/// procfs/sysfs files report length 0 while still having content.
///
/// No MAP_POPULATE: it synchronously faults every page with 4KB pages before
/// MADV_HUGEPAGE can take effect. HUGEPAGE is set first, then WILLNEED
/// starts async readahead.
pub fn map_file(path: &str) -> Result<FileData> {
    let file = open_noatime(Path::new(path)).map_err(|e| SortError::open(path, e))?;
    let metadata = file.metadata().map_err(|e| SortError::open(path, e))?;
    let len = metadata.len();

    if metadata.file_type().is_file() && len > 0 {
        // SAFETY: read-only mapping. The bytes are only ever borrowed through
        // the returned FileData, which outlives every line view built on it.
        // Concurrent truncation by another process is outside our control,
        // same as for any mmap-based tool.
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|e| SortError::map(path, e))?;
        #[cfg(target_os = "linux")]
        {
            if len >= 2 * 1024 * 1024 {
                let _ = mmap.advise(memmap2::Advice::HugePage);
            }
            let _ = mmap.advise(memmap2::Advice::WillNeed);
        }
        return Ok(FileData::Mmap(mmap));
    }

    // Pipe, character device or zero-length pseudo file: read from the open fd
    let mut buf = Vec::new();
    let mut reader = file;
    reader
        .read_to_end(&mut buf)
        .map_err(|e| SortError::open(path, e))?;
    Ok(FileData::Owned(buf))
}
