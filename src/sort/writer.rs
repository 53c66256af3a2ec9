use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::error::{Result, SortError};

/// Output sink enum to avoid Box<dyn Write> vtable dispatch overhead.
pub enum SortOutput {
    Stdout(io::StdoutLock<'static>),
    File(File),
}

impl SortOutput {
    /// Open `path` for writing (truncating), or lock stdout when `path` is None.
    pub fn open(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => File::create(path)
                .map(SortOutput::File)
                .map_err(|e| SortError::write(path, e)),
            None => Ok(SortOutput::Stdout(io::stdout().lock())),
        }
    }
}

/// Final hand-back of a sink once every byte has been flushed into it.
pub trait CloseSink: Write {
    fn close(self) -> io::Result<()>;
}

impl CloseSink for SortOutput {
    /// Regular files are synced so a failed writeback is reported instead of
    /// being lost when the descriptor is dropped. Devices like /dev/null do
    /// not support fsync and are only flushed.
    fn close(self) -> io::Result<()> {
        match self {
            SortOutput::Stdout(mut w) => w.flush(),
            SortOutput::File(f) => {
                if f.metadata()?.file_type().is_file() {
                    f.sync_all()?;
                }
                Ok(())
            }
        }
    }
}

impl Write for SortOutput {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SortOutput::Stdout(w) => w.write(buf),
            SortOutput::File(w) => w.write(buf),
        }
    }
    #[inline]
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            SortOutput::Stdout(w) => w.write_all(buf),
            SortOutput::File(w) => w.write_all(buf),
        }
    }
    #[inline]
    fn write_vectored(&mut self, bufs: &[io::IoSlice<'_>]) -> io::Result<usize> {
        match self {
            SortOutput::Stdout(w) => w.write_vectored(bufs),
            SortOutput::File(w) => w.write_vectored(bufs),
        }
    }
    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            SortOutput::Stdout(w) => w.flush(),
            SortOutput::File(w) => w.flush(),
        }
    }
}

/// Buffered, newline-terminating line writer.
///
/// Every line gets exactly one `\n` appended. Stored views never include
/// their newline, so this also terminates a final line that had none.
pub struct StreamWriter<W: Write> {
    out: BufWriter<W>,
    dest: String,
    lines: u64,
}

impl<W: Write> StreamWriter<W> {
    /// `dest` names the sink in error messages.
    pub fn new(inner: W, capacity: usize, dest: impl Into<String>) -> Self {
        StreamWriter {
            out: BufWriter::with_capacity(capacity, inner),
            dest: dest.into(),
            lines: 0,
        }
    }

    #[inline]
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.out
            .write_all(line)
            .and_then(|()| self.out.write_all(b"\n"))
            .map_err(|e| SortError::write(&self.dest, e))?;
        self.lines += 1;
        Ok(())
    }

    pub fn write_lines<'a, I>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        for line in lines {
            self.write_line(line)?;
        }
        Ok(())
    }

    /// Lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Flush buffered output and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.out
            .flush()
            .map_err(|e| SortError::write(&self.dest, e))?;
        let dest = self.dest;
        self.out
            .into_inner()
            .map_err(|e| SortError::write(&dest, e.into_error()))
    }
}

impl<W: CloseSink> StreamWriter<W> {
    /// Flush buffered output, then close the sink.
    /// Flush failures are `Write` errors; failures of the close itself are `Close`.
    pub fn close(self) -> Result<()> {
        let dest = self.dest.clone();
        self.finish()?
            .close()
            .map_err(|e| SortError::close(&dest, e))
    }
}
