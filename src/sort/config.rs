use crate::error::{Result, SortError};

/// Default number of leading bytes compared per line.
pub const DEFAULT_PREFIX_LENGTH: usize = 19;

/// 32MB output buffer: amortizes write() syscalls over many short lines.
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// How lines whose compared prefixes are byte-identical are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Prefix only; relative order of equal-prefix lines is unspecified.
    #[default]
    Unspecified,
    /// Equal-prefix lines keep input order (file order, then line order).
    InputOrder,
    /// Equal-prefix lines are ordered by a whole-line byte comparison.
    FullLine,
}

/// Configuration for a prefix sort run.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub prefix_length: usize,
    pub write_buffer_size: usize,
    pub skip_header: bool,
    /// Worker count for mapping, indexing and sorting. None = all cores.
    pub concurrency: Option<usize>,
    pub tie_break: TieBreak,
    /// None or "-" writes to standard output.
    pub output_file: Option<String>,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            prefix_length: DEFAULT_PREFIX_LENGTH,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            skip_header: false,
            concurrency: None,
            tie_break: TieBreak::Unspecified,
            output_file: None,
        }
    }
}

impl SortConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prefix_length == 0 {
            return Err(SortError::Config(
                "prefix length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective worker count: the configured limit clamped to at least one,
    /// or the number of available processing units.
    pub fn worker_count(&self) -> usize {
        match self.concurrency {
            Some(n) => n.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// Output path, or None for standard output.
    pub fn output_path(&self) -> Option<&str> {
        match self.output_file.as_deref() {
            None | Some("-") => None,
            Some(path) => Some(path),
        }
    }
}

/// Parse a buffer size string like "10K", "1M", "1G".
pub fn parse_buffer_size(s: &str) -> Result<usize> {
    let s = s.trim();
    if s.is_empty() {
        return Err(SortError::Config("empty buffer size".to_string()));
    }

    let (num_part, suffix) = if s.ends_with(|c: char| c.is_ascii_alphabetic()) {
        let (n, s) = s.split_at(s.len() - 1);
        (n, s.chars().next())
    } else {
        (s, None)
    };

    let base: usize = num_part
        .parse()
        .map_err(|_| SortError::Config(format!("invalid buffer size: {}", s)))?;

    let multiplier: usize = match suffix {
        Some('K') | Some('k') => 1024,
        Some('M') | Some('m') => 1024 * 1024,
        Some('G') | Some('g') => 1024 * 1024 * 1024,
        Some('T') | Some('t') => 1024usize.pow(4),
        Some('b') => 512,
        Some(c) => {
            return Err(SortError::Config(format!(
                "invalid suffix '{}' in buffer size",
                c
            )));
        }
        None => 1,
    };

    base.checked_mul(multiplier)
        .ok_or_else(|| SortError::Config(format!("buffer size too large: {}", s)))
}
