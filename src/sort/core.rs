/// Run pipeline for fpsort.
///
/// Stages, each finishing before the next starts:
/// 1. Map every input concurrently (bounded pool), counting lines per file
/// 2. Allocate one line index at its final size and fill per-file ranges in parallel
/// 3. Sort the index by prefix key
/// 4. Stream the sorted lines through a buffered writer
///
/// All stages share one rayon pool sized by `SortConfig::worker_count`.
use std::fs;
use std::io::Write;
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use super::config::SortConfig;
use super::index::LineIndex;
use super::source::{FileMeta, map_sources};
use super::sorter::PrefixSorter;
use super::writer::{SortOutput, StreamWriter};
use crate::error::{Result, SortError};

/// Build the bounded worker pool used by every parallel stage.
pub fn build_pool(workers: usize) -> Result<ThreadPool> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("fpsort-{}", i))
        .build()?;
    Ok(pool)
}

#[inline]
fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

/// True when `a` and `b` name the same file, including through hard links
/// and bind mounts.
#[cfg(unix)]
fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Fail if the output is one of the inputs under any name.
/// Truncating a file that is still mapped would fault the process mid-sort
/// and leave the input empty.
#[cfg(unix)]
fn reject_output_overlap(inputs: &[String], output: &str) -> Result<()> {
    let Ok(out) = fs::metadata(output) else {
        return Ok(());
    };
    for input in inputs {
        if fs::metadata(input).is_ok_and(|m| same_file(&m, &out)) {
            return Err(overlap_error(output));
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn reject_output_overlap(inputs: &[String], output: &str) -> Result<()> {
    let Ok(out) = fs::canonicalize(output) else {
        return Ok(());
    };
    for input in inputs {
        if fs::canonicalize(input).is_ok_and(|p| p == out) {
            return Err(overlap_error(output));
        }
    }
    Ok(())
}

fn overlap_error(output: &str) -> SortError {
    SortError::Config(format!("output file is also an input: {}", output))
}

/// Shared body of the pipeline. `open_sink` runs only after every input
/// is mapped, so a failing input never truncates the destination.
/// `finish` flushes (and possibly closes) the writer once every line is in.
fn run<W, R, F, G>(inputs: &[String], config: &SortConfig, open_sink: F, finish: G) -> Result<R>
where
    W: Write,
    F: FnOnce() -> Result<(W, String)>,
    G: FnOnce(StreamWriter<W>) -> Result<R>,
{
    config.validate()?;

    let total_start = Instant::now();
    let workers = config.worker_count();
    let pool = build_pool(workers)?;

    let start = Instant::now();
    let files: Vec<FileMeta> = map_sources(inputs, config.skip_header, &pool)?;
    tracing::info!(
        files = files.len(),
        workers,
        elapsed_ms = elapsed_ms(start),
        "mapped inputs"
    );

    let start = Instant::now();
    let mut index = LineIndex::build(&files, &pool);
    tracing::info!(
        lines = index.len(),
        elapsed_ms = elapsed_ms(start),
        "built line index"
    );

    let start = Instant::now();
    for meta in &files {
        meta.data().advise_random();
    }
    let sorter = PrefixSorter::from_config(config);
    pool.install(|| sorter.sort(&mut index));
    debug_assert!(sorter.is_sorted(index.lines()));
    tracing::info!(
        prefix_length = sorter.prefix_length(),
        tie_break = ?sorter.tie_break(),
        elapsed_ms = elapsed_ms(start),
        "sorted lines"
    );

    let start = Instant::now();
    let (sink, dest) = open_sink()?;
    let mut writer = StreamWriter::new(sink, config.write_buffer_size, dest);
    writer.write_lines(index.iter().copied())?;
    let written = writer.lines_written();
    let out = finish(writer)?;
    tracing::info!(
        lines = written,
        elapsed_ms = elapsed_ms(start),
        "wrote output"
    );

    tracing::info!(elapsed_ms = elapsed_ms(total_start), "done");
    Ok(out)
}

/// Sort `inputs` and write the result into `sink`, returning it afterwards.
/// `config.output_file` is ignored.
pub fn sort_into<W: Write>(inputs: &[String], config: &SortConfig, sink: W) -> Result<W> {
    run(
        inputs,
        config,
        || Ok((sink, "output".to_string())),
        StreamWriter::finish,
    )
}

/// Main entry point: sort `inputs` into `config.output_file` or stdout.
pub fn sort_and_output(inputs: &[String], config: &SortConfig) -> Result<()> {
    let path = config.output_path();
    if let Some(path) = path {
        reject_output_overlap(inputs, path)?;
    }

    run(
        inputs,
        config,
        || {
            let out = SortOutput::open(path)?;
            Ok((out, path.unwrap_or("standard output").to_string()))
        },
        StreamWriter::close,
    )
}
