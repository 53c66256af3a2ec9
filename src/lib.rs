/// Use mimalloc as the global allocator for all binaries.
/// The sort allocates one reference per input line plus a keyed copy
/// of that array, so allocator throughput shows up directly in wall time.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod error;
pub mod sort;

pub use error::{Result, SortError};
