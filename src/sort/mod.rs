pub mod config;
pub mod core;
pub mod index;
pub mod source;
pub mod sorter;
pub mod writer;


pub use self::config::*;
pub use self::core::*;
pub use self::index::*;
pub use self::sorter::*;
pub use self::source::*;
pub use self::writer::*;
