//! Utility modules

pub mod file_io;

pub use file_io::{read_lines_lossy, FileReadStats, GcodeFileReader};
