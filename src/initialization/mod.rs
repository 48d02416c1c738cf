//! Process-wide setup for the command-line binary.

mod logger;

pub use logger::init_logger_with;
