//! Report output.

pub mod terminal;

pub use terminal::{format_table, TerminalSink};
