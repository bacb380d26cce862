//! Console output

mod console;
mod formatter;

pub use console::ConsoleObserver;
pub use formatter::ConsoleFormatter;
