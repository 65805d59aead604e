//! Output formatting utilities

use colored::Colorize;

/// Print a section header.
pub(crate) fn header(title: &str) {
    println!("{}", title.bold().underline());
}

/// Print an aligned `key: value` line.
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {}", format!("{key}:").cyan(), value);
}

/// Format a shape as `[a, b, c]`.
pub(crate) fn shape(dims: &[usize]) -> String {
    let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}
