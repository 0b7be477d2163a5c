/// Turn a device name into a storage-path segment.
/// Lower-cases the name and replaces spaces and slashes with hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace([' ', '/'], "-")
}

/// Keep at most `max_len` characters of a string
pub fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}

/// Format a byte count as kilobytes with one decimal place
pub fn format_kb(bytes: usize) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}
