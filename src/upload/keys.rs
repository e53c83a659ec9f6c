//! Object key derivation from client-supplied file names

/// Turn a client file name into a safe, flat object key segment.
///
/// Path separators and control characters become `_`, leading dots and
/// whitespace are dropped. Returns `None` when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches(|c: char| c == '.' || c == '_' || c.is_whitespace());

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Key for single-shot uploads: `{unix_millis}-{name}`
pub fn timestamped_key(unix_millis: i64, name: &str) -> String {
    format!("{}-{}", unix_millis, name)
}
