//! Utility functions for upload file names and message text

/// Windows device names that cannot be used as a file stem
const WINDOWS_DEVICE_FILES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// Reduce a client-supplied file name to a safe, flat ASCII name.
///
/// - Unicode is transliterated to ASCII (`"Café.pdf"` → `"Cafe.pdf"`)
/// - Path separators and whitespace runs become a single `_`
/// - Characters outside `[A-Za-z0-9_.-]` are dropped
/// - Leading and trailing `.` / `_` are trimmed, so no hidden files or
///   parent directory references survive
/// - Windows device names get a `_` prefix
///
/// The result may be empty, in which case the upload has no usable name.
///
/// # Examples
///
/// ```
/// use report_relay::utils::secure_filename;
///
/// assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
/// assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
/// assert_eq!(secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_umlauts.txt");
/// ```
pub fn secure_filename(name: &str) -> String {
    let ascii = deunicode::deunicode_with_tofu(name, "");
    let flattened: String = ascii
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if !stem.is_empty() && WINDOWS_DEVICE_FILES.contains(&stem.to_ascii_uppercase().as_str()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Lowercased text after the last `.` of `file_name`, or `""` when there is none
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Truncate `text` to at most `max_units` UTF-16 code units, on a char boundary.
///
/// Telegram measures text lengths in UTF-16, so characters outside the Basic
/// Multilingual Plane (most emoji) count as two.
///
/// ```
/// use report_relay::utils::truncate_utf16;
///
/// assert_eq!(truncate_utf16("hello", 3), "hel");
/// assert_eq!(truncate_utf16("\u{1F4CB}\u{1F4CB}", 3), "\u{1F4CB}");
/// ```
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}
