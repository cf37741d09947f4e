//! UTF-8-safe string truncation utilities
//!
//! Host names and file extensions are truncated to bounded widths before
//! they are written into the document or the asset folder. Slicing by byte
//! offset would panic on multi-byte characters (IDN hosts, emoji paths).

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use kodegen_tools_standalone::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("🎉🎊🎈", 2), "🎉🎊");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}
