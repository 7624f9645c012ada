//! Text utility functions for the Lectern core library.

/// Cut a string down to at most `max_chars` Unicode characters.
///
/// Strings at or below the limit are returned unchanged. No ellipsis is
/// appended, so the result is never longer than `max_chars`.
///
/// Uses `.chars()` for multi-byte safety.
pub fn clip(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Shorten a string for display, appending `...` when anything was cut.
///
/// The first `max_chars` characters are kept intact, so a clipped result is
/// `max_chars + 3` characters long.
pub fn preview(s: &str, max_chars: usize) -> String {
    let clipped = clip(s, max_chars);
    if clipped.len() < s.len() {
        format!("{clipped}...")
    } else {
        clipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_short_string_unchanged() {
        assert_eq!(clip("hello", 10), "hello");
    }

    #[test]
    fn test_clip_exact_limit_unchanged() {
        assert_eq!(clip("hello", 5), "hello");
    }

    #[test]
    fn test_clip_longer_string() {
        assert_eq!(clip("hello world", 5), "hello");
    }

    #[test]
    fn test_clip_zero() {
        assert_eq!(clip("hello", 0), "");
        assert_eq!(clip("", 0), "");
    }

    #[test]
    fn test_clip_multibyte_chars() {
        // Cyrillic 'а' is 2 bytes; naive byte slicing would panic
        let s: String = "а".repeat(20);
        let result = clip(&s, 7);
        assert_eq!(result.chars().count(), 7);
    }

    #[test]
    fn test_clip_emoji() {
        assert_eq!(clip("🦀🦀🦀🦀🦀", 2), "🦀🦀");
    }

    #[test]
    fn test_preview_short_string_unchanged() {
        assert_eq!(preview("a quiet passage", 100), "a quiet passage");
    }

    #[test]
    fn test_preview_long_string_adds_ellipsis() {
        assert_eq!(preview("hello world", 5), "hello...");
    }

    #[test]
    fn test_preview_keeps_full_limit() {
        let s = "x".repeat(150);
        let result = preview(&s, 100);
        assert_eq!(result.chars().count(), 103);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_preview_multibyte_at_limit() {
        let s: String = "а".repeat(5);
        assert_eq!(preview(&s, 5), s);
    }
}
