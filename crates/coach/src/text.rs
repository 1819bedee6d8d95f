//! Outbound message length limits.

/// Longest message sent to the platform, in Unicode scalar values.
pub const MAX_MESSAGE_CHARS: usize = 1900;

/// Cut `text` to at most [`MAX_MESSAGE_CHARS`] characters. No marker is added.
pub fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate("💡 今日のおすすめ"), "💡 今日のおすすめ");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "脚".repeat(MAX_MESSAGE_CHARS + 50);
        let cut = truncate(&text);
        assert_eq!(cut.chars().count(), MAX_MESSAGE_CHARS);
        assert!(text.starts_with(cut));
    }

    #[test]
    fn exact_length_is_untouched() {
        let text = "a".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(truncate(&text), text);
    }

    #[test]
    fn truncation_is_idempotent() {
        let text = "abc🏋".repeat(1000);
        let once = truncate(&text);
        assert_eq!(truncate(once), once);
    }
}
