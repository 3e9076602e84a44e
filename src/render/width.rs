//! Terminal display width helpers.
//!
//! ANSI-aware width calculation so widget titles stay aligned in the text
//! preview whatever escapes or wide characters they carry.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Display width of `text` after stripping ANSI escapes.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(text).as_str())
}

pub fn strip_ansi(text: &str) -> String {
    let clean = strip_ansi_escapes::strip(text);
    String::from_utf8_lossy(&clean).into_owned()
}

/// Strip escapes and cut `text` to at most `width` columns, marking the cut
/// with an ellipsis.
pub fn clip_to_width(text: &str, width: usize) -> String {
    let clean = strip_ansi(text);
    if UnicodeWidthStr::width(clean.as_str()) <= width {
        return clean;
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut clipped = String::new();
    for ch in clean.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        clipped.push(ch);
    }
    clipped.push(ELLIPSIS);
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_do_not_count() {
        assert_eq!(display_width("\u{1b}[31mHot\u{1b}[0m"), 3);
        assert_eq!(display_width("日本"), 4);
    }

    #[test]
    fn clipping_respects_wide_characters() {
        assert_eq!(clip_to_width("Camera", 6), "Camera");
        assert_eq!(clip_to_width("Camera", 4), "Cam…");
        assert_eq!(clip_to_width("日本語", 4), "日…");
        assert_eq!(clip_to_width("abc", 0), "");
        assert_eq!(clip_to_width("\u{1b}[1mLamp\u{1b}[0m", 10), "Lamp");
    }
}
