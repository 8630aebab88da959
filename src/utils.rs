use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates `s` to at most `max_width` terminal columns, ending with `...`
/// when anything was cut.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width < 3 {
        return ".".repeat(max_width);
    }

    let budget = max_width - 3;
    let mut width = 0;
    let mut result = String::new();
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > budget {
            break;
        }
        width += ch_width;
        result.push(ch);
    }
    result.push_str("...");
    result
}

/// First non-empty line of `s`, used for one-line previews.
pub fn first_line(s: &str) -> &str {
    s.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}
