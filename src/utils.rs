use unicode_width::UnicodeWidthChar;

/// Safely truncate a string, ensuring it is not truncated in the middle of multi-byte characters
///
/// This function will:
/// 1. Correctly handle Unicode characters (including accented letters, emoji, etc.)
/// 2. Add ellipsis when maximum length is reached
/// 3. Ensure the output string's display width does not exceed the specified length
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthStr;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);

        if current_width + char_width + 3 > max_width {
            break;
        }

        result.push(c);
        current_width += char_width;
    }

    result.push_str("...");
    result
}

/// Title-cases a string word by word: a character following a cased letter is
/// lowered, every other one is raised ("o'neil 3d pen" -> "O'Neil 3D Pen").
/// Caseless scripts such as CJK start a new word.
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_is_cased = false;

    for c in s.chars() {
        if prev_is_cased {
            result.extend(c.to_lowercase());
        } else {
            result.extend(c.to_uppercase());
        }
        prev_is_cased = c.is_lowercase() || c.is_uppercase();
    }

    result
}

/// Drops the first `n` characters. Shorter inputs yield an empty string.
pub fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Drops the last `n` characters. Shorter inputs yield an empty string.
pub fn drop_last_chars(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return "";
    }
    match s.char_indices().nth(count - n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
