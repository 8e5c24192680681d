use once_cell::sync::Lazy;
use regex::Regex;

/// Glyph placeholders emitted for characters a PDF font could not map:
/// `(cid:123)` and `GLYPH<c=3,font=/AAAAAB+Foo>`.
static GLYPH_PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(cid:\d+\)|GLYPH<[^>]*>").unwrap());

/// Classify text as corrupted when the share of suspicious characters among
/// non-whitespace characters is above `threshold`.
///
/// Suspicious: control characters other than tab/CR/LF, U+FFFD, private-use
/// code points, and every character of a glyph placeholder.
pub fn is_corrupted(text: &str, threshold: f32) -> bool {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return false;
    }
    let placeholder_chars: usize = GLYPH_PLACEHOLDER_RE
        .find_iter(text)
        .map(|m| m.as_str().chars().count())
        .sum();
    let stray_chars = GLYPH_PLACEHOLDER_RE
        .replace_all(text, "")
        .chars()
        .filter(|&c| is_suspicious_char(c))
        .count();
    (placeholder_chars + stray_chars) as f32 / total as f32 > threshold
}

fn is_suspicious_char(c: char) -> bool {
    if matches!(c, '\t' | '\n' | '\r') {
        return false;
    }
    c.is_control()
        || c == '\u{fffd}'
        || matches!(c, '\u{e000}'..='\u{f8ff}' | '\u{f0000}'..='\u{10ffff}')
}

/// True if the text ends a sentence (`.`, `!` or `?`, optionally followed
/// by closing quotes or brackets). Glyph placeholders are ignored.
pub fn ends_sentence(text: &str) -> bool {
    let clean = GLYPH_PLACEHOLDER_RE.replace_all(text, "");
    let tail = clean
        .trim_end()
        .trim_end_matches(['"', '\'', ')', ']', '\u{201d}', '\u{2019}']);
    tail.ends_with(['.', '!', '?'])
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
