//! Text normalization applied before similarity computation.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]|_").expect("valid non-word regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Lower-cases `text`, replaces every character that is neither alphanumeric
/// nor whitespace with a space, collapses whitespace runs and trims the ends.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_symbols = NON_WORD_RE.replace_all(&lowered, " ");
    WHITESPACE_RE
        .replace_all(&without_symbols, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize("  First day at the Tech company!! Nervous, but EXCITED. "),
            "first day at the tech company nervous but excited"
        );
    }

    #[test]
    fn normalize_splits_on_symbols_and_underscores() {
        assert_eq!(normalize("don't\tstop_now\n\n#1"), "don t stop now 1");
    }

    #[test]
    fn normalize_keeps_unicode_letters() {
        assert_eq!(normalize("Café & Über"), "café über");
    }

    #[test]
    fn normalize_empty_and_symbol_only_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!... ---"), "");
    }
}
