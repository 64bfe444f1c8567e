//! utilities used across tagcomplete
use {
    std::{cmp::Ordering, path::Path},
    tracing::Level,
};

/// convert a string to a log level
///
/// unknown strings fall back to [`Level::ERROR`]
pub fn string_to_log_level(lvl: &str) -> tracing::Level {
    match lvl.to_lowercase().as_str() {
        "d" | "debug" | "dbg" => Level::DEBUG,
        "t" | "trace" | "trc" => Level::TRACE,
        "e" | "error" | "err" => Level::ERROR,
        "i" | "info" | "inf" => Level::INFO,
        "w" | "warn" | "wrn" => Level::WARN,
        _ => Level::ERROR,
    }
}

/// the primary weight class of a character when collating
fn char_class(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_control()) {
        1
    } else if c.is_numeric() {
        2
    } else {
        3
    }
}

/// compare two strings the way a user would expect them to be sorted
///
/// whitespace sorts before punctuation, punctuation before digits and digits before letters.
/// letters compare case-insensitively first, and when two strings only differ in case the
/// lowercase one comes first
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .cmp(b.chars().flat_map(char::to_lowercase).map(|c| (char_class(c), c)));

    primary.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

/// check if a cell holds nothing but a number (optional sign, digits, optional decimals)
pub fn is_numeric(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);

    let (int, frac) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(int) && frac.is_none_or(all_digits)
}

/// lowercase and trim a string
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// get the file name out of a path, falling back to `dataset`
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells() {
        assert!(is_numeric("0"));
        assert!(is_numeric("-12"));
        assert!(is_numeric("+3"));
        assert!(is_numeric("1234.5"));
        assert!(!is_numeric("1."));
        assert!(!is_numeric(".5"));
        assert!(!is_numeric("12a"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("-"));
    }

    #[test]
    fn test_locale_cmp_ignores_case_first() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Zebra", "apple"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_locale_cmp_classes() {
        assert_eq!(locale_cmp("a_b", "a1"), Ordering::Less);
        assert_eq!(locale_cmp("a b", "a_b"), Ordering::Less);
        assert_eq!(locale_cmp("9", "a"), Ordering::Less);
        assert_eq!(locale_cmp("cat", "category"), Ordering::Less);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(string_to_log_level("wrn"), Level::WARN);
        assert_eq!(string_to_log_level("INFO"), Level::INFO);
        assert_eq!(string_to_log_level("nonsense"), Level::ERROR);
    }
}
