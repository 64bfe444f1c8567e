//! putting a chosen tag back into the text
use super::token::{Token, extract_token};

/// the result of committing a tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spliced {
    /// the new field text
    pub text: String,
    /// byte offset of the caret, right after the inserted tag
    pub caret: usize,
}

/// whether a `", "` has to go in front of the tag
fn needs_leading_comma(before: &str) -> bool {
    before.contains(',') && !before.trim().is_empty() && !before.trim_end().ends_with(',')
}

/// replace the token span in `text` with `tag`
///
/// the text after the tag is normalized so that one `", "` (or the line break already there)
/// separates the tag from whatever follows. a token whose span doesn't fit `text` is read
/// again at its caret
pub fn splice(text: &str, token: &Token, tag: &str) -> Spliced {
    let start = token.start.min(text.len());
    let end = token.end.clamp(start, text.len());
    if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return splice(text, &extract_token(text, token.caret), tag);
    }
    let (before, after) = (&text[..start], &text[end..]);

    let mut out = String::with_capacity(text.len() + tag.len() + 4);
    if needs_leading_comma(before) {
        out.push_str(before.trim_end());
        out.push_str(", ");
    } else {
        out.push_str(before);
    }

    out.push_str(tag);
    let caret = out.len();

    match after.strip_prefix(',') {
        Some(rest) if !rest.starts_with(char::is_whitespace) => {
            out.push_str(", ");
            out.push_str(rest);
        }
        Some(_) => out.push_str(after),
        None if !after.is_empty() && !after.starts_with('\n') => {
            out.push_str(", ");
            out.push_str(after.trim_start());
        }
        None => out.push_str(after),
    }

    Spliced { text: out, caret }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(text: &str, caret: usize, tag: &str) -> Spliced {
        splice(text, &extract_token(text, caret), tag)
    }

    #[test]
    fn test_replace_middle_tag() {
        let out = commit("a, b, c", 4, "beta");
        assert_eq!(out.text, "a, beta, c");
        assert_eq!(out.caret, 7);
    }

    #[test]
    fn test_single_token() {
        let out = commit("drag", 4, "dragon");
        assert_eq!(out.text, "dragon");
        assert_eq!(out.caret, 6);
    }

    #[test]
    fn test_caret_mid_token_replaces_whole_token() {
        let out = commit("cat,dog, x", 6, "doge");
        assert_eq!(out.text, "cat,doge, x");
        assert_eq!(out.caret, 8);
    }

    #[test]
    fn test_tight_comma_after_gets_a_space() {
        let out = commit("a,b,c", 3, "beta");
        assert_eq!(out.text, "a,beta, c");
        assert_eq!(out.caret, 6);
    }

    #[test]
    fn test_last_tag_after_comma_space() {
        let out = commit("cat, do", 7, "dog");
        assert_eq!(out.text, "cat, dog");
        assert_eq!(out.caret, 8);
    }

    #[test]
    fn test_line_break_after_is_kept() {
        let out = commit("fo\nbar", 2, "fox");
        assert_eq!(out.text, "fox\nbar");
        assert_eq!(out.caret, 3);
    }

    #[test]
    fn test_new_line_after_commas_gets_a_comma() {
        let out = commit("a, b\nca", 7, "cat");
        assert_eq!(out.text, "a, b, cat");
        assert_eq!(out.caret, 9);
    }

    #[test]
    fn test_carriage_return_after_is_normalized() {
        let out = commit("ab\r\nc", 2, "abc");
        assert_eq!(out.text, "abc, c");
        assert_eq!(out.caret, 3);
    }

    #[test]
    fn test_span_inside_a_char_is_read_again() {
        let stale = Token {
            start: 0,
            end: 3,
            caret: 4,
            query: "ca".into(),
        };

        let out = splice("éé", &stale, "cat");
        assert_eq!(out.text, "cat");
        assert_eq!(out.caret, 3);
    }
}
