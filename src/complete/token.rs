//! finding the tag under the caret
//!
//! tags in a prompt are separated by commas or line breaks. the token is the span between the
//! separators around the caret, minus any leading whitespace

/// characters that separate tags
const SEPARATORS: [char; 3] = [',', '\n', '\r'];

/// the span of text currently being completed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// byte offset of the first non-whitespace character of the token
    pub start: usize,
    /// byte offset just past the token (the next separator or the end of the text)
    pub end: usize,
    /// byte offset of the caret
    pub caret: usize,
    /// the text from `start` up to the caret, which is what gets matched
    pub query: String,
}

impl Token {
    /// the full token text, including whatever follows the caret
    pub fn raw<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or_default()
    }
}

/// clamp a caret to the text and move it back onto a char boundary
pub fn clamp_caret(text: &str, caret: usize) -> usize {
    let mut caret = caret.min(text.len());
    while !text.is_char_boundary(caret) {
        caret -= 1;
    }
    caret
}

/// extract the token around the caret
pub fn extract_token(text: &str, caret: usize) -> Token {
    let caret = clamp_caret(text, caret);
    let (before, after) = text.split_at(caret);

    let boundary = before.rfind(SEPARATORS).map(|idx| idx + 1).unwrap_or(0);
    let leading = &before[boundary..];
    let start = boundary + (leading.len() - leading.trim_start().len());
    let end = caret + after.find(SEPARATORS).unwrap_or(after.len());

    Token {
        start,
        end,
        caret,
        query: text[start..caret].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        let token = extract_token("drag", 4);
        assert_eq!(
            token,
            Token {
                start: 0,
                end: 4,
                caret: 4,
                query: "drag".into()
            }
        );
    }

    #[test]
    fn test_middle_of_list() {
        let text = "a, b, c";
        let token = extract_token(text, 4);
        assert_eq!((token.start, token.end), (3, 4));
        assert_eq!(token.query, "b");
        assert_eq!(token.raw(text), "b");
    }

    #[test]
    fn test_text_after_caret_is_not_matched() {
        let text = "red, blue_sky, x";
        let token = extract_token(text, 8);
        assert_eq!(token.query, "blu");
        assert_eq!(token.raw(text), "blue_sky");
    }

    #[test]
    fn test_line_breaks_are_separators() {
        let text = "one\n  two\r\nthree";
        let token = extract_token(text, 9);
        assert_eq!(token.query, "two");
        assert_eq!(token.raw(text), "two");

        let token = extract_token(text, text.len());
        assert_eq!(token.query, "three");
    }

    #[test]
    fn test_caret_in_leading_space() {
        let token = extract_token("a,   b", 4);
        assert_eq!(token.query, "");
        assert_eq!(token.start, 4);
    }

    #[test]
    fn test_caret_is_clamped() {
        let token = extract_token("héllo", 2);
        assert_eq!(token.caret, 1);
        assert_eq!(token.query, "h");

        let token = extract_token("abc", 99);
        assert_eq!(token.caret, 3);
        assert_eq!(token.query, "abc");
    }
}
