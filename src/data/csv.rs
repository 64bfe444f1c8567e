//! csv tag datasets
//!
//! rows look like `tag,<category>,<post count>,<description>,<aliases>` but the columns after
//! the tag are classified by content rather than by position, so most booru exports and
//! hand-written lists load without any column mapping
use {
    super::record::{Category, RawEntry, RecordFields},
    crate::utils::is_numeric,
    hashbrown::HashSet,
};

/// the byte order mark some editors put at the start of a file
const BOM: char = '\u{feff}';

/// split csv text into rows of cells
///
/// quoted fields may contain commas and newlines, and `""` inside a quoted field is a literal
/// quote. carriage returns are dropped wherever they appear outside of quotes
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let input = text.strip_prefix(BOM).unwrap_or(text);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            '\r' => {}
            _ => cell.push(c),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
    }
    if !row.is_empty() {
        rows.push(row);
    }

    rows
}

/// expand a free-text alias cell into alias candidates
///
/// the cell is split on `|`, `;` and `,`. a segment with inner spaces also yields an
/// underscored form and each of its words
fn expand_aliases(value: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return;
    }

    let mut push = |candidate: String| {
        if seen.insert(candidate.clone()) {
            out.push(candidate);
        }
    };

    let mut segments: Vec<&str> = trimmed
        .split(['|', ';', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        segments.push(trimmed);
    }

    for segment in segments {
        push(segment.to_string());

        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.len() > 1 {
            push(words.join("_"));
            for word in words {
                if word.chars().count() > 1 {
                    push(word.to_string());
                }
            }
        }
    }
}

/// turn one row into an entry, or `None` for blank and comment rows
fn row_to_entry(row: &[String]) -> Option<RawEntry> {
    let mut cells = row.iter().map(|cell| cell.trim());
    let tag = cells.next()?;

    if tag.is_empty() || tag.starts_with('#') {
        return None;
    }

    let mut fields = RecordFields::default();
    let mut description_set = false;
    let mut seen = HashSet::new();

    for value in cells.filter(|v| !v.is_empty()) {
        if fields.category.is_none()
            && let Some(category) = Category::from_code(value)
        {
            fields.category = Some(category);
            continue;
        }

        if is_numeric(value) {
            continue;
        }

        if !description_set && value.contains(' ') {
            fields.description = value.to_string();
            description_set = true;
        }

        expand_aliases(value, &mut fields.aliases, &mut seen);
    }

    Some(RawEntry {
        tag: tag.to_string(),
        fields,
    })
}

/// parse a csv dataset into entries
///
/// this never fails: rows that don't carry a tag are skipped
pub fn parse_csv(text: &str) -> Vec<RawEntry> {
    parse_rows(text)
        .iter()
        .filter_map(|row| row_to_entry(row))
        .collect()
}
