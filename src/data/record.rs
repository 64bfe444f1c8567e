//! canonical tag records and the synonym keys derived from them
use {
    crate::utils::normalize,
    hashbrown::HashSet,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// the category a tag belongs to
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// general descriptors
    General,
    /// artist names
    Artist,
    /// franchises and other copyrights
    Copyright,
    /// named characters
    Character,
    /// meta information about the image itself
    Meta,
}

impl Category {
    /// look up a category by its numeric code or spelled-out name
    ///
    /// codes follow the usual booru export layout, where `2` is an old alias for general
    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "0" | "2" | "general" => Some(Self::General),
            "1" | "artist" => Some(Self::Artist),
            "3" | "copyright" => Some(Self::Copyright),
            "4" | "character" => Some(Self::Character),
            "5" | "meta" => Some(Self::Meta),
            _ => None,
        }
    }

    /// the spelled-out name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Artist => "artist",
            Self::Copyright => "copyright",
            Self::Character => "character",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// the optional parts of a tag entry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordFields {
    /// alternate names for the tag
    pub aliases: Vec<String>,
    /// the category, if known
    pub category: Option<Category>,
    /// a free-text description
    pub description: String,
}

/// a tag entry as it comes out of a parser, before it's been canonicalized
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// the tag name
    pub tag: String,
    /// everything else
    pub fields: RecordFields,
}

impl RawEntry {
    /// turn the entry into a canonical record
    pub fn into_record(self) -> Option<TagRecord> {
        build_record(&self.tag, self.fields)
    }
}

/// a finalized tag record
///
/// records are immutable once built. merging produces new records instead of editing old ones
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TagRecord {
    /// the canonical tag
    tag: String,
    /// alternate names, never equal to the tag (ignoring case)
    aliases: Vec<String>,
    /// the category
    #[serde(serialize_with = "ser_category")]
    category: Option<Category>,
    /// the description
    description: String,
    /// lowercase match keys
    #[serde(skip)]
    synonyms: Vec<String>,
}

/// serialize an unset category as an empty string
fn ser_category<S>(category: &Option<Category>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(category.map(|c| c.as_str()).unwrap_or(""))
}

impl TagRecord {
    /// the canonical tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// the aliases of the tag
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// the category of the tag
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// the category name, or an empty string if unset
    pub fn category_name(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or("")
    }

    /// the description of the tag
    pub fn description(&self) -> &str {
        &self.description
    }

    /// the lowercase keys used for matching
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    /// the first couple of aliases, joined for display
    pub fn alias_preview(&self) -> Option<String> {
        (!self.aliases.is_empty()).then(|| {
            self.aliases
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    /// `category · description`, skipping whichever is empty
    pub fn meta_line(&self) -> Option<String> {
        let parts: Vec<&str> = [self.category_name(), self.description.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" · "))
    }
}

/// build a canonical record from a tag and its fields
///
/// returns `None` when the tag is empty or only whitespace
pub fn build_record(tag: &str, fields: RecordFields) -> Option<TagRecord> {
    let mut draft = RecordDraft::new(tag, fields.category, fields.description)?;
    draft.add_aliases(fields.aliases.iter().map(String::as_str));
    Some(draft.finalize())
}

/// an ordered alias set that keeps a tag's own name out of it
#[derive(Clone, Debug, Default)]
struct AliasSet {
    /// aliases in insertion order
    items: Vec<String>,
    /// the same aliases, for dedup
    seen: HashSet<String>,
}

impl AliasSet {
    /// add an alias unless it's empty, a duplicate or the tag itself
    fn insert(&mut self, tag_lower: &str, alias: &str) {
        let alias = alias.trim();

        if alias.is_empty() || alias.to_lowercase() == tag_lower {
            return;
        }

        if self.seen.insert(alias.to_string()) {
            self.items.push(alias.to_string());
        }
    }
}

/// a record that is still being assembled
#[derive(Clone, Debug)]
pub(crate) struct RecordDraft {
    /// the canonical tag
    tag: String,
    /// the lowercased tag, for alias exclusion
    tag_lower: String,
    /// collected aliases
    aliases: AliasSet,
    /// the category
    category: Option<Category>,
    /// the description
    description: String,
}

impl RecordDraft {
    /// start a new draft, or `None` if the tag is blank
    pub(crate) fn new(tag: &str, category: Option<Category>, description: String) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }

        Some(Self {
            tag: tag.to_string(),
            tag_lower: tag.to_lowercase(),
            aliases: AliasSet::default(),
            category,
            description,
        })
    }

    /// start a draft from an existing record
    pub(crate) fn from_record(record: &TagRecord) -> Self {
        let mut draft = Self {
            tag: record.tag.clone(),
            tag_lower: record.tag.to_lowercase(),
            aliases: AliasSet::default(),
            category: record.category,
            description: record.description.clone(),
        };

        draft.add_aliases(record.aliases.iter().map(String::as_str));
        draft
    }

    /// add aliases to the draft
    pub(crate) fn add_aliases<'a>(&mut self, aliases: impl IntoIterator<Item = &'a str>) {
        for alias in aliases {
            self.aliases.insert(&self.tag_lower, alias);
        }
    }

    /// fold a later record for the same tag into this one
    ///
    /// aliases are unioned, while category and description are only filled while still empty
    pub(crate) fn absorb(&mut self, record: &TagRecord) {
        self.add_aliases(record.aliases.iter().map(String::as_str));

        if self.category.is_none() {
            self.category = record.category;
        }

        if self.description.is_empty() && !record.description.is_empty() {
            self.description = record.description.clone();
        }
    }

    /// freeze the draft into a record, deriving its synonyms
    pub(crate) fn finalize(self) -> TagRecord {
        let aliases = self.aliases.items;
        let synonyms = build_synonyms(&self.tag, &aliases, &self.description);

        TagRecord {
            tag: self.tag,
            aliases,
            category: self.category,
            description: self.description,
            synonyms,
        }
    }
}

/// derive the match keys for a tag
///
/// the tag, each alias and the description are added whole (lowercased), and then again as
/// individual words after treating `_` and `-` as spaces. single-character words are skipped
pub fn build_synonyms(tag: &str, aliases: &[String], description: &str) -> Vec<String> {
    let mut synonyms = Vec::new();
    let mut seen = HashSet::new();

    let mut add = |value: &str| {
        let value = normalize(value);
        if !value.is_empty() && seen.insert(value.clone()) {
            synonyms.push(value);
        }
    };

    let mut add_with_parts = |value: &str| {
        add(value);

        let spaced = value.replace(['_', '-'], " ");
        for part in spaced.split_whitespace() {
            if part.chars().count() > 1 {
                add(part);
            }
        }
    };

    add_with_parts(tag);
    for alias in aliases {
        add_with_parts(alias);
    }
    if !description.is_empty() {
        add_with_parts(description);
    }

    synonyms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(aliases: &[&str]) -> RecordFields {
        RecordFields {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_tags_are_rejected() {
        assert!(build_record("", RecordFields::default()).is_none());
        assert!(build_record("   \t", RecordFields::default()).is_none());
    }

    #[test]
    fn test_aliases_exclude_the_tag_itself() {
        let record = build_record("Blue_Sky", fields(&["blue_sky", "BLUE_SKY", " azure ", ""]))
            .expect("record");

        assert_eq!(record.aliases(), ["azure"]);
        assert!(
            record
                .aliases()
                .iter()
                .all(|a| a.to_lowercase() != record.tag().to_lowercase())
        );
    }

    #[test]
    fn test_aliases_dedup_case_sensitively() {
        let record = build_record("cat", fields(&["kitty", "kitty", "Kitty"])).expect("record");
        assert_eq!(record.aliases(), ["kitty", "Kitty"]);
    }

    #[test]
    fn test_synonyms_include_words() {
        let record = build_record(
            "long_hair",
            RecordFields {
                aliases: vec!["very-long hair".to_string()],
                category: Some(Category::General),
                description: "hair past the shoulders".to_string(),
            },
        )
        .expect("record");

        let synonyms = record.synonyms();
        for expected in [
            "long_hair",
            "long",
            "hair",
            "very-long hair",
            "very",
            "hair past the shoulders",
            "past",
            "the",
            "shoulders",
        ] {
            assert!(synonyms.contains(&expected.to_string()), "missing {expected}");
        }

        let unique: HashSet<_> = synonyms.iter().collect();
        assert_eq!(unique.len(), synonyms.len());
    }

    #[test]
    fn test_single_char_parts_are_skipped() {
        let record = build_record("a_b_cd", RecordFields::default()).expect("record");
        assert_eq!(record.synonyms(), ["a_b_cd", "cd"]);
    }

    #[test]
    fn test_tag_is_always_a_synonym() {
        let record = build_record("X", RecordFields::default()).expect("record");
        assert_eq!(record.synonyms(), ["x"]);
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::from_code("0"), Some(Category::General));
        assert_eq!(Category::from_code("2"), Some(Category::General));
        assert_eq!(Category::from_code("4"), Some(Category::Character));
        assert_eq!(Category::from_code("meta"), Some(Category::Meta));
        assert_eq!(Category::from_code("Meta"), None);
        assert_eq!(Category::from_code("6"), None);
    }

    #[test]
    fn test_display_helpers() {
        let record = build_record(
            "cat",
            RecordFields {
                aliases: vec!["kitty".into(), "feline".into(), "neko".into()],
                category: Some(Category::General),
                description: String::new(),
            },
        )
        .expect("record");

        assert_eq!(record.alias_preview().as_deref(), Some("kitty, feline"));
        assert_eq!(record.meta_line().as_deref(), Some("general"));
    }
}
