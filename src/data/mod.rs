//! tag dataset stuff

use {
    crate::utils::locale_cmp,
    hashbrown::HashMap,
    std::{ops::Deref, sync::Arc},
};

pub mod csv;
pub mod json;
pub mod merge;
pub mod record;
pub mod source;

pub use {
    merge::{Batch, Merged, merge},
    record::{Category, RawEntry, RecordFields, TagRecord, build_record},
    source::{SourceFormat, SourceInfo, SourceLedger},
};

/// a sorted, deduplicated set of tag records
///
/// cloning a dataset is cheap, the records themselves are shared
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    /// records sorted by tag
    records: Vec<Arc<TagRecord>>,
    /// tag -> index into `records`
    by_tag: HashMap<String, usize>,
}

impl Dataset {
    /// build a dataset from records, sorting them by tag
    ///
    /// if two records share a tag only the first one is kept
    pub fn from_records(records: Vec<Arc<TagRecord>>) -> Self {
        let mut by_tag = HashMap::with_capacity(records.len());
        let mut unique: Vec<Arc<TagRecord>> = records
            .into_iter()
            .filter(|r| by_tag.insert(r.tag().to_string(), 0).is_none())
            .collect();

        unique.sort_by(|a, b| locale_cmp(a.tag(), b.tag()));

        for (idx, record) in unique.iter().enumerate() {
            by_tag.insert(record.tag().to_string(), idx);
        }

        Self {
            records: unique,
            by_tag,
        }
    }

    /// retrieve a record by exact tag
    pub fn get(&self, tag: &str) -> Option<&Arc<TagRecord>> {
        self.by_tag.get(tag).map(|&idx| &self.records[idx])
    }

    /// checks if a record exists with the given tag
    pub fn exists(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// the records as a slice
    pub fn records(&self) -> &[Arc<TagRecord>] {
        &self.records
    }
}

impl Deref for Dataset {
    type Target = [Arc<TagRecord>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl FromIterator<TagRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = TagRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().map(Arc::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_records_sorts_and_indexes() {
        let dataset: Dataset = ["dog", "Cat", "bird", "dog"]
            .into_iter()
            .filter_map(|tag| build_record(tag, RecordFields::default()))
            .collect();

        let tags: Vec<_> = dataset.iter().map(|r| r.tag()).collect();
        assert_eq!(tags, ["bird", "Cat", "dog"]);
        assert!(dataset.exists("Cat"));
        assert!(!dataset.exists("cat"));
        assert_eq!(dataset.get("dog").map(|r| r.tag()), Some("dog"));
    }
}
