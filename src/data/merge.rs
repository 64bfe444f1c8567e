//! merging datasets from many sources into one
use {
    super::{
        Dataset,
        record::{RecordDraft, TagRecord},
        source::{SourceInfo, SourceLedger},
    },
    hashbrown::HashMap,
    std::sync::Arc,
};

/// records loaded together along with the sources they came from
#[derive(Clone, Debug, Default)]
pub struct Batch {
    /// the records in the batch
    pub records: Vec<TagRecord>,
    /// the sources the records came from
    pub sources: Vec<SourceInfo>,
}

impl Batch {
    /// a batch of records from a single source
    pub fn from_source(records: Vec<TagRecord>, source: SourceInfo) -> Self {
        Self {
            records,
            sources: vec![source],
        }
    }

    /// turn an existing merged dataset back into a batch so more can be merged into it
    pub fn from_merged(merged: &Merged) -> Self {
        Self::from_dataset(&merged.dataset, &merged.sources)
    }

    /// turn a dataset and its ledger back into a batch
    pub fn from_dataset(dataset: &Dataset, sources: &SourceLedger) -> Self {
        Self {
            records: dataset.iter().map(|r| (**r).clone()).collect(),
            sources: sources.to_vec(),
        }
    }
}

/// the result of a merge
#[derive(Clone, Debug, Default)]
pub struct Merged {
    /// the deduplicated, sorted records
    pub dataset: Dataset,
    /// every source that contributed
    pub sources: SourceLedger,
}

impl Merged {
    /// the number of tags in the dataset
    pub fn tag_count(&self) -> usize {
        self.dataset.len()
    }

    /// the number of distinct sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

/// merge any number of batches into one dataset
///
/// the first record seen for a tag is the canonical one. later records for the same tag add
/// their aliases, and only fill in the category and description while those are still empty.
/// sources with the same id have their sizes summed, so merging a batch with itself leaves the
/// records alone but doubles the sizes
pub fn merge<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Merged {
    let mut order: Vec<String> = Vec::new();
    let mut drafts: HashMap<String, RecordDraft> = HashMap::new();
    let mut sources = SourceLedger::default();

    for batch in batches {
        for source in &batch.sources {
            sources.record(source);
        }

        for record in &batch.records {
            match drafts.get_mut(record.tag()) {
                Some(draft) => draft.absorb(record),
                None => {
                    order.push(record.tag().to_string());
                    drafts.insert(record.tag().to_string(), RecordDraft::from_record(record));
                }
            }
        }
    }

    let records = order
        .into_iter()
        .filter_map(|tag| drafts.remove(&tag))
        .map(|draft| Arc::new(draft.finalize()))
        .collect();

    Merged {
        dataset: Dataset::from_records(records),
        sources,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::data::{
            record::{Category, RecordFields, build_record},
            source::SourceFormat,
        },
    };

    fn rec(tag: &str, aliases: &[&str], category: Option<Category>, desc: &str) -> TagRecord {
        build_record(
            tag,
            RecordFields {
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                category,
                description: desc.to_string(),
            },
        )
        .expect("record")
    }

    fn batch(id: &str, records: Vec<TagRecord>) -> Batch {
        let size = records.len();
        Batch::from_source(records, SourceInfo::new(id, id, SourceFormat::Csv, size))
    }

    fn tags(merged: &Merged) -> Vec<&str> {
        merged.dataset.iter().map(|r| r.tag()).collect()
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let a = batch("a", vec![rec("zebra", &[], None, ""), rec("apple", &[], None, "")]);
        let b = batch("b", vec![rec("apple", &["pomme"], None, ""), rec("Mango", &[], None, "")]);

        let merged = merge([&a, &b]);
        assert_eq!(tags(&merged), ["apple", "Mango", "zebra"]);
        assert_eq!(merged.dataset.get("apple").expect("apple").aliases(), ["pomme"]);
        assert_eq!(merged.source_count(), 2);
    }

    #[test]
    fn test_self_merge_doubles_sizes_only() {
        let x = batch(
            "x",
            vec![
                rec("cat", &["kitty"], Some(Category::General), "a small feline"),
                rec("dog", &[], None, ""),
            ],
        );

        let once = merge([&x]);
        let twice = merge([&x, &x]);

        assert_eq!(tags(&once), tags(&twice));
        for (a, b) in once.dataset.iter().zip(twice.dataset.iter()) {
            assert_eq!(a, b);
        }
        assert_eq!(once.sources.get("x").expect("x").size, 2);
        assert_eq!(twice.sources.get("x").expect("x").size, 4);
    }

    #[test]
    fn test_union_fields_are_order_independent() {
        let a = batch("a", vec![rec("cat", &["kitty"], None, "")]);
        let b = batch("b", vec![rec("cat", &["feline"], None, ""), rec("dog", &[], None, "")]);

        let ab = merge([&a, &b]);
        let ba = merge([&b, &a]);

        assert_eq!(tags(&ab), tags(&ba));

        let mut ab_aliases = ab.dataset.get("cat").expect("cat").aliases().to_vec();
        let mut ba_aliases = ba.dataset.get("cat").expect("cat").aliases().to_vec();
        ab_aliases.sort();
        ba_aliases.sort();
        assert_eq!(ab_aliases, ba_aliases);

        let mut ab_syn = ab.dataset.get("cat").expect("cat").synonyms().to_vec();
        let mut ba_syn = ba.dataset.get("cat").expect("cat").synonyms().to_vec();
        ab_syn.sort();
        ba_syn.sort();
        assert_eq!(ab_syn, ba_syn);
    }

    #[test]
    fn test_first_scalar_wins() {
        let a = batch("a", vec![rec("cat", &[], Some(Category::Artist), "first")]);
        let b = batch("b", vec![rec("cat", &[], Some(Category::Meta), "second")]);
        let empty = batch("c", vec![rec("cat", &[], None, "")]);

        let ab = merge([&a, &b]);
        let ba = merge([&b, &a]);
        let filled = merge([&empty, &b]);

        let cat = ab.dataset.get("cat").expect("cat");
        assert_eq!(cat.category(), Some(Category::Artist));
        assert_eq!(cat.description(), "first");

        let cat = ba.dataset.get("cat").expect("cat");
        assert_eq!(cat.category(), Some(Category::Meta));
        assert_eq!(cat.description(), "second");

        let cat = filled.dataset.get("cat").expect("cat");
        assert_eq!(cat.category(), Some(Category::Meta));
        assert_eq!(cat.description(), "second");
    }

    #[test]
    fn test_later_aliases_still_skip_the_tag() {
        let a = batch("a", vec![rec("Cat", &[], None, "")]);
        let b = batch("b", vec![rec("Cat", &["kitty"], None, "")]);
        let c = Batch {
            records: vec![rec("Cat", &["kitty", "neko"], None, "")],
            sources: vec![],
        };

        let merged = merge([&a, &b, &c]);
        let cat = merged.dataset.get("Cat").expect("cat");
        assert_eq!(cat.aliases(), ["kitty", "neko"]);
        assert!(cat.synonyms().contains(&"neko".to_string()));
    }

    #[test]
    fn test_merge_into_existing() {
        let first = merge([&batch("a", vec![rec("cat", &[], None, "")])]);
        let more = batch("b", vec![rec("dog", &[], None, "")]);
        let combined = merge([&Batch::from_merged(&first), &more]);

        assert_eq!(tags(&combined), ["cat", "dog"]);
        assert_eq!(combined.source_count(), 2);
    }
}
