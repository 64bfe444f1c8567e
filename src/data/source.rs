//! where records come from
use {
    hashbrown::HashMap,
    schemars::JsonSchema,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// the format of a dataset document
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// comma separated rows
    Csv,
    /// an array of entry objects
    #[default]
    Json,
}

impl SourceFormat {
    /// guess the format from a url or file name
    ///
    /// only a `.csv` suffix means csv, everything else is treated as json
    pub fn guess(name: &str) -> Self {
        if name.to_lowercase().ends_with(".csv") {
            Self::Csv
        } else {
            Self::Json
        }
    }

    /// parse a format name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// the other format, used as a parsing fallback
    pub fn other(&self) -> Self {
        match self {
            Self::Csv => Self::Json,
            Self::Json => Self::Csv,
        }
    }

    /// the lowercase name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// information about one source that contributed records
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    /// stable key (url, `file:<name>` or a generated fallback)
    pub id: String,
    /// human readable label
    pub label: String,
    /// the format it was loaded as
    #[serde(rename = "type")]
    pub format: SourceFormat,
    /// how many records it contributed, before dedup
    pub size: usize,
}

impl SourceInfo {
    /// make a new source info
    pub fn new(id: impl Into<String>, label: impl Into<String>, format: SourceFormat, size: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            format,
            size,
        }
    }
}

/// every source that went into a dataset, keyed by id
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLedger {
    /// sources in the order they were first seen
    entries: Vec<SourceInfo>,
    /// id -> index into `entries`
    index: HashMap<String, usize>,
}

impl SourceLedger {
    /// record a source, summing sizes with an existing entry for the same id
    ///
    /// a source with a blank id gets `source-<n>` instead
    pub fn record(&mut self, source: &SourceInfo) {
        let id = if source.id.trim().is_empty() {
            format!("source-{}", self.entries.len())
        } else {
            source.id.clone()
        };

        if let Some(&idx) = self.index.get(&id) {
            self.entries[idx].size += source.size;
            return;
        }

        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(SourceInfo {
            id,
            ..source.clone()
        });
    }

    /// look a source up by id
    pub fn get(&self, id: &str) -> Option<&SourceInfo> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    /// iterate over all sources
    pub fn iter(&self) -> impl Iterator<Item = &SourceInfo> {
        self.entries.iter()
    }

    /// the number of distinct sources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// check if there are no sources
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// copy the sources out
    pub fn to_vec(&self) -> Vec<SourceInfo> {
        self.entries.clone()
    }
}

impl<'a> FromIterator<&'a SourceInfo> for SourceLedger {
    fn from_iter<I: IntoIterator<Item = &'a SourceInfo>>(iter: I) -> Self {
        let mut ledger = Self::default();
        for source in iter {
            ledger.record(source);
        }
        ledger
    }
}
