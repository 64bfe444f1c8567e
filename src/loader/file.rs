//! datasets picked from local files
use {
    crate::{
        data::{Batch, RawEntry, SourceFormat, SourceInfo, csv::parse_csv, json::parse_json},
        error::Result,
        utils::file_name_of,
    },
    std::path::Path,
    tracing::debug,
};

/// a local file and its contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalFile {
    /// the file name, used to guess the format and to label the source
    pub name: String,
    /// the file contents
    pub contents: String,
}

impl LocalFile {
    /// make a local file from a name and contents
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// read a file from disk
    ///
    /// invalid utf-8 is replaced rather than rejected
    ///
    /// # Errors
    ///
    /// returns an error if the file can't be read
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        Ok(Self {
            name: file_name_of(path),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// the source id for this file
    pub fn source_id(&self) -> String {
        format!("file:{}", self.name)
    }
}

/// parse text in a given format
pub(crate) fn parse_as(format: SourceFormat, source_id: &str, text: &str) -> Result<Vec<RawEntry>> {
    match format {
        SourceFormat::Csv => Ok(parse_csv(text)),
        SourceFormat::Json => parse_json(source_id, text),
    }
}

/// parse a local file into a batch
///
/// the format guessed from the file name is tried first, then the other one. if neither works
/// the batch is empty
pub fn parse_local_file(file: &LocalFile) -> Batch {
    let hint = SourceFormat::guess(&file.name);
    let id = file.source_id();

    let entries = [hint, hint.other()]
        .into_iter()
        .find_map(|format| match parse_as(format, &id, &file.contents) {
            Ok(entries) => Some(entries),
            Err(e) => {
                debug!(file = %file.name, %format, error = %e, "parser didn't accept file");
                None
            }
        })
        .unwrap_or_default();

    let records: Vec<_> = entries.into_iter().filter_map(RawEntry::into_record).collect();
    let size = records.len();

    Batch::from_source(records, SourceInfo::new(id, file.name.clone(), hint, size))
}
