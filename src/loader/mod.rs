//! resolving and loading tag sources
//!
//! sources are picked in priority order: local files, then an explicit source list, then
//! whatever the manifest lists, and finally a single fallback url. every source loads on its
//! own; one that fails is logged and skipped without affecting the rest
use {
    crate::{
        data::{Batch, Merged, RawEntry, SourceInfo, merge},
        error::{Result, TcError},
        getopt,
    },
    futures::future::join_all,
    tracing::{info, warn},
    url::Url,
};

pub mod fetch;
pub mod file;
pub mod manifest;

pub use {
    fetch::{Fetcher, HttpFetcher, HttpSettings},
    file::{LocalFile, parse_local_file},
    manifest::{SourceDescriptor, parse_manifest},
};

/// the manifest fetched when nothing else is configured
pub const DEFAULT_MANIFEST_URL: &str = "/tagcomplete-sources.json";

/// the single dataset used when the manifest lists nothing
pub const DEFAULT_DATA_URL: &str = "/tagcomplete-data.json";

/// what to load
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// local files; when non-empty nothing remote is loaded
    pub files: Vec<LocalFile>,
    /// explicit remote sources; when non-empty the manifest is skipped
    pub sources: Vec<SourceDescriptor>,
    /// the manifest url (defaults to [`DEFAULT_MANIFEST_URL`])
    pub manifest_url: Option<String>,
    /// the fallback dataset url (defaults to [`DEFAULT_DATA_URL`])
    pub data_url: Option<String>,
    /// the url that relative source urls are resolved against
    pub base_url: Option<Url>,
}

impl LoadOptions {
    /// load only the given files
    pub fn files(files: Vec<LocalFile>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    /// build load options from the loaded config
    pub fn from_config() -> Self {
        let base_url = getopt!(sources.base_url);
        let base_url = match Url::parse(&base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(%base_url, error = %e, "ignoring invalid base url");
                None
            }
        };

        Self {
            files: Vec::new(),
            sources: getopt!(sources.extra),
            manifest_url: Some(getopt!(sources.manifest_url)),
            data_url: Some(getopt!(sources.data_url)),
            base_url,
        }
    }

    /// resolve a possibly relative url against the base url
    ///
    /// # Errors
    ///
    /// returns an error if the url is relative and there's no base, or it just isn't a url
    pub fn resolve(&self, raw: &str) -> Result<Url> {
        match (Url::parse(raw), &self.base_url) {
            (Ok(url), _) => Ok(url),
            (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => Ok(base.join(raw)?),
            (Err(e), _) => Err(e.into()),
        }
    }
}

/// fetch and parse the manifest, returning no sources on any failure
async fn load_manifest(options: &LoadOptions, fetcher: &dyn Fetcher) -> Vec<SourceDescriptor> {
    let raw = options
        .manifest_url
        .as_deref()
        .unwrap_or(DEFAULT_MANIFEST_URL);

    let attempt = async {
        let url = options.resolve(raw)?;
        let text = fetcher.fetch_text(&url).await?;
        let doc: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| TcError::Manifest(e.to_string()))?;
        Ok::<_, TcError>(parse_manifest(&doc))
    };

    match attempt.await {
        Ok(sources) => sources,
        Err(e) => {
            warn!(manifest = raw, error = %e, "unable to load tag source manifest");
            Vec::new()
        }
    }
}

/// fetch and parse one remote source
///
/// # Errors
///
/// returns an error if the url is invalid, the fetch fails or the document doesn't parse
pub async fn load_source(
    options: &LoadOptions,
    source: &SourceDescriptor,
    fetcher: &dyn Fetcher,
) -> Result<Batch> {
    let url = options.resolve(&source.url)?;
    let text = fetcher.fetch_text(&url).await?;
    let entries = file::parse_as(source.format, &source.url, &text)?;
    let records: Vec<_> = entries.into_iter().filter_map(RawEntry::into_record).collect();
    let size = records.len();

    info!(source = %source.label, records = size, "loaded tag source");

    Ok(Batch::from_source(
        records,
        SourceInfo::new(source.url.clone(), source.label.clone(), source.format, size),
    ))
}

/// figure out which remote sources to load
async fn resolve_sources(options: &LoadOptions, fetcher: &dyn Fetcher) -> Vec<SourceDescriptor> {
    let mut sources = if options.sources.is_empty() {
        load_manifest(options, fetcher).await
    } else {
        options.sources.clone()
    };

    if sources.is_empty() {
        let fallback = options.data_url.as_deref().unwrap_or(DEFAULT_DATA_URL);
        sources.push(SourceDescriptor::from_url(fallback));
    }

    sources
}

/// parse local files into batches, leaving out files with no usable tags
pub fn load_files(files: &[LocalFile]) -> Vec<Batch> {
    files
        .iter()
        .map(parse_local_file)
        .filter(|batch| {
            if batch.records.is_empty() {
                warn!(source = ?batch.sources.first().map(|s| &s.label), "file had no usable tags");
            }
            !batch.records.is_empty()
        })
        .collect()
}

/// load every batch selected by the options, without merging
pub async fn load_batches(options: &LoadOptions, fetcher: &dyn Fetcher) -> Vec<Batch> {
    if !options.files.is_empty() {
        return load_files(&options.files);
    }

    let sources = resolve_sources(options, fetcher).await;
    let loads = sources
        .iter()
        .map(|source| async move { (source, load_source(options, source, fetcher).await) });

    join_all(loads)
        .await
        .into_iter()
        .filter_map(|(source, res)| match res {
            Ok(batch) => Some(batch),
            Err(e) => {
                warn!(source = %source.url, error = %e, "unable to load tag source, skipping it");
                None
            }
        })
        .collect()
}

/// load and merge every source selected by the options
///
/// this never fails; the worst case is an empty dataset
pub async fn load_tag_dataset(options: &LoadOptions, fetcher: &dyn Fetcher) -> Merged {
    let batches = load_batches(options, fetcher).await;
    let merged = merge(&batches);

    info!(
        tags = merged.tag_count(),
        sources = merged.source_count(),
        "tag dataset ready"
    );

    merged
}

#[cfg(test)]
pub(crate) mod testing {
    //! an in-memory fetcher for tests
    use {
        super::*,
        async_trait::async_trait,
        hashbrown::HashMap,
        std::sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    /// serves canned documents keyed by url
    #[derive(Default)]
    pub(crate) struct MockFetcher {
        /// url -> body
        pub docs: Mutex<HashMap<String, String>>,
        /// how many requests were made
        pub calls: AtomicUsize,
    }

    impl MockFetcher {
        /// a fetcher serving the given documents
        pub(crate) fn with(docs: &[(&str, &str)]) -> Self {
            let fetcher = Self::default();
            for (url, body) in docs {
                fetcher.put(url, body);
            }
            fetcher
        }

        /// add or replace a document
        pub(crate) fn put(&self, url: &str, body: &str) {
            self.docs
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(url.to_string(), body.to_string());
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch_text(&self, url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.docs
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| TcError::SourceFetch {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }
}
