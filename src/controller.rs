//! the dataset controller
//!
//! one controller owns the merged dataset and its source ledger. every autocomplete attached to
//! it gets the new dataset whenever it changes
use {
    crate::{
        complete::{
            AutocompleteHandle, CompletionSettings, SuggestionRenderer, TagAutocomplete, TextField,
            lock,
        },
        data::{Batch, Dataset, Merged, SourceInfo, SourceLedger, merge},
        loader::{Fetcher, LoadOptions, LocalFile, load_files, load_tag_dataset},
    },
    serde::Serialize,
    std::sync::{
        Arc, Mutex, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    tracing::{debug, info},
};

/// a summary of the current dataset
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// how many distinct tags are loaded
    pub tag_count: usize,
    /// how many distinct sources contributed
    pub source_count: usize,
    /// the operation that produced this dataset
    ///
    /// compare with [`DatasetController::latest_sequence`] to tell whether a newer operation
    /// has started since
    pub sequence: u64,
}

/// the dataset and ledger currently in use
#[derive(Debug, Default)]
struct Snapshot {
    /// the merged records
    dataset: Arc<Dataset>,
    /// where they came from
    sources: SourceLedger,
    /// the operation that produced them
    sequence: u64,
}

impl Snapshot {
    /// summarize the snapshot
    fn stats(&self) -> DatasetStats {
        DatasetStats {
            tag_count: self.dataset.len(),
            source_count: self.sources.len(),
            sequence: self.sequence,
        }
    }
}

/// owns the tag dataset and keeps every attached autocomplete up to date
pub struct DatasetController {
    /// fetches remote sources
    fetcher: Arc<dyn Fetcher>,
    /// settings handed to newly attached autocompletes
    settings: CompletionSettings,
    /// the current dataset
    state: RwLock<Snapshot>,
    /// autocompletes that get dataset updates
    attached: Mutex<Vec<AutocompleteHandle>>,
    /// the last sequence number handed out
    sequence: AtomicU64,
}

impl DatasetController {
    /// a controller with an empty dataset
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: CompletionSettings) -> Self {
        Self {
            fetcher,
            settings,
            state: RwLock::new(Snapshot::default()),
            attached: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// make a controller and run the first load
    pub async fn init(
        options: &LoadOptions,
        fetcher: Arc<dyn Fetcher>,
        settings: CompletionSettings,
    ) -> Self {
        let controller = Self::new(fetcher, settings);
        controller.reload(options).await;
        controller
    }

    /// the current dataset
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.read().dataset)
    }

    /// every source behind the current dataset
    pub fn sources(&self) -> Vec<SourceInfo> {
        self.read().sources.to_vec()
    }

    /// tag and source counts for the current dataset
    pub fn stats(&self) -> DatasetStats {
        self.read().stats()
    }

    /// the sequence number of the most recently started operation
    pub fn latest_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// load everything the options select and replace the dataset with it
    pub async fn reload(&self, options: &LoadOptions) -> DatasetStats {
        let sequence = self.next_sequence();
        debug!(sequence, "reloading tag dataset");

        let merged = load_tag_dataset(options, self.fetcher.as_ref()).await;
        self.install(sequence, |_| merged)
    }

    /// replace the dataset with the contents of some local files
    ///
    /// files with no usable tags are left out; if none are left the dataset ends up empty
    pub async fn replace_with_files(&self, files: Vec<LocalFile>) -> DatasetStats {
        let sequence = self.next_sequence();
        debug!(sequence, files = files.len(), "replacing tag dataset with files");

        let merged = merge(&load_files(&files));
        self.install(sequence, |_| merged)
    }

    /// merge some local files into the current dataset
    pub async fn merge_files(&self, files: Vec<LocalFile>) -> DatasetStats {
        let sequence = self.next_sequence();
        debug!(sequence, files = files.len(), "merging files into tag dataset");

        let incoming = load_files(&files);
        self.install(sequence, |current| {
            let current = Batch::from_dataset(&current.dataset, &current.sources);
            merge(std::iter::once(&current).chain(&incoming))
        })
    }

    /// attach an autocomplete to a field
    ///
    /// the returned handle is what the host forwards field events to
    pub fn attach(
        &self,
        field: Box<dyn TextField>,
        renderer: Box<dyn SuggestionRenderer>,
    ) -> AutocompleteHandle {
        let handle = Arc::new(Mutex::new(TagAutocomplete::new(
            field,
            renderer,
            self.dataset(),
            self.settings.clone(),
        )));

        self.attached().push(Arc::clone(&handle));
        debug!(attached = self.attached().len(), "attached autocomplete");
        handle
    }

    /// stop updating an autocomplete and close its popup
    ///
    /// returns whether the handle was attached
    pub fn detach(&self, handle: &AutocompleteHandle) -> bool {
        let removed = {
            let mut attached = self.attached();
            let before = attached.len();
            attached.retain(|h| !Arc::ptr_eq(h, handle));
            attached.len() != before
        };

        if removed {
            lock(handle).detach();
        }
        removed
    }

    /// how many autocompletes are attached
    pub fn attached_count(&self) -> usize {
        self.attached().len()
    }

    /// hand out the next sequence number
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// build the next dataset from the current one, make it current and push it to every
    /// attached autocomplete
    ///
    /// the state stays locked while `build` runs so concurrent merges can't drop each other's
    /// records
    fn install(&self, sequence: u64, build: impl FnOnce(&Snapshot) -> Merged) -> DatasetStats {
        let (dataset, stats) = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            let merged = build(&state);
            let dataset = Arc::new(merged.dataset);
            *state = Snapshot {
                dataset: Arc::clone(&dataset),
                sources: merged.sources,
                sequence,
            };
            (dataset, state.stats())
        };

        let attached = self.attached().clone();
        for handle in &attached {
            lock(handle).set_dataset(Arc::clone(&dataset));
        }

        info!(
            tags = stats.tag_count,
            sources = stats.source_count,
            sequence,
            fields = attached.len(),
            "tag dataset updated"
        );
        stats
    }

    /// read the current snapshot
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// the attached autocompletes
    fn attached(&self) -> std::sync::MutexGuard<'_, Vec<AutocompleteHandle>> {
        self.attached.lock().unwrap_or_else(|e| e.into_inner())
    }
}
