//! autocompleting tags inside a text field
//!
//! the host owns the actual widgets. it hands a [`TextField`] and a [`SuggestionRenderer`] to a
//! [`TagAutocomplete`] and forwards input, focus, key, blur and pointer events to it
use {
    crate::index::{MAX_RESULTS, Suggestion},
    std::{
        sync::{Arc, Mutex, MutexGuard},
        time::Duration,
    },
    tracing::trace,
};

pub mod controller;
pub mod splice;
pub mod token;

pub use {
    controller::{BlurTicket, Phase, TagAutocomplete},
    splice::{Spliced, splice},
    token::{Token, extract_token},
};

/// where a field sits on screen, in page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldBounds {
    /// left edge
    pub left: f32,
    /// top edge
    pub top: f32,
    /// width of the field
    pub width: f32,
    /// height of the field
    pub height: f32,
}

impl FieldBounds {
    /// the bottom edge
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// where the popup should be drawn
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PopupPlacement {
    /// left edge, aligned with the field
    pub left: f32,
    /// top edge, just below the field
    pub top: f32,
    /// width, matching the field
    pub width: f32,
}

impl PopupPlacement {
    /// place a popup directly below a field, `offset` units under its bottom edge
    pub fn below(bounds: FieldBounds, offset: f32) -> Self {
        Self {
            left: bounds.left,
            top: bounds.bottom() + offset,
            width: bounds.width,
        }
    }
}

/// a text input the autocomplete is attached to
pub trait TextField: Send {
    /// the current text
    fn text(&self) -> String;

    /// the caret position as a byte offset into [`TextField::text`]
    fn caret(&self) -> usize;

    /// replace the text and move the caret
    fn set_text(&mut self, text: String, caret: usize);

    /// tell whoever listens to the field that its value changed
    fn notify_changed(&mut self);

    /// where the field currently is
    fn bounds(&self) -> FieldBounds;
}

/// draws the suggestion popup
pub trait SuggestionRenderer: Send {
    /// show the popup with these suggestions and `active` highlighted
    fn show(&mut self, suggestions: &[Suggestion], active: usize, placement: PopupPlacement);

    /// move the highlight
    fn highlight(&mut self, active: usize);

    /// move the popup without changing its contents
    fn reposition(&mut self, placement: PopupPlacement) {
        trace!(?placement, "renderer ignored reposition");
    }

    /// hide the popup
    fn hide(&mut self);
}

/// keys the autocomplete cares about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// next suggestion
    Down,
    /// previous suggestion
    Up,
    /// commit the highlighted suggestion
    Tab,
    /// commit the highlighted suggestion
    Enter,
    /// close the popup
    Escape,
    /// anything else
    Other,
}

/// whether a key was handled by the autocomplete
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// the key was used; the host should not apply its default action
    Consumed,
    /// the key should be handled as usual
    Ignored,
}

/// per-field behavior
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionSettings {
    /// how many suggestions to show at most
    pub max_results: usize,
    /// the shortest query that triggers suggestions
    pub min_token_len: usize,
    /// how long a blurred field keeps its popup
    pub blur_grace: Duration,
    /// gap between the field and the popup
    pub popup_offset: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            min_token_len: 1,
            blur_grace: Duration::from_millis(120),
            popup_offset: 4.0,
        }
    }
}

/// an autocomplete shared between the host's event handlers and the dataset controller
pub type AutocompleteHandle = Arc<Mutex<TagAutocomplete>>;

/// lock an autocomplete, recovering from a poisoned lock
pub fn lock(handle: &AutocompleteHandle) -> MutexGuard<'_, TagAutocomplete> {
    handle.lock().unwrap_or_else(|e| e.into_inner())
}

/// blur the field and hide its popup once the grace period runs out
///
/// if the field is focused, edited, or a suggestion is picked in the meantime the pending hide
/// is cancelled and the task does nothing
pub fn blur_with_timer(handle: &AutocompleteHandle) -> tokio::task::JoinHandle<()> {
    let (ticket, grace) = {
        let mut ac = lock(handle);
        (ac.handle_blur(), ac.settings().blur_grace)
    };

    let handle = Arc::clone(handle);
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        lock(&handle).blur_elapsed(ticket);
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! in-memory fields and renderers for tests
    use {
        super::*,
        crate::data::{Dataset, RecordFields, build_record},
    };

    /// what a [`MockField`] currently holds
    #[derive(Debug, Default)]
    pub(crate) struct FieldState {
        /// the text
        pub text: String,
        /// the caret
        pub caret: usize,
        /// how many change notifications were sent
        pub changes: usize,
        /// where the field is
        pub bounds: FieldBounds,
    }

    /// a field whose state stays observable after it's handed off
    #[derive(Clone, Default)]
    pub(crate) struct MockField(pub Arc<Mutex<FieldState>>);

    impl MockField {
        /// lock the field state
        pub(crate) fn state(&self) -> MutexGuard<'_, FieldState> {
            self.0.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// type text with the caret at the end
        pub(crate) fn type_text(&self, text: &str) {
            let mut state = self.state();
            state.text = text.to_string();
            state.caret = text.len();
        }
    }

    impl TextField for MockField {
        fn text(&self) -> String {
            self.state().text.clone()
        }

        fn caret(&self) -> usize {
            self.state().caret
        }

        fn set_text(&mut self, text: String, caret: usize) {
            let mut state = self.state();
            state.text = text;
            state.caret = caret;
        }

        fn notify_changed(&mut self) {
            self.state().changes += 1;
        }

        fn bounds(&self) -> FieldBounds {
            self.state().bounds
        }
    }

    /// everything a [`MockRenderer`] was asked to do
    #[derive(Debug, Default)]
    pub(crate) struct RenderLog {
        /// whether the popup is up
        pub visible: bool,
        /// the tags last shown
        pub tags: Vec<String>,
        /// the highlighted row
        pub active: usize,
        /// where the popup was last put
        pub placement: PopupPlacement,
        /// how many times the popup was shown
        pub shows: usize,
        /// how many times the popup was hidden
        pub hides: usize,
    }

    /// a renderer that records instead of drawing
    #[derive(Clone, Default)]
    pub(crate) struct MockRenderer(pub Arc<Mutex<RenderLog>>);

    impl MockRenderer {
        /// lock the log
        pub(crate) fn log(&self) -> MutexGuard<'_, RenderLog> {
            self.0.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl SuggestionRenderer for MockRenderer {
        fn show(&mut self, suggestions: &[Suggestion], active: usize, placement: PopupPlacement) {
            let mut log = self.log();
            log.visible = true;
            log.tags = suggestions.iter().map(|s| s.tag().to_string()).collect();
            log.active = active;
            log.placement = placement;
            log.shows += 1;
        }

        fn highlight(&mut self, active: usize) {
            self.log().active = active;
        }

        fn reposition(&mut self, placement: PopupPlacement) {
            self.log().placement = placement;
        }

        fn hide(&mut self) {
            let mut log = self.log();
            log.visible = false;
            log.hides += 1;
        }
    }

    /// a dataset of bare tags
    pub(crate) fn dataset(tags: &[&str]) -> Arc<Dataset> {
        Arc::new(
            tags.iter()
                .filter_map(|tag| build_record(tag, RecordFields::default()))
                .collect(),
        )
    }
}
