//! the per-field autocomplete state machine
use {
    super::{
        CompletionSettings, Key, KeyOutcome, PopupPlacement, SuggestionRenderer, TextField,
        splice::splice,
        token::{Token, extract_token},
    },
    crate::{
        data::Dataset,
        index::{Suggestion, suggest_with_limit},
    },
    std::sync::Arc,
    tracing::{debug, trace},
};

/// where the autocomplete is in its lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// no popup
    #[default]
    Idle,
    /// the popup is showing these suggestions with `active` highlighted
    Suggesting {
        /// the ranked suggestions, never empty
        suggestions: Vec<Suggestion>,
        /// the highlighted suggestion
        active: usize,
    },
    /// a suggestion is being written into the field
    Committing,
}

/// identifies one blur so a late timer can't hide a popup that was reopened since
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurTicket(u64);

/// autocomplete for a single text field
pub struct TagAutocomplete {
    /// the field being completed
    field: Box<dyn TextField>,
    /// draws the popup
    renderer: Box<dyn SuggestionRenderer>,
    /// what gets searched
    dataset: Arc<Dataset>,
    /// field behavior
    settings: CompletionSettings,
    /// current state
    phase: Phase,
    /// the token from the last query
    token: Option<Token>,
    /// the field text the token was taken from
    token_text: String,
    /// the blur waiting to hide the popup, if any
    pending_hide: Option<BlurTicket>,
    /// source of blur tickets
    next_ticket: u64,
}

impl TagAutocomplete {
    /// attach to a field
    pub fn new(
        field: Box<dyn TextField>,
        renderer: Box<dyn SuggestionRenderer>,
        dataset: Arc<Dataset>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            field,
            renderer,
            dataset,
            settings,
            phase: Phase::Idle,
            token: None,
            token_text: String::new(),
            pending_hide: None,
            next_ticket: 0,
        }
    }

    /// the field settings
    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// the dataset being searched
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// the field being completed
    pub fn field(&self) -> &dyn TextField {
        self.field.as_ref()
    }

    /// the current state
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// whether the popup is up
    pub fn is_visible(&self) -> bool {
        matches!(self.phase, Phase::Suggesting { .. })
    }

    /// the suggestions on screen
    pub fn suggestions(&self) -> &[Suggestion] {
        match &self.phase {
            Phase::Suggesting { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// the highlighted suggestion
    pub fn active_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Suggesting { active, .. } => Some(active),
            _ => None,
        }
    }

    /// the token from the last query
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// whether a blur is waiting to hide the popup
    pub fn hide_pending(&self) -> bool {
        self.pending_hide.is_some()
    }

    /// the field's text changed
    pub fn handle_input(&mut self) {
        self.pending_hide = None;
        self.refresh();
    }

    /// the field got focus
    pub fn handle_focus(&mut self) {
        self.pending_hide = None;
        self.refresh();
    }

    /// the field lost focus
    ///
    /// the popup stays up so a pointer can still pick from it. the host waits
    /// [`CompletionSettings::blur_grace`] and then passes the ticket to
    /// [`TagAutocomplete::blur_elapsed`]
    pub fn handle_blur(&mut self) -> BlurTicket {
        self.next_ticket += 1;
        let ticket = BlurTicket(self.next_ticket);
        self.pending_hide = Some(ticket);
        ticket
    }

    /// the grace period of a blur ran out
    pub fn blur_elapsed(&mut self, ticket: BlurTicket) {
        if self.pending_hide != Some(ticket) {
            trace!(?ticket, "stale blur ticket");
            return;
        }

        self.pending_hide = None;
        self.hide();
    }

    /// a key was pressed in the field
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let Phase::Suggesting {
            suggestions,
            active,
        } = &mut self.phase
        else {
            return KeyOutcome::Ignored;
        };
        let len = suggestions.len();

        match key {
            Key::Down => {
                *active = (*active + 1) % len;
                self.renderer.highlight(*active);
                KeyOutcome::Consumed
            }
            Key::Up => {
                *active = (*active + len - 1) % len;
                self.renderer.highlight(*active);
                KeyOutcome::Consumed
            }
            Key::Tab | Key::Enter => {
                let index = *active;
                self.commit(index);
                KeyOutcome::Consumed
            }
            Key::Escape => {
                self.hide();
                KeyOutcome::Ignored
            }
            Key::Other => KeyOutcome::Ignored,
        }
    }

    /// a popup entry was picked with the pointer
    ///
    /// returns whether anything was committed
    pub fn pointer_select(&mut self, index: usize) -> bool {
        self.pending_hide = None;
        self.commit(index)
    }

    /// the page scrolled or the window resized
    pub fn handle_viewport_change(&mut self) {
        if self.is_visible() {
            let placement = self.placement();
            self.renderer.reposition(placement);
        }
    }

    /// swap in a new dataset, re-querying if the popup is up
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.dataset = dataset;

        if self.is_visible()
            && let Some(token) = self.token.clone()
        {
            self.query(token);
        }
    }

    /// stop completing this field
    pub fn detach(&mut self) {
        self.pending_hide = None;
        self.hide();
    }

    /// where the popup goes right now
    fn placement(&self) -> PopupPlacement {
        PopupPlacement::below(self.field.bounds(), self.settings.popup_offset)
    }

    /// read the token at the caret and query for it
    fn refresh(&mut self) {
        let text = self.field.text();
        let token = extract_token(&text, self.field.caret());
        self.token_text = text;
        self.query(token);
    }

    /// show suggestions for a token, or hide if there are none
    fn query(&mut self, token: Token) {
        let query = token.query.trim();
        let suggestions = if query.chars().count() < self.settings.min_token_len.max(1) {
            Vec::new()
        } else {
            suggest_with_limit(&self.dataset, query, self.settings.max_results)
        };
        self.token = Some(token);

        if suggestions.is_empty() {
            self.hide();
            return;
        }

        let placement = self.placement();
        self.renderer.show(&suggestions, 0, placement);
        self.phase = Phase::Suggesting {
            suggestions,
            active: 0,
        };
    }

    /// write a suggestion into the field
    fn commit(&mut self, index: usize) -> bool {
        let Some(tag) = self.suggestions().get(index).map(|s| s.tag().to_string()) else {
            return false;
        };
        self.phase = Phase::Committing;

        let text = self.field.text();
        let token = match self.token.take() {
            Some(token) if self.token_text == text => token,
            _ => extract_token(&text, self.field.caret()),
        };
        let spliced = splice(&text, &token, &tag);

        debug!(%tag, caret = spliced.caret, "committing suggestion");
        self.field.set_text(spliced.text, spliced.caret);
        self.field.notify_changed();
        self.hide();
        true
    }

    /// close the popup
    fn hide(&mut self) {
        if !matches!(self.phase, Phase::Idle) {
            self.renderer.hide();
        }
        self.phase = Phase::Idle;
    }
}
