//! Debounced suggestion selector.
//!
//! Keystrokes update `query` immediately and schedule a debounce timer tagged
//! with a generation number. Only the timer of the latest generation may
//! promote `query` to `debounced_query`. Each promotion issues one fetch tagged
//! with a sequence number, and only the outstanding sequence may write
//! `results`. Anything else that arrives is stale and is dropped.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Text written into the input when the item is selected.
    pub value: String,
    /// Extra payload handed back to the selection callback.
    pub data: Value,
}

impl Suggestion {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Suggestions together with the query that produced them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestionResults {
    pub query: String,
    pub items: Vec<Suggestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestMsg {
    /// The text in the input changed.
    InputChanged(String),
    /// A debounce timer fired.
    DebounceElapsed { generation: u64 },
    FetchSucceeded { seq: u64, items: Vec<Suggestion> },
    FetchFailed { seq: u64, message: String },
    KeyPressed(Key),
    ItemClicked(usize),
    /// Click outside the suggestion list.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestEffect {
    /// Start a quiet-period timer, replacing any pending one.
    ScheduleDebounce { generation: u64 },
    /// Drop the pending timer without starting another.
    CancelDebounce,
    Fetch { seq: u64, query: String },
    Selected(Suggestion),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SuggestState {
    query: String,
    debounced_query: String,
    results: SuggestionResults,
    highlight: Option<usize>,
    generation: u64,
    fetch_seq: u64,
    in_flight: Option<u64>,
    dirty: bool,
}

impl SuggestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `value` already in the input, without fetching for it.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            query: value.clone(),
            debounced_query: value,
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn debounced_query(&self) -> &str {
        &self.debounced_query
    }

    pub fn results(&self) -> &SuggestionResults {
        &self.results
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.results.items
    }

    /// Highlighted row; `None` means nothing is highlighted.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn highlighted_item(&self) -> Option<&Suggestion> {
        self.highlight.and_then(|index| self.results.items.get(index))
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn clear_results(&mut self) {
        self.results = SuggestionResults::default();
        self.highlight = None;
        self.in_flight = None;
    }

    fn commit(&mut self, index: usize) -> Vec<SuggestEffect> {
        let Some(item) = self.results.items.get(index).cloned() else {
            return Vec::new();
        };
        self.query = item.value.clone();
        self.debounced_query = item.value.clone();
        self.generation += 1;
        self.clear_results();
        self.dirty = true;
        vec![SuggestEffect::CancelDebounce, SuggestEffect::Selected(item)]
    }
}

/// Pure update function for the suggestion selector.
pub fn update_suggest(mut state: SuggestState, msg: SuggestMsg) -> (SuggestState, Vec<SuggestEffect>) {
    let effects = match msg {
        SuggestMsg::InputChanged(text) => {
            state.query = text;
            state.generation += 1;
            state.dirty = true;
            vec![SuggestEffect::ScheduleDebounce {
                generation: state.generation,
            }]
        }
        SuggestMsg::DebounceElapsed { generation } => {
            if generation != state.generation || state.query == state.debounced_query {
                return (state, Vec::new());
            }
            state.debounced_query = state.query.clone();
            state.fetch_seq += 1;
            state.highlight = None;
            state.dirty = true;
            if state.debounced_query.is_empty() {
                state.clear_results();
                Vec::new()
            } else {
                state.in_flight = Some(state.fetch_seq);
                vec![SuggestEffect::Fetch {
                    seq: state.fetch_seq,
                    query: state.debounced_query.clone(),
                }]
            }
        }
        SuggestMsg::FetchSucceeded { seq, items } => {
            if state.in_flight != Some(seq) {
                return (state, Vec::new());
            }
            state.in_flight = None;
            state.highlight = None;
            state.results = SuggestionResults {
                query: state.debounced_query.clone(),
                items,
            };
            state.dirty = true;
            Vec::new()
        }
        SuggestMsg::FetchFailed { seq, .. } => {
            if state.in_flight != Some(seq) {
                return (state, Vec::new());
            }
            state.clear_results();
            state.dirty = true;
            Vec::new()
        }
        SuggestMsg::KeyPressed(key) => match key {
            Key::ArrowDown => {
                let len = state.results.items.len();
                if len > 0 {
                    let next = state.highlight.map_or(0, |index| (index + 1).min(len - 1));
                    state.highlight = Some(next);
                    state.dirty = true;
                }
                Vec::new()
            }
            Key::ArrowUp => {
                state.highlight = match state.highlight {
                    Some(0) | None => None,
                    Some(index) => Some(index - 1),
                };
                state.dirty = true;
                Vec::new()
            }
            Key::Enter => match state.highlight {
                Some(index) => state.commit(index),
                None => Vec::new(),
            },
            Key::Escape => {
                state.clear_results();
                state.dirty = true;
                Vec::new()
            }
        },
        SuggestMsg::ItemClicked(index) => state.commit(index),
        SuggestMsg::Dismissed => {
            state.clear_results();
            state.dirty = true;
            Vec::new()
        }
    };

    (state, effects)
}
