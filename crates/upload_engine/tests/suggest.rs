use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::sleep;
use upload_core::{Key, Suggestion};
use upload_engine::{FetchError, SuggestController, SuggestListener, SuggestSettings, SuggestionSource};

/// Filters a fixed word list, answering each query after its configured delay.
struct WordSource {
    words: Vec<(&'static str, u32)>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl WordSource {
    fn new() -> Self {
        Self {
            words: vec![("ab", 11), ("abc", 1), ("b", 4), ("c", 15)],
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SuggestionSource for WordSource {
    async fn fetch(&self, query: &str) -> Result<Vec<Suggestion>, FetchError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            sleep(*delay).await;
        }
        if query == "offline" {
            return Err(FetchError::new("no network"));
        }
        Ok(self
            .words
            .iter()
            .filter(|(word, _)| word.contains(query))
            .map(|(word, number)| Suggestion::new(*word).with_data(json!({ "number": number })))
            .collect())
    }
}

#[derive(Default)]
struct Selections {
    items: Mutex<Vec<Suggestion>>,
}

impl SuggestListener for Selections {
    fn on_select(&self, item: &Suggestion) {
        self.items.lock().unwrap().push(item.clone());
    }
}

fn values(controller: &SuggestController) -> Vec<String> {
    controller
        .snapshot()
        .items()
        .iter()
        .map(|item| item.value.clone())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_fetches_once_for_last_query() {
    let source = Arc::new(WordSource::new());
    let controller = SuggestController::new(source.clone(), SuggestSettings::default());

    controller.input("a");
    sleep(Duration::from_millis(100)).await;
    controller.input("ab");
    assert_eq!(controller.snapshot().query(), "ab");
    sleep(Duration::from_millis(400)).await;

    assert_eq!(source.calls(), vec!["ab"]);
    assert_eq!(values(&controller), vec!["ab", "abc"]);
    assert_eq!(controller.snapshot().results().query, "ab");
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_is_discarded() {
    let source = Arc::new(WordSource::new().with_delay("a", Duration::from_millis(500)));
    let controller = SuggestController::new(source.clone(), SuggestSettings::default());

    controller.input("a");
    sleep(Duration::from_millis(350)).await;
    assert!(controller.snapshot().is_loading());
    controller.input("ab");
    sleep(Duration::from_millis(350)).await;
    assert_eq!(values(&controller), vec!["ab", "abc"]);

    // The fetch for "a" lands now and must be ignored.
    sleep(Duration::from_millis(500)).await;
    assert_eq!(source.calls(), vec!["a", "ab"]);
    assert_eq!(values(&controller), vec!["ab", "abc"]);
}

#[tokio::test(start_paused = true)]
async fn keyboard_selection_commits_highlighted_item() {
    let selections = Arc::new(Selections::default());
    let controller = SuggestController::with_listener(
        Arc::new(WordSource::new()),
        SuggestSettings::default(),
        selections.clone(),
    );

    controller.input("a");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(values(&controller), vec!["ab", "abc"]);

    let mut highlights = Vec::new();
    for key in [Key::ArrowDown, Key::ArrowDown, Key::ArrowUp] {
        controller.key(key);
        highlights.push(controller.snapshot().highlight());
    }
    assert_eq!(highlights, vec![Some(0), Some(1), Some(0)]);

    controller.key(Key::Enter);
    let state = controller.snapshot();
    assert_eq!(state.query(), "ab");
    assert!(state.items().is_empty());
    assert_eq!(
        selections.items.lock().unwrap().clone(),
        vec![Suggestion::new("ab").with_data(json!({ "number": 11 }))]
    );
}

#[tokio::test(start_paused = true)]
async fn click_during_fetch_keeps_results_cleared() {
    let source = Arc::new(WordSource::new().with_delay("abc", Duration::from_millis(200)));
    let selections = Arc::new(Selections::default());
    let controller = SuggestController::with_listener(
        source.clone(),
        SuggestSettings::default(),
        selections.clone(),
    );

    controller.input("a");
    sleep(Duration::from_millis(400)).await;
    controller.input("abc");
    sleep(Duration::from_millis(350)).await;
    assert!(controller.snapshot().is_loading());

    controller.click(0);
    sleep(Duration::from_millis(500)).await;

    let state = controller.snapshot();
    assert!(state.items().is_empty());
    assert_eq!(state.query(), "ab");
    assert_eq!(selections.items.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn selecting_does_not_trigger_a_new_fetch() {
    let source = Arc::new(WordSource::new());
    let controller = SuggestController::new(source.clone(), SuggestSettings::default());

    controller.input("b");
    sleep(Duration::from_millis(400)).await;
    controller.click(0);
    sleep(Duration::from_millis(400)).await;

    assert_eq!(source.calls(), vec!["b"]);
    assert!(controller.snapshot().items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn escape_and_clearing_input_empty_the_list() {
    let source = Arc::new(WordSource::new());
    let controller = SuggestController::new(source.clone(), SuggestSettings::default());

    controller.input("a");
    sleep(Duration::from_millis(400)).await;
    controller.key(Key::Escape);
    assert!(controller.snapshot().items().is_empty());

    controller.input("ab");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(values(&controller), vec!["ab", "abc"]);

    controller.input("");
    sleep(Duration::from_millis(400)).await;
    assert!(controller.snapshot().items().is_empty());
    assert_eq!(source.calls(), vec!["a", "ab"]);
}

#[tokio::test(start_paused = true)]
async fn fetch_error_clears_loading_state() {
    let controller =
        SuggestController::new(Arc::new(WordSource::new()), SuggestSettings::default());

    controller.input("offline");
    sleep(Duration::from_millis(400)).await;

    let state = controller.snapshot();
    assert!(!state.is_loading());
    assert!(state.items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_is_respected() {
    let source = Arc::new(WordSource::new());
    let settings = SuggestSettings {
        debounce: Duration::from_millis(50),
    };
    let controller = SuggestController::new(source.clone(), settings);
    let mut updates = controller.subscribe();

    controller.input("c");
    sleep(Duration::from_millis(60)).await;
    updates
        .wait_for(|state| !state.items().is_empty())
        .await
        .expect("results published");
    assert_eq!(source.calls(), vec!["c"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_typing_still_fetches_latest_query() {
    let settings = SuggestSettings {
        debounce: Duration::from_millis(5),
    };
    for round in 0..50 {
        let source = Arc::new(WordSource::new());
        let controller = SuggestController::new(source.clone(), settings.clone());

        let typists: Vec<_> = (0..8)
            .map(|i| {
                let controller = controller.clone();
                tokio::spawn(async move { controller.input(format!("q{i}")) })
            })
            .collect();
        for typist in typists {
            typist.await.expect("typist finished");
        }

        let settled = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let state = controller.snapshot();
                if !state.is_loading()
                    && state.debounced_query() == state.query()
                    && state.results().query == state.query()
                {
                    return state;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("round {round}: latest query never fetched"));

        assert!(source.calls().iter().any(|query| query == settled.query()));
        assert_eq!(*controller.subscribe().borrow(), settled, "round {round}");
    }
}
