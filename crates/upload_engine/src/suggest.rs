use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use upload_core::{update_suggest, Key, SuggestEffect, SuggestMsg, SuggestState, Suggestion};
use upload_logging::{upload_debug, upload_warn};

use crate::{FetchError, NoopListener, SuggestListener, SuggestSettings};

/// Answers suggestion queries.
#[async_trait::async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<Suggestion>, FetchError>;
}

/// Drives a `SuggestState` from keystrokes, timers and fetch results.
///
/// The pending debounce timer is aborted whenever a newer one is scheduled.
/// Fetches are never aborted; a superseded fetch is discarded when it lands.
#[derive(Clone)]
pub struct SuggestController {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<SuggestState>,
    source: Arc<dyn SuggestionSource>,
    listener: Arc<dyn SuggestListener>,
    settings: SuggestSettings,
    timer: Mutex<Option<JoinHandle<()>>>,
    view_tx: watch::Sender<SuggestState>,
}

impl SuggestController {
    pub fn new(source: Arc<dyn SuggestionSource>, settings: SuggestSettings) -> Self {
        Self::with_listener(source, settings, Arc::new(NoopListener))
    }

    pub fn with_listener(
        source: Arc<dyn SuggestionSource>,
        settings: SuggestSettings,
        listener: Arc<dyn SuggestListener>,
    ) -> Self {
        let state = SuggestState::new();
        let (view_tx, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                source,
                listener,
                settings,
                timer: Mutex::new(None),
                view_tx,
            }),
        }
    }

    pub fn input(&self, text: impl Into<String>) {
        self.inner.dispatch(SuggestMsg::InputChanged(text.into()));
    }

    pub fn key(&self, key: Key) {
        self.inner.dispatch(SuggestMsg::KeyPressed(key));
    }

    pub fn click(&self, index: usize) {
        self.inner.dispatch(SuggestMsg::ItemClicked(index));
    }

    /// Click outside the list.
    pub fn dismiss(&self) {
        self.inner.dispatch(SuggestMsg::Dismissed);
    }

    pub fn snapshot(&self) -> SuggestState {
        self.inner.lock_state().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestState> {
        self.inner.view_tx.subscribe()
    }
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, SuggestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(self: &Arc<Self>, msg: SuggestMsg) {
        let effects: Vec<SuggestEffect> = {
            let mut guard = self.lock_state();
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update_suggest(state, msg);
            if state.consume_dirty() {
                self.view_tx.send_replace(state.clone());
            }
            *guard = state;
            // Timers are swapped in the same critical section that advanced the
            // generation, so the stored handle always belongs to the newest one.
            effects
                .into_iter()
                .filter_map(|effect| self.apply_timer(effect))
                .collect()
        };

        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Handles timer effects and hands everything else back.
    fn apply_timer(self: &Arc<Self>, effect: SuggestEffect) -> Option<SuggestEffect> {
        let next = match effect {
            SuggestEffect::ScheduleDebounce { generation } => {
                let inner = Arc::clone(self);
                let delay = self.settings.debounce;
                Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.dispatch(SuggestMsg::DebounceElapsed { generation });
                }))
            }
            SuggestEffect::CancelDebounce => None,
            other => return Some(other),
        };
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *timer, next) {
            previous.abort();
        }
        None
    }

    fn run_effect(self: &Arc<Self>, effect: SuggestEffect) {
        match effect {
            SuggestEffect::Fetch { seq, query } => {
                let inner = Arc::clone(self);
                tokio::spawn(async move {
                    let msg = match inner.source.fetch(&query).await {
                        Ok(items) => {
                            upload_debug!("suggestions for {:?}: {} item(s)", query, items.len());
                            SuggestMsg::FetchSucceeded { seq, items }
                        }
                        Err(err) => {
                            upload_warn!("suggestions for {:?} failed: {}", query, err);
                            SuggestMsg::FetchFailed {
                                seq,
                                message: err.to_string(),
                            }
                        }
                    };
                    inner.dispatch(msg);
                });
            }
            SuggestEffect::Selected(item) => self.listener.on_select(&item),
            SuggestEffect::ScheduleDebounce { .. } | SuggestEffect::CancelDebounce => {}
        }
    }
}
