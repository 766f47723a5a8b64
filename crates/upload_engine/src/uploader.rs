use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::task::TaskTracker;
use upload_core::{
    update, Effect, Failure, Msg, Notification, RawFile, TaskId, TaskRecord, UploadListView,
    UploadState,
};
use upload_logging::{upload_debug, upload_info, upload_warn};

use crate::gate::{evaluate_gate, Gate, GateOutcome};
use crate::transport::{ProgressSink, Transport, UploadRequest};
use crate::{NoopListener, UploadListener, UploadSettings};

/// Fans submitted files out into independent gate -> transport pipelines and
/// folds their events back into one `UploadState`.
///
/// Every event goes through the pure `update` under a single lock, so two
/// events for the same task are never applied concurrently and readers only
/// ever see whole records. Pipelines finish in any order.
///
/// Removing a record does not cancel its upload. The transport call runs to
/// completion and its outcome is dropped because the id is gone.
///
/// `submit` and `remove` spawn onto the ambient tokio runtime and must be
/// called from within one.
#[derive(Clone)]
pub struct Uploader {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<UploadState>,
    gate: Option<Arc<dyn Gate>>,
    transport: Arc<dyn Transport>,
    listener: Arc<dyn UploadListener>,
    settings: UploadSettings,
    view_tx: watch::Sender<UploadListView>,
    tracker: TaskTracker,
}

pub struct UploaderBuilder {
    transport: Arc<dyn Transport>,
    gate: Option<Arc<dyn Gate>>,
    listener: Arc<dyn UploadListener>,
    settings: UploadSettings,
    records: Vec<TaskRecord>,
}

impl UploaderBuilder {
    pub fn gate(mut self, gate: impl Gate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn listener(mut self, listener: Arc<dyn UploadListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn settings(mut self, settings: UploadSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Records shown before anything is submitted.
    pub fn initial_records(mut self, records: Vec<TaskRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn build(self) -> Uploader {
        let state = UploadState::with_records(self.records);
        let (view_tx, _) = watch::channel(state.view());
        Uploader {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                gate: self.gate,
                transport: self.transport,
                listener: self.listener,
                settings: self.settings,
                view_tx,
                tracker: TaskTracker::new(),
            }),
        }
    }
}

impl Uploader {
    pub fn builder(transport: Arc<dyn Transport>) -> UploaderBuilder {
        UploaderBuilder {
            transport,
            gate: None,
            listener: Arc::new(NoopListener),
            settings: UploadSettings::default(),
            records: Vec::new(),
        }
    }

    /// Starts one pipeline per file. Returns without waiting for any of them.
    pub fn submit(&self, mut files: Vec<RawFile>) {
        if files.is_empty() {
            return;
        }
        if !self.inner.settings.allow_multiple && files.len() > 1 {
            upload_debug!("multiple files disabled; keeping first of {}", files.len());
            files.truncate(1);
        }
        upload_info!("submitting {} file(s)", files.len());
        self.inner.dispatch(Msg::FilesSubmitted(files));
    }

    /// Removes the record from the list. An upload still in flight for it is
    /// not cancelled.
    pub fn remove(&self, task_id: TaskId) {
        self.inner.dispatch(Msg::RemoveRequested { task_id });
    }

    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.inner.lock_state().records().to_vec()
    }

    pub fn record(&self, task_id: TaskId) -> Option<TaskRecord> {
        self.inner.lock_state().record(task_id).cloned()
    }

    pub fn view(&self) -> UploadListView {
        self.inner.lock_state().view()
    }

    /// Receives a fresh list view after every change.
    pub fn subscribe(&self) -> watch::Receiver<UploadListView> {
        self.inner.view_tx.subscribe()
    }

    /// Waits until every pipeline started so far has finished.
    pub async fn settled(&self) {
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        self.inner.tracker.reopen();
    }
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(self: &Arc<Self>, msg: Msg) {
        let effects = {
            let mut guard = self.lock_state();
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update(state, msg);
            // Published under the lock so views reach subscribers in state order.
            if state.consume_dirty() {
                self.view_tx.send_replace(state.view());
            }
            *guard = state;
            effects
        };

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(self: &Arc<Self>, effect: Effect) {
        match effect {
            Effect::EvaluateGate { task_id, file } => {
                let inner = Arc::clone(self);
                self.tracker.spawn(async move {
                    inner.run_gate(task_id, file).await;
                });
            }
            Effect::StartUpload { task_id, file } => {
                let inner = Arc::clone(self);
                self.tracker.spawn(async move {
                    inner.run_upload(task_id, file).await;
                });
            }
            Effect::Notify(notification) => self.notify(notification),
        }
    }

    async fn run_gate(self: &Arc<Self>, task_id: TaskId, file: RawFile) {
        let name = file.name().to_string();
        let msg = match evaluate_gate(self.gate.as_deref(), file).await {
            GateOutcome::Accepted(file) => Msg::GateAccepted { task_id, file },
            GateOutcome::Rejected => {
                upload_debug!("task {} ({}) rejected by gate", task_id, name);
                Msg::GateRejected { task_id }
            }
            GateOutcome::Failed { original, error } => {
                upload_warn!("task {} ({}) gate failed: {}", task_id, name, error);
                Msg::GateFailed {
                    task_id,
                    file: original,
                    failure: error.into(),
                }
            }
        };
        self.dispatch(msg);
    }

    async fn run_upload(self: &Arc<Self>, task_id: TaskId, file: RawFile) {
        let request = UploadRequest {
            endpoint: self.settings.endpoint.clone(),
            fields: self.settings.fields.clone(),
            headers: self.settings.headers.clone(),
            field_name: self.settings.field_name.clone(),
            file,
            with_credentials: self.settings.with_credentials,
        };
        let sink: Arc<dyn ProgressSink> = Arc::new(TaskProgressSink {
            inner: Arc::clone(self),
            task_id,
        });

        self.dispatch(Msg::UploadStarted { task_id });
        let msg = match self.transport.upload(request, sink).await {
            Ok(response) => {
                upload_info!("task {} uploaded", task_id);
                Msg::UploadSucceeded { task_id, response }
            }
            Err(err) => {
                upload_warn!("task {} upload failed: {}", task_id, err);
                Msg::UploadFailed {
                    task_id,
                    failure: Failure::from(err),
                }
            }
        };
        self.dispatch(msg);
    }

    fn notify(&self, notification: Notification) {
        let listener = self.listener.as_ref();
        match notification {
            Notification::Progress { percent, file } => listener.on_progress(percent, &file),
            Notification::Success { response, file } => listener.on_success(&response, &file),
            Notification::Error { failure, file } => listener.on_error(&failure, &file),
            Notification::Change { file } => listener.on_change(&file),
            Notification::Removed { record } => listener.on_remove(&record),
        }
    }
}

struct TaskProgressSink {
    inner: Arc<Inner>,
    task_id: TaskId,
}

impl ProgressSink for TaskProgressSink {
    fn progress(&self, loaded: u64, total: u64) {
        self.inner.dispatch(Msg::UploadProgress {
            task_id: self.task_id,
            loaded,
            total,
        });
    }
}
