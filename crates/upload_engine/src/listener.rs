use serde_json::Value;
use upload_core::{Failure, RawFile, Suggestion, TaskRecord};

/// Callbacks fired by an `Uploader`. They run outside the list lock, so a
/// listener may call back into the uploader.
pub trait UploadListener: Send + Sync {
    /// Transport progress below 100%.
    fn on_progress(&self, _percent: u8, _file: &RawFile) {}
    fn on_success(&self, _response: &Value, _file: &RawFile) {}
    /// Transport failure, or failure of an asynchronous gate step.
    fn on_error(&self, _failure: &Failure, _file: &RawFile) {}
    /// Fired once per task after its terminal outcome.
    fn on_change(&self, _file: &RawFile) {}
    fn on_remove(&self, _record: &TaskRecord) {}
}

pub trait SuggestListener: Send + Sync {
    fn on_select(&self, _item: &Suggestion) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl UploadListener for NoopListener {}

impl SuggestListener for NoopListener {}
