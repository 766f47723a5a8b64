//! Upload core: pure state machines for the upload list and the suggestion selector.
mod drag;
mod effect;
mod file;
mod msg;
mod record;
mod state;
mod suggest;
mod update;
mod view_model;

pub use drag::DragTracker;
pub use effect::{Effect, Notification};
pub use file::RawFile;
pub use msg::Msg;
pub use record::{percent_of, Failure, TaskId, TaskRecord, TaskState, TaskStatus};
pub use state::UploadState;
pub use suggest::{
    update_suggest, Key, SuggestEffect, SuggestMsg, SuggestState, Suggestion, SuggestionResults,
};
pub use update::update;
pub use view_model::{TaskRowView, UploadListView};
