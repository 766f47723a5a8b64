use serde_json::Value;

use crate::{Failure, RawFile, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A batch of files from the file input, a drop, or a programmatic call.
    FilesSubmitted(Vec<RawFile>),
    /// The gate accepted the file, possibly after transforming it.
    GateAccepted { task_id: TaskId, file: RawFile },
    /// The gate rejected the file. No record is created.
    GateRejected { task_id: TaskId },
    /// The asynchronous gate step failed. `file` is the original submission.
    GateFailed {
        task_id: TaskId,
        file: RawFile,
        failure: Failure,
    },
    /// The transport call for the task was issued.
    UploadStarted { task_id: TaskId },
    /// Transport progress, in bytes.
    UploadProgress {
        task_id: TaskId,
        loaded: u64,
        total: u64,
    },
    /// Transport completion with the server response.
    UploadSucceeded { task_id: TaskId, response: Value },
    /// Transport failure.
    UploadFailed { task_id: TaskId, failure: Failure },
    /// Caller asked to remove a record from the list.
    RemoveRequested { task_id: TaskId },
}
