use serde_json::Value;

use crate::{Failure, RawFile, TaskId, TaskRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run the caller's gate for one submitted file.
    EvaluateGate { task_id: TaskId, file: RawFile },
    /// Hand an accepted file to the transport.
    StartUpload { task_id: TaskId, file: RawFile },
    /// Tell listeners that something happened to a task.
    Notify(Notification),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Progress { percent: u8, file: RawFile },
    Success { response: Value, file: RawFile },
    Error { failure: Failure, file: RawFile },
    /// Fired once per task after its terminal outcome.
    Change { file: RawFile },
    Removed { record: TaskRecord },
}
