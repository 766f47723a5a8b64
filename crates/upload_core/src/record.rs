use std::fmt;

use serde_json::Value;

use crate::RawFile;

pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Ready,
    Uploading,
    Success,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Ready => write!(f, "ready"),
            TaskStatus::Uploading => write!(f, "uploading"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Error => write!(f, "error"),
        }
    }
}

/// Opaque failure payload attached to a task in the `error` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// HTTP status when the server answered with one.
    pub status: Option<u16>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Lifecycle of a task. The server response and the failure payload only
/// exist in their terminal state.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Ready,
    Uploading,
    Success(Value),
    Error(Failure),
}

/// One submitted file and its upload lifecycle.
///
/// Records are never mutated in place: every transition consumes the record
/// and returns its replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    size: u64,
    percent: u8,
    state: TaskState,
    raw: RawFile,
}

impl TaskRecord {
    pub fn new(id: TaskId, raw: RawFile) -> Self {
        Self {
            id,
            name: raw.name().to_string(),
            size: raw.size(),
            percent: 0,
            state: TaskState::Ready,
            raw,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn state(&self) -> &TaskState {
        &self.state
    }

    pub fn status(&self) -> TaskStatus {
        match self.state {
            TaskState::Ready => TaskStatus::Ready,
            TaskState::Uploading => TaskStatus::Uploading,
            TaskState::Success(_) => TaskStatus::Success,
            TaskState::Error(_) => TaskStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn raw(&self) -> &RawFile {
        &self.raw
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.state {
            TaskState::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            TaskState::Error(failure) => Some(failure),
            _ => None,
        }
    }

    /// `ready -> uploading`. Terminal records are returned unchanged.
    pub fn start_upload(mut self) -> Self {
        if !self.is_terminal() {
            self.state = TaskState::Uploading;
        }
        self
    }

    /// Applies a progress percentage. The stored percent never decreases.
    pub fn with_progress(mut self, percent: u8) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.percent = self.percent.max(percent.min(100));
        self.state = TaskState::Uploading;
        self
    }

    pub fn succeed(mut self, response: Value) -> Self {
        if !self.is_terminal() {
            self.state = TaskState::Success(response);
        }
        self
    }

    pub fn fail(mut self, failure: Failure) -> Self {
        if !self.is_terminal() {
            self.state = TaskState::Error(failure);
        }
        self
    }
}

/// Rounded `loaded / total` as a percentage in `0..=100`. An unknown total
/// (`0`) reports `0`.
pub fn percent_of(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let scaled = (u128::from(loaded) * 100 + u128::from(total) / 2) / u128::from(total);
    scaled.min(100) as u8
}
