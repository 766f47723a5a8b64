use crate::{TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadListView {
    pub rows: Vec<TaskRowView>,
    pub dirty: bool,
}

impl UploadListView {
    pub fn count(&self, status: TaskStatus) -> usize {
        self.rows.iter().filter(|row| row.status == status).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub task_id: TaskId,
    pub name: String,
    pub size: u64,
    pub status: TaskStatus,
    pub percent: u8,
}
