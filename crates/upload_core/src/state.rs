use crate::view_model::{TaskRowView, UploadListView};
use crate::{TaskId, TaskRecord};

/// Ordered list of upload tasks.
///
/// Insertion order is submission order. Records are located by id and
/// replaced whole, so unrelated updates never reorder or touch other rows.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadState {
    records: Vec<TaskRecord>,
    next_id: TaskId,
    dirty: bool,
}

impl Default for UploadState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            dirty: false,
        }
    }
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the list with pre-existing records. Ids allocated later start
    /// above the largest seeded id.
    pub fn with_records(records: Vec<TaskRecord>) -> Self {
        let next_id = records
            .iter()
            .map(TaskRecord::id)
            .max()
            .map_or(1, |max| max + 1);
        Self {
            records,
            next_id,
            dirty: true,
        }
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.records
    }

    pub fn record(&self, task_id: TaskId) -> Option<&TaskRecord> {
        self.records.iter().find(|record| record.id() == task_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self) -> UploadListView {
        UploadListView {
            rows: self
                .records
                .iter()
                .map(|record| TaskRowView {
                    task_id: record.id(),
                    name: record.name().to_string(),
                    size: record.size(),
                    status: record.status(),
                    percent: record.percent(),
                })
                .collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the list changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn allocate_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn append(&mut self, record: TaskRecord) {
        self.records.push(record);
        self.dirty = true;
    }

    /// Replaces the record with `task_id` by `f(record)`. Returns the new
    /// record, or `None` when no record has that id.
    pub(crate) fn replace<F>(&mut self, task_id: TaskId, f: F) -> Option<&TaskRecord>
    where
        F: FnOnce(TaskRecord) -> TaskRecord,
    {
        let index = self
            .records
            .iter()
            .position(|record| record.id() == task_id)?;
        let current = self.records[index].clone();
        let next = f(current);
        if next != self.records[index] {
            self.records[index] = next;
            self.dirty = true;
        }
        Some(&self.records[index])
    }

    pub(crate) fn remove(&mut self, task_id: TaskId) -> Option<TaskRecord> {
        let index = self
            .records
            .iter()
            .position(|record| record.id() == task_id)?;
        self.dirty = true;
        Some(self.records.remove(index))
    }
}
