use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use upload_core::{Failure, RawFile, TaskRecord, TaskStatus, UploadListView};
use upload_engine::UploadListener;
use upload_logging::upload_warn;

/// Prints task events as they arrive.
pub struct ConsoleListener<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleListener<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn line(&self, text: String) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{text}") {
            upload_warn!("console write failed: {}", err);
        }
    }
}

impl<W: Write + Send> UploadListener for ConsoleListener<W> {
    fn on_progress(&self, percent: u8, file: &RawFile) {
        self.line(format!("{:>3}%  {}", percent, file.name()));
    }

    fn on_success(&self, _response: &Value, file: &RawFile) {
        self.line(format!("done  {}", file.name()));
    }

    fn on_error(&self, failure: &Failure, file: &RawFile) {
        self.line(format!("fail  {}: {}", file.name(), failure));
    }

    fn on_remove(&self, record: &TaskRecord) {
        self.line(format!("removed {}", record.name()));
    }
}

/// One row per task in list order, followed by a status tally.
pub fn render_summary(view: &UploadListView) -> String {
    let mut text = String::new();
    for row in &view.rows {
        text.push_str(&format!(
            "#{:<4} {:<10} {:>10} B  {}\n",
            row.task_id,
            row.status.to_string(),
            row.size,
            row.name
        ));
    }
    text.push_str(&format!(
        "{} uploaded, {} failed\n",
        view.count(TaskStatus::Success),
        view.count(TaskStatus::Error)
    ));
    text
}

#[cfg(test)]
mod tests {
    use upload_core::{RawFile, TaskStatus, TaskRowView, UploadListView};
    use upload_engine::UploadListener;

    use super::{render_summary, ConsoleListener};

    #[test]
    fn summary_lists_rows_and_totals() {
        let view = UploadListView {
            rows: vec![
                TaskRowView {
                    task_id: 1,
                    name: "a.png".to_string(),
                    size: 12,
                    status: TaskStatus::Success,
                    percent: 100,
                },
                TaskRowView {
                    task_id: 2,
                    name: "b.png".to_string(),
                    size: 7,
                    status: TaskStatus::Error,
                    percent: 40,
                },
            ],
            dirty: false,
        };

        let text = render_summary(&view);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#1"));
        assert!(lines[0].contains("success"));
        assert!(lines[1].contains("error"));
        assert!(lines[1].ends_with("b.png"));
        assert_eq!(lines[2], "1 uploaded, 1 failed");
    }

    #[test]
    fn listener_writes_one_line_per_event() {
        let listener = ConsoleListener::new(Vec::new());
        let file = RawFile::new("a.png", "x");
        listener.on_progress(5, &file);
        listener.on_success(&serde_json::Value::Null, &file);

        let out = listener.out.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  5%  a.png\ndone  a.png\n");
    }

    #[test]
    fn listener_keeps_writing_after_poisoned_lock() {
        let listener = ConsoleListener::new(Vec::new());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = listener.out.lock().unwrap();
            panic!("writer panicked");
        }));
        listener.on_success(&serde_json::Value::Null, &RawFile::new("a.png", "x"));

        let out = listener
            .out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(String::from_utf8(out).unwrap(), "done  a.png\n");
    }
}
