use crate::{percent_of, Effect, Msg, Notification, TaskRecord, UploadState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every task event is matched to its record by id. Events for ids that are
/// no longer in the list (removed, or rejected by the gate) and events for
/// records already in a terminal state produce no change and no effects.
pub fn update(mut state: UploadState, msg: Msg) -> (UploadState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSubmitted(files) => files
            .into_iter()
            .map(|file| Effect::EvaluateGate {
                task_id: state.allocate_id(),
                file,
            })
            .collect(),
        Msg::GateAccepted { task_id, file } => {
            if state.record(task_id).is_some() {
                return (state, Vec::new());
            }
            state.append(TaskRecord::new(task_id, file.clone()));
            vec![Effect::StartUpload { task_id, file }]
        }
        Msg::GateRejected { .. } => Vec::new(),
        Msg::GateFailed { file, failure, .. } => {
            vec![Effect::Notify(Notification::Error { failure, file })]
        }
        Msg::UploadStarted { task_id } => {
            state.replace(task_id, TaskRecord::start_upload);
            Vec::new()
        }
        Msg::UploadProgress {
            task_id,
            loaded,
            total,
        } => {
            let percent = percent_of(loaded, total);
            let previous = match state.record(task_id) {
                Some(record) if !record.is_terminal() => record.percent(),
                _ => return (state, Vec::new()),
            };
            let Some(record) = state.replace(task_id, |record| record.with_progress(percent))
            else {
                return (state, Vec::new());
            };
            // 100% is left to the success signal; late lower reports are silent.
            if percent < 100 && record.percent() > previous {
                vec![Effect::Notify(Notification::Progress {
                    percent,
                    file: record.raw().clone(),
                })]
            } else {
                Vec::new()
            }
        }
        Msg::UploadSucceeded { task_id, response } => {
            match state.record(task_id) {
                Some(record) if !record.is_terminal() => {}
                _ => return (state, Vec::new()),
            }
            let Some(record) = state.replace(task_id, |record| record.succeed(response.clone()))
            else {
                return (state, Vec::new());
            };
            let file = record.raw().clone();
            vec![
                Effect::Notify(Notification::Success {
                    response,
                    file: file.clone(),
                }),
                Effect::Notify(Notification::Change { file }),
            ]
        }
        Msg::UploadFailed { task_id, failure } => {
            match state.record(task_id) {
                Some(record) if !record.is_terminal() => {}
                _ => return (state, Vec::new()),
            }
            let Some(record) = state.replace(task_id, |record| record.fail(failure.clone()))
            else {
                return (state, Vec::new());
            };
            let file = record.raw().clone();
            vec![
                Effect::Notify(Notification::Error {
                    failure,
                    file: file.clone(),
                }),
                Effect::Notify(Notification::Change { file }),
            ]
        }
        Msg::RemoveRequested { task_id } => match state.remove(task_id) {
            Some(record) => vec![Effect::Notify(Notification::Removed { record })],
            None => Vec::new(),
        },
    };

    (state, effects)
}
