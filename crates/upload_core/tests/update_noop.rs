use upload_core::{update, Msg, UploadState};

#[test]
fn empty_batch_is_noop() {
    let (mut next, effects) = update(UploadState::new(), Msg::FilesSubmitted(Vec::new()));

    assert!(effects.is_empty());
    assert!(next.is_empty());
    assert!(!next.consume_dirty());
}
