//! Upload engine: gate evaluation, transport, and the async orchestration
//! that feeds results back into the pure state in `upload_core`.
mod gate;
mod listener;
mod settings;
mod suggest;
mod transport;
mod types;
mod uploader;

pub use gate::{evaluate_gate, AcceptGate, AllOf, Gate, GateDecision, GateOutcome, SizeLimitGate};
pub use listener::{NoopListener, SuggestListener, UploadListener};
pub use settings::{SuggestSettings, TransportSettings, UploadSettings};
pub use suggest::{SuggestController, SuggestionSource};
pub use transport::{ProgressSink, ReqwestTransport, Transport, UploadRequest};
pub use types::{FailureKind, FetchError, GateError, TransportError};
pub use uploader::{Uploader, UploaderBuilder};
