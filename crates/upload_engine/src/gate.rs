use futures_util::future::BoxFuture;
use upload_core::RawFile;

use crate::GateError;

/// What a gate decided for one file.
pub enum GateDecision {
    /// Upload this file now. Gates accepting as-is hand back the file they got.
    Accept(RawFile),
    /// Drop the file silently.
    Reject,
    /// Upload whatever the future resolves to, or drop the file if it fails.
    PendingThen(BoxFuture<'static, Result<RawFile, GateError>>),
}

impl GateDecision {
    pub fn from_bool(accept: bool, file: RawFile) -> Self {
        if accept {
            GateDecision::Accept(file)
        } else {
            GateDecision::Reject
        }
    }
}

/// Caller-supplied check run on every file before it is uploaded.
///
/// Side effects such as alerting the user about a rejected file belong to the
/// gate; the uploader neither performs nor suppresses them.
pub trait Gate: Send + Sync {
    fn check(&self, file: RawFile) -> GateDecision;
}

impl<F> Gate for F
where
    F: Fn(RawFile) -> GateDecision + Send + Sync,
{
    fn check(&self, file: RawFile) -> GateDecision {
        self(file)
    }
}

/// Settled result of a gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Accepted(RawFile),
    Rejected,
    /// The asynchronous step failed; `original` is the file as submitted.
    Failed { original: RawFile, error: GateError },
}

/// Runs `gate` on `file` and waits for the pending branch if there is one.
/// No gate accepts everything.
pub async fn evaluate_gate(gate: Option<&dyn Gate>, file: RawFile) -> GateOutcome {
    let Some(gate) = gate else {
        return GateOutcome::Accepted(file);
    };
    let original = file.clone();
    match gate.check(file) {
        GateDecision::Accept(file) => GateOutcome::Accepted(file),
        GateDecision::Reject => GateOutcome::Rejected,
        GateDecision::PendingThen(pending) => match pending.await {
            Ok(file) => GateOutcome::Accepted(file),
            Err(error) => GateOutcome::Failed { original, error },
        },
    }
}

/// Accepts files strictly smaller than `max_bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimitGate {
    pub max_bytes: u64,
}

impl SizeLimitGate {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl Gate for SizeLimitGate {
    fn check(&self, file: RawFile) -> GateDecision {
        let accept = file.size() < self.max_bytes;
        GateDecision::from_bool(accept, file)
    }
}

/// Accepts files matching an HTML-style accept list such as
/// `".png, .jpg, image/*, application/pdf"`. An empty list accepts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptGate {
    patterns: Vec<String>,
}

impl AcceptGate {
    pub fn parse(accept: &str) -> Self {
        let patterns = accept
            .split(',')
            .map(|pattern| pattern.trim().to_ascii_lowercase())
            .filter(|pattern| !pattern.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn matches(&self, file: &RawFile) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let extension = file.extension();
        let mime = file.mime_type().map(str::to_ascii_lowercase);
        self.patterns.iter().any(|pattern| {
            if pattern.starts_with('.') {
                extension.as_deref() == Some(pattern.as_str())
            } else if let Some(family) = pattern.strip_suffix("/*") {
                mime.as_deref()
                    .and_then(|mime| mime.split_once('/'))
                    .is_some_and(|(kind, _)| kind == family)
            } else {
                mime.as_deref() == Some(pattern.as_str())
            }
        })
    }
}

impl Gate for AcceptGate {
    fn check(&self, file: RawFile) -> GateDecision {
        let accept = self.matches(&file);
        GateDecision::from_bool(accept, file)
    }
}

/// Chains synchronous gates; the first rejection wins. A pending decision
/// from any member ends the chain and is returned as is.
pub struct AllOf {
    gates: Vec<Box<dyn Gate>>,
}

impl AllOf {
    pub fn new(gates: Vec<Box<dyn Gate>>) -> Self {
        Self { gates }
    }
}

impl Gate for AllOf {
    fn check(&self, file: RawFile) -> GateDecision {
        let mut current = file;
        for gate in &self.gates {
            match gate.check(current) {
                GateDecision::Accept(next) => current = next,
                other => return other,
            }
        }
        GateDecision::Accept(current)
    }
}

#[cfg(test)]
mod tests {
    use super::{evaluate_gate, AcceptGate, AllOf, Gate, GateDecision, GateOutcome, SizeLimitGate};
    use crate::GateError;
    use upload_core::RawFile;

    fn png(size: usize) -> RawFile {
        RawFile::new("photo.png", vec![0u8; size]).with_mime_type("image/png")
    }

    #[tokio::test]
    async fn missing_gate_accepts() {
        let outcome = evaluate_gate(None, png(1)).await;
        assert_eq!(outcome, GateOutcome::Accepted(png(1)));
    }

    #[tokio::test]
    async fn closure_gate_can_transform_asynchronously() {
        let gate = |file: RawFile| {
            GateDecision::PendingThen(Box::pin(async move {
                Ok::<_, GateError>(RawFile::new(format!("small-{}", file.name()), "tiny"))
            }))
        };
        let outcome = evaluate_gate(Some(&gate as &dyn Gate), png(10)).await;
        assert_eq!(
            outcome,
            GateOutcome::Accepted(RawFile::new("small-photo.png", "tiny"))
        );
    }

    #[tokio::test]
    async fn failed_transform_reports_original_file() {
        let gate = |_file: RawFile| {
            GateDecision::PendingThen(Box::pin(async { Err::<RawFile, _>(GateError::new("decode")) }))
        };
        let outcome = evaluate_gate(Some(&gate as &dyn Gate), png(3)).await;
        assert_eq!(
            outcome,
            GateOutcome::Failed {
                original: png(3),
                error: GateError::new("decode"),
            }
        );
    }

    #[test]
    fn size_limit_is_exclusive() {
        let gate = SizeLimitGate::new(4);
        assert!(matches!(gate.check(png(3)), GateDecision::Accept(_)));
        assert!(matches!(gate.check(png(4)), GateDecision::Reject));
    }

    #[test]
    fn accept_list_matches_extension_and_mime() {
        let gate = AcceptGate::parse(".JPG, image/*");
        assert!(gate.matches(&png(1)));
        assert!(gate.matches(&RawFile::new("scan.jpg", "x")));
        assert!(!gate.matches(&RawFile::new("notes.txt", "x").with_mime_type("text/plain")));

        let exact = AcceptGate::parse("application/pdf");
        assert!(exact.matches(&RawFile::new("a", "x").with_mime_type("application/pdf")));
        assert!(!exact.matches(&png(1)));

        assert!(AcceptGate::parse(" , ").matches(&RawFile::new("any", "x")));
    }

    #[test]
    fn all_of_stops_at_first_rejection() {
        let gate = AllOf::new(vec![
            Box::new(AcceptGate::parse(".png")),
            Box::new(SizeLimitGate::new(2)),
        ]);
        assert!(matches!(gate.check(png(1)), GateDecision::Accept(_)));
        assert!(matches!(gate.check(png(5)), GateDecision::Reject));
        assert!(matches!(
            gate.check(RawFile::new("a.txt", "x")),
            GateDecision::Reject
        ));
    }
}
