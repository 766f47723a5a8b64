use std::io;
use std::sync::Arc;

use anyhow::Context;
use upload_core::{RawFile, TaskStatus};
use upload_engine::{
    AcceptGate, AllOf, Gate, GateDecision, ReqwestTransport, SizeLimitGate, Uploader,
    UploaderBuilder,
};
use upload_logging::upload_info;

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::input::read_batch;
use crate::report::{render_summary, ConsoleListener};

/// Uploads the files named on the command line. Returns `false` if any
/// upload failed.
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = AppConfig::resolve(&cli).context("loading configuration")?;
    upload_info!("uploading to {}", config.endpoint);

    let batch = read_batch(&cli.files);
    if batch.is_empty() {
        anyhow::bail!("none of the given files could be read");
    }

    let transport =
        ReqwestTransport::new(config.transport_settings()).context("building http client")?;
    let builder = Uploader::builder(Arc::new(transport))
        .settings(config.upload_settings())
        .listener(Arc::new(ConsoleListener::new(io::stdout())));
    let uploader = with_gate(builder, &config).build();

    uploader.submit(batch);
    uploader.settled().await;

    let view = uploader.view();
    print!("{}", render_summary(&view));
    Ok(view.count(TaskStatus::Error) == 0)
}

/// Combines the configured accept list and size limit, if any.
fn file_gate(config: &AppConfig) -> Option<AllOf> {
    let mut gates: Vec<Box<dyn Gate>> = Vec::new();
    if let Some(accept) = config.accept.as_deref() {
        gates.push(Box::new(AcceptGate::parse(accept)));
    }
    if let Some(max_bytes) = config.max_bytes {
        gates.push(Box::new(SizeLimitGate::new(max_bytes)));
    }
    (!gates.is_empty()).then(|| AllOf::new(gates))
}

/// Installs the configured gate. Skipped files are reported here; the
/// uploader itself drops them silently.
fn with_gate(builder: UploaderBuilder, config: &AppConfig) -> UploaderBuilder {
    let Some(gate) = file_gate(config) else {
        return builder;
    };
    builder.gate(move |file: RawFile| {
        let name = file.name().to_string();
        let size = file.size();
        let decision = gate.check(file);
        if matches!(decision, GateDecision::Reject) {
            println!("skip  {name}: {size} bytes, type or size not accepted");
        }
        decision
    })
}
