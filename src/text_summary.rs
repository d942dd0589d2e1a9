//! Output builders for the headless modes.

use crate::controller::{GenerationState, Status};
use crate::model::GenerationReport;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    /// The reply itself, so it can be piped.
    pub stdout: Vec<String>,
    /// Status and error lines.
    pub stderr: Vec<String>,
}

pub(crate) fn build_text_summary(state: &GenerationState) -> TextSummary {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    match state.status {
        Status::Success => {
            stderr.push(format!("Tone: {}", state.tone));
            if state.response_text.is_empty() {
                stderr.push("The service returned an empty reply".into());
            }
            stdout.extend(state.response_text.lines().map(str::to_string));
        }
        Status::Error => {
            let msg = state
                .error_message
                .as_deref()
                .unwrap_or("Something went wrong");
            stderr.push(format!("Error: {}", msg));
        }
        Status::Idle | Status::Loading => {
            stderr.push(format!("Generation did not finish (status: {:?})", state.status));
        }
    }

    TextSummary { stdout, stderr }
}

pub(crate) fn build_report(endpoint: &str, state: &GenerationState) -> GenerationReport {
    GenerationReport {
        timestamp_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        endpoint: endpoint.to_string(),
        tone: state.tone,
        status: state.status,
        data: state.response_text.clone(),
        error_message: state.error_message.clone(),
        success: state.status == Status::Success,
    }
}
