//! Generation controller.
//!
//! Owns the reply composer state and is the only writer to it. Every mutation
//! goes through one of the operations below so the rendering surface only
//! ever reads.

use crate::engine::GenerationService;
use crate::error::GenerateError;
use crate::model::{GenerateRequest, Tone};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationState {
    pub email_content: String,
    pub tone: Tone,
    pub status: Status,
    pub response_text: String,
    pub error_message: Option<String>,
    pub copied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputUpdate {
    Content(String),
    Tone(Tone),
}

/// A request handed out by `begin_generate`, to be resolved with
/// `apply_outcome` using the same `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub seq: u64,
    pub request: GenerateRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Empty,
    Failed(String),
}

/// Write-only access to the system clipboard.
pub trait ClipboardWriter {
    fn write_text(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct GenerationController {
    state: GenerationState,
    next_seq: u64,
    in_flight: Option<u64>,
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn update_input(&mut self, update: InputUpdate) {
        match update {
            InputUpdate::Content(content) => self.state.email_content = content,
            InputUpdate::Tone(tone) => self.state.tone = tone,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.state.email_content.trim().is_empty() && self.state.status != Status::Loading
    }

    /// Reset the output fields, enter `Loading` and hand out the request to send.
    ///
    /// Does not check `can_submit`. Calling it while a request is in flight
    /// supersedes that request: its outcome will be ignored.
    pub fn begin_generate(&mut self) -> PendingRequest {
        self.next_seq += 1;
        let seq = self.next_seq;
        if let Some(prev) = self.in_flight.replace(seq) {
            tracing::debug!(prev, seq, "superseding in-flight request");
        }

        self.state.error_message = None;
        self.state.response_text.clear();
        self.state.copied = false;
        self.state.status = Status::Loading;

        tracing::debug!(
            seq,
            tone = %self.state.tone,
            content_len = self.state.email_content.len(),
            "dispatching generate request"
        );

        PendingRequest {
            seq,
            request: GenerateRequest {
                email_content: self.state.email_content.clone(),
                tone: self.state.tone,
            },
        }
    }

    /// Apply the terminal transition for request `seq`.
    ///
    /// Returns false (and leaves state untouched) when `seq` is not the request
    /// currently in flight.
    pub fn apply_outcome(&mut self, seq: u64, outcome: Result<String, GenerateError>) -> bool {
        if self.in_flight != Some(seq) {
            tracing::debug!(seq, in_flight = ?self.in_flight, "dropping stale outcome");
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(text) => {
                tracing::info!(seq, reply_len = text.len(), "reply generated");
                self.state.status = Status::Success;
                self.state.response_text = text;
                self.state.error_message = None;
            }
            Err(e) => {
                if e.is_transport() {
                    tracing::warn!(seq, error = %e, "generate request failed");
                } else {
                    tracing::info!(seq, error = %e, "service rejected request");
                }
                self.state.status = Status::Error;
                self.state.response_text.clear();
                self.state.error_message = Some(e.to_string());
            }
        }
        true
    }

    /// Run one generate call end to end against `service`.
    pub async fn generate<S>(&mut self, service: &S)
    where
        S: GenerationService + ?Sized,
    {
        let pending = self.begin_generate();
        let outcome = service.generate(&pending.request).await;
        self.apply_outcome(pending.seq, outcome);
    }

    pub fn copy_response(&mut self, clipboard: &dyn ClipboardWriter) -> CopyOutcome {
        if self.state.response_text.is_empty() {
            return CopyOutcome::Empty;
        }
        match clipboard.write_text(&self.state.response_text) {
            Ok(()) => {
                self.state.copied = true;
                CopyOutcome::Copied
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "clipboard write failed");
                CopyOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    pub fn clear_response(&mut self) {
        self.state.response_text.clear();
        self.state.copied = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Service that answers every call with a canned outcome.
    enum Canned {
        Reply(&'static str),
        Reject(Option<&'static str>),
        Status(StatusCode),
    }

    struct FakeService {
        canned: Canned,
        seen: Mutex<Vec<GenerateRequest>>,
    }

    impl FakeService {
        fn new(canned: Canned) -> Self {
            Self {
                canned,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for FakeService {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
            self.seen.lock().unwrap().push(request.clone());
            match self.canned {
                Canned::Reply(s) => Ok(s.to_string()),
                Canned::Reject(msg) => crate::model::GenerateResponse {
                    data: None,
                    error_message: msg.map(str::to_string),
                    success: false,
                }
                .into_reply(),
                Canned::Status(code) => Err(GenerateError::Status(code)),
            }
        }
    }

    /// Service whose transport always fails: it posts to a port nobody listens on.
    struct UnreachableService(reqwest::Client);

    #[async_trait]
    impl GenerationService for UnreachableService {
        async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerateError> {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);
            let err = self
                .0
                .post(format!("http://{addr}/"))
                .json(request)
                .send()
                .await
                .expect_err("closed port accepted a connection");
            Err(GenerateError::Network(err))
        }
    }

    struct RecordingClipboard {
        fail: bool,
        written: Mutex<Vec<String>>,
    }

    impl RecordingClipboard {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                written: Mutex::new(Vec::new()),
            }
        }
    }

    impl ClipboardWriter for RecordingClipboard {
        fn write_text(&self, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("no display");
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn with_content(content: &str) -> GenerationController {
        let mut c = GenerationController::new();
        c.update_input(InputUpdate::Content(content.into()));
        c
    }

    #[test]
    fn fresh_state_defaults() {
        let c = GenerationController::new();
        let s = c.state();
        assert_eq!(s.tone, Tone::Professional);
        assert_eq!(s.status, Status::Idle);
        assert!(s.email_content.is_empty());
        assert!(s.response_text.is_empty());
        assert!(s.error_message.is_none());
        assert!(!s.copied);
    }

    #[test]
    fn whitespace_only_content_cannot_submit() {
        for input in ["", " ", "\n\t", "   \r\n  "] {
            let c = with_content(input);
            assert!(!c.can_submit(), "{input:?} should not be submittable");
        }
    }

    #[test]
    fn non_blank_content_can_submit_unless_loading() {
        for input in ["hi", "  x  ", "\nDear team,\n"] {
            let mut c = with_content(input);
            assert!(c.can_submit());
            c.begin_generate();
            assert!(!c.can_submit());
        }
    }

    #[test]
    fn update_input_replaces_fields() {
        let mut c = with_content("first");
        c.update_input(InputUpdate::Content("second".into()));
        c.update_input(InputUpdate::Tone(Tone::Urgent));
        assert_eq!(c.state().email_content, "second");
        assert_eq!(c.state().tone, Tone::Urgent);
    }

    #[test]
    fn begin_generate_resets_output_and_captures_input() {
        let mut c = with_content("please reply");
        c.update_input(InputUpdate::Tone(Tone::Casual));
        let first = c.begin_generate();
        c.apply_outcome(first.seq, Err(GenerateError::Rejected("nope".into())));

        let pending = c.begin_generate();
        assert_eq!(c.state().status, Status::Loading);
        assert!(c.state().error_message.is_none());
        assert!(c.state().response_text.is_empty());
        assert!(!c.state().copied);
        assert_eq!(
            pending.request,
            GenerateRequest {
                email_content: "please reply".into(),
                tone: Tone::Casual,
            }
        );
    }

    #[tokio::test]
    async fn successful_reply_sets_response_text() {
        let service = FakeService::new(Canned::Reply("Hello"));
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(c.state().status, Status::Success);
        assert_eq!(c.state().response_text, "Hello");
        assert!(c.state().error_message.is_none());
        assert_eq!(service.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_reply_is_still_success() {
        let service = FakeService::new(Canned::Reply(""));
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(c.state().status, Status::Success);
        assert!(c.state().response_text.is_empty());
    }

    #[tokio::test]
    async fn rejection_sets_error_message() {
        let service = FakeService::new(Canned::Reject(Some("bad tone")));
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(c.state().status, Status::Error);
        assert_eq!(c.state().error_message.as_deref(), Some("bad tone"));
        assert!(c.state().response_text.is_empty());
    }

    #[tokio::test]
    async fn rejection_without_message_uses_fallback() {
        let service = FakeService::new(Canned::Reject(None));
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(
            c.state().error_message.as_deref(),
            Some(crate::model::REJECTED_FALLBACK)
        );
    }

    #[tokio::test]
    async fn bad_status_embeds_code() {
        let service = FakeService::new(Canned::Status(StatusCode::SERVICE_UNAVAILABLE));
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(c.state().status, Status::Error);
        assert_eq!(c.state().error_message.as_deref(), Some("Request failed: 503"));
    }

    #[tokio::test]
    async fn network_failure_sets_non_empty_error() {
        let service = UnreachableService(reqwest::Client::builder().no_proxy().build().unwrap());
        let mut c = with_content("hi");
        c.generate(&service).await;

        assert_eq!(c.state().status, Status::Error);
        let msg = c.state().error_message.clone().unwrap_or_default();
        assert!(!msg.is_empty());
        assert!(c.state().response_text.is_empty());
    }

    #[tokio::test]
    async fn generate_never_leaves_loading() {
        let services = [
            FakeService::new(Canned::Reply("ok")),
            FakeService::new(Canned::Reject(None)),
            FakeService::new(Canned::Status(StatusCode::NOT_FOUND)),
        ];
        let mut c = with_content("hi");
        for service in &services {
            c.generate(service).await;
            assert!(matches!(c.state().status, Status::Success | Status::Error));
        }
    }

    #[tokio::test]
    async fn controller_stays_usable_after_error() {
        let mut c = with_content("hi");
        c.generate(&FakeService::new(Canned::Status(StatusCode::BAD_GATEWAY)))
            .await;
        assert_eq!(c.state().status, Status::Error);

        c.generate(&FakeService::new(Canned::Reply("recovered")))
            .await;
        assert_eq!(c.state().status, Status::Success);
        assert_eq!(c.state().response_text, "recovered");
        assert!(c.state().error_message.is_none());
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut c = with_content("hi");
        let first = c.begin_generate();
        let second = c.begin_generate();
        assert_ne!(first.seq, second.seq);

        assert!(c.apply_outcome(second.seq, Ok("newer".into())));
        assert!(!c.apply_outcome(first.seq, Ok("older".into())));
        assert_eq!(c.state().response_text, "newer");
        assert_eq!(c.state().status, Status::Success);
    }

    #[test]
    fn superseded_request_cannot_resolve_loading() {
        let mut c = with_content("hi");
        let first = c.begin_generate();
        let _second = c.begin_generate();

        assert!(!c.apply_outcome(first.seq, Err(GenerateError::Rejected("old".into()))));
        assert_eq!(c.state().status, Status::Loading);
        assert!(c.state().error_message.is_none());
    }

    #[test]
    fn duplicate_outcome_is_ignored() {
        let mut c = with_content("hi");
        let p = c.begin_generate();
        assert!(c.apply_outcome(p.seq, Ok("once".into())));
        assert!(!c.apply_outcome(p.seq, Err(GenerateError::Rejected("twice".into()))));
        assert_eq!(c.state().status, Status::Success);
    }

    #[test]
    fn copy_is_noop_without_response() {
        let clipboard = RecordingClipboard::new(false);
        let mut c = with_content("hi");
        assert_eq!(c.copy_response(&clipboard), CopyOutcome::Empty);
        assert!(!c.state().copied);
        assert!(clipboard.written.lock().unwrap().is_empty());
    }

    #[test]
    fn copy_writes_response_and_sets_flag() {
        let clipboard = RecordingClipboard::new(false);
        let mut c = with_content("hi");
        let p = c.begin_generate();
        c.apply_outcome(p.seq, Ok("Thanks!".into()));

        assert_eq!(c.copy_response(&clipboard), CopyOutcome::Copied);
        assert!(c.state().copied);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["Thanks!".to_string()]);
    }

    #[test]
    fn copy_failure_leaves_state_alone() {
        let clipboard = RecordingClipboard::new(true);
        let mut c = with_content("hi");
        let p = c.begin_generate();
        c.apply_outcome(p.seq, Ok("Thanks!".into()));

        let outcome = c.copy_response(&clipboard);
        assert!(matches!(outcome, CopyOutcome::Failed(ref m) if m.contains("no display")));
        assert!(!c.state().copied);
        assert_eq!(c.state().status, Status::Success);
        assert!(c.state().error_message.is_none());
    }

    #[test]
    fn clear_response_keeps_status_and_error() {
        let clipboard = RecordingClipboard::new(false);
        let mut c = with_content("hi");
        let p = c.begin_generate();
        c.apply_outcome(p.seq, Ok("Thanks!".into()));
        c.copy_response(&clipboard);

        c.clear_response();
        assert!(c.state().response_text.is_empty());
        assert!(!c.state().copied);
        assert_eq!(c.state().status, Status::Success);
        assert!(c.state().error_message.is_none());

        let p = c.begin_generate();
        c.apply_outcome(p.seq, Err(GenerateError::Rejected("bad tone".into())));
        c.clear_response();
        assert_eq!(c.state().status, Status::Error);
        assert_eq!(c.state().error_message.as_deref(), Some("bad tone"));
    }

    #[tokio::test]
    async fn next_generate_clears_copied_flag() {
        let clipboard = RecordingClipboard::new(false);
        let mut c = with_content("hi");
        c.generate(&FakeService::new(Canned::Reply("one"))).await;
        c.copy_response(&clipboard);
        assert!(c.state().copied);

        c.begin_generate();
        assert!(!c.state().copied);
    }
}
