//! Batch orchestrator.
//!
//! Each payload runs through its own chain of stages:
//! 1. Recognition (collaborator)
//! 2. Format version check
//! 3. Freshness check against the injected clock
//! 4. Signing (collaborator), content replaced by signed content
//! 5. Dispatch (collaborator)
//!
//! Failures in stages 1-4 are reported as "Can't prepare file to send: ...",
//! failures in stage 5 as "Can't send: ...". A failing document never
//! affects the rest of the batch.

use crate::clock::{Clock, SystemClock};
use crate::config::PipelineConfig;
use crate::document::{BatchReport, Document, JsonRecognizer, Outcome, RawPayload, Recognizer};
use crate::error::{PipelineError, StageResult};
use crate::logging::structured::LogContext;
use crate::security::{Credential, Cryptographer, Ed25519Cryptographer};
use crate::transport::{OutboxSender, Sender};
use crate::validation::{check_format_version, check_timestamp};
use crate::{log_debug, log_info, log_warn};

use super::context::BatchContext;
use super::railway::{of, Railway};

/// Prefix for failures while preparing a document.
pub const PREPARE_CONTEXT: &str = "Can't prepare file to send";

/// Prefix for failures reported by the sender.
pub const SEND_CONTEXT: &str = "Can't send";

/// Orchestrator with the reference collaborators.
pub type StandardFileSender = FileSender<JsonRecognizer, Ed25519Cryptographer, OutboxSender, SystemClock>;

/// Validates, signs and dispatches batches of documents.
pub struct FileSender<R, C, S, K> {
    recognizer: R,
    cryptographer: C,
    sender: S,
    clock: K,
    config: PipelineConfig,
}

impl StandardFileSender {
    /// JSON recognition, Ed25519 signing, in-memory outbox, wall clock.
    pub fn standard(config: PipelineConfig) -> Self {
        FileSender::new(
            JsonRecognizer,
            Ed25519Cryptographer,
            OutboxSender::new(),
            SystemClock,
            config,
        )
    }
}

impl<R, C, S, K> FileSender<R, C, S, K>
where
    R: Recognizer,
    C: Cryptographer,
    S: Sender,
    K: Clock,
{
    pub fn new(recognizer: R, cryptographer: C, sender: S, clock: K, config: PipelineConfig) -> Self {
        Self {
            recognizer,
            cryptographer,
            sender,
            clock,
            config,
        }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn cryptographer(&self) -> &C {
        &self.cryptographer
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every payload and return one outcome per payload, in order.
    pub fn send_files<'a>(&self, payloads: &'a [RawPayload], credential: &Credential) -> Vec<Outcome<'a>> {
        self.send_batch(payloads, credential).outcomes
    }

    /// Like [`send_files`](Self::send_files), with batch id and counts.
    pub fn send_batch<'a>(&self, payloads: &'a [RawPayload], credential: &Credential) -> BatchReport<'a> {
        let batch = BatchContext::new(self.clock.now());
        let batch_ctx = batch.log_context();

        log_info!(
            batch_ctx,
            "BATCH_RECEIVED",
            documents = payloads.len(),
            key_id = credential.key_id(),
        );

        let outcomes: Vec<Outcome<'a>> = payloads
            .iter()
            .map(|payload| self.process_document(&batch, payload, credential))
            .collect();

        let sent_count = outcomes.iter().filter(|o| o.is_success()).count();
        let failed_count = outcomes.len() - sent_count;

        log::info!(
            "{} BATCH_COMPLETE received={} sent={} failed={}",
            batch_ctx,
            payloads.len(),
            sent_count,
            failed_count
        );

        BatchReport {
            batch_id: batch.batch_id,
            received_count: payloads.len(),
            sent_count,
            failed_count,
            outcomes,
        }
    }

    fn process_document<'a>(
        &self,
        batch: &BatchContext,
        payload: &'a RawPayload,
        credential: &Credential,
    ) -> Outcome<'a> {
        let ctx = batch.document_context(&payload.name);
        log_debug!(ctx, "DOCUMENT_RECEIVED", bytes = payload.content.len());

        let result = self
            .prepare(payload, credential, &ctx)
            .refine_error(PREPARE_CONTEXT)
            .map_then(|doc| self.dispatch(doc, &ctx).refine_error(SEND_CONTEXT));

        match result {
            Ok(()) => {
                log::info!("{} DOCUMENT_SENT", ctx);
                Outcome::Sent { payload }
            }
            Err(err) => {
                let message = err.to_string();
                log_warn!(ctx, "DOCUMENT_FAILED", kind = err.kind().as_str(), reason = message);
                Outcome::Failed { payload, message }
            }
        }
    }

    fn prepare(&self, payload: &RawPayload, credential: &Credential, ctx: &LogContext) -> StageResult<Document> {
        of(|| self.recognizer.recognize(payload), PipelineError::recognition)
            .map_then(|doc| {
                log_debug!(ctx, "DOCUMENT_RECOGNIZED", format = doc.format, created = doc.created);
                check_format_version(doc, &self.config.formats)
            })
            .map_then(|doc| {
                log_debug!(ctx, "FORMAT_CHECKED", format = doc.format);
                check_timestamp(doc, self.clock.now(), &self.config.freshness)
            })
            .map_then(|doc| {
                log_debug!(ctx, "FRESHNESS_CHECKED", created = doc.created);
                self.sign(doc, credential)
            })
    }

    fn sign(&self, doc: Document, credential: &Credential) -> StageResult<Document> {
        let signed = of(
            || self.cryptographer.sign(&doc.content, credential),
            PipelineError::signing,
        )?;
        Ok(doc.with_content(signed))
    }

    fn dispatch(&self, doc: Document, ctx: &LogContext) -> StageResult<()> {
        log_debug!(ctx, "DOCUMENT_SIGNED", bytes = doc.content.len());
        of(
            || self.sender.send(doc).map_err(anyhow::Error::from),
            PipelineError::send,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use anyhow::{anyhow, bail};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::config::Boundary;
    use crate::error::ErrorKind;
    use crate::transport::SendError;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    fn payload(name: &str, format: &str, created: DateTime<Utc>) -> RawPayload {
        let body = serde_json::json!({
            "format": format,
            "created": created.to_rfc3339(),
            "content": format!("body of {}", name),
        });
        RawPayload::new(name, body.to_string())
    }

    fn fresh(name: &str) -> RawPayload {
        payload(name, "4.0", now() - Duration::days(2))
    }

    fn credential() -> Credential {
        Credential::new("test-key", vec![1u8; 32])
    }

    #[derive(Default)]
    struct CountingRecognizer {
        calls: Cell<usize>,
    }

    impl Recognizer for CountingRecognizer {
        fn recognize(&self, payload: &RawPayload) -> anyhow::Result<Document> {
            self.calls.set(self.calls.get() + 1);
            JsonRecognizer.recognize(payload)
        }
    }

    #[derive(Default)]
    struct CountingCryptographer {
        calls: Cell<usize>,
        fail_with: Option<&'static str>,
        panic: bool,
    }

    impl Cryptographer for CountingCryptographer {
        fn sign(&self, content: &[u8], credential: &Credential) -> anyhow::Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            if self.panic {
                panic!("hsm unavailable");
            }
            if let Some(message) = self.fail_with {
                bail!(message);
            }
            let mut signed = format!("signed[{}]:", credential.key_id()).into_bytes();
            signed.extend_from_slice(content);
            Ok(signed)
        }
    }

    #[derive(Default)]
    struct CountingSender {
        fail_with: Option<&'static str>,
        sent: RefCell<Vec<Document>>,
    }

    impl CountingSender {
        fn calls(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Sender for CountingSender {
        fn send(&self, document: Document) -> Result<(), SendError> {
            self.sent.borrow_mut().push(document);
            match self.fail_with {
                Some(message) => Err(SendError::Transport(message.to_string())),
                None => Ok(()),
            }
        }
    }

    type TestSender = FileSender<CountingRecognizer, CountingCryptographer, CountingSender, FixedClock>;

    fn file_sender(cryptographer: CountingCryptographer, sender: CountingSender) -> TestSender {
        FileSender::new(
            CountingRecognizer::default(),
            cryptographer,
            sender,
            FixedClock(now()),
            PipelineConfig::default(),
        )
    }

    fn default_sender() -> TestSender {
        file_sender(CountingCryptographer::default(), CountingSender::default())
    }

    #[test]
    fn test_valid_document_is_signed_and_sent() {
        let fs = default_sender();
        let payloads = vec![fresh("a.json")];

        let outcomes = fs.send_files(&payloads, &credential());

        assert_eq!(outcomes, vec![Outcome::Sent { payload: &payloads[0] }]);
        assert_eq!(fs.recognizer().calls.get(), 1);
        assert_eq!(fs.cryptographer().calls.get(), 1);

        let sent = fs.sender().sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, b"signed[test-key]:body of a.json");
        assert_eq!(sent[0].format, "4.0");
    }

    #[test]
    fn test_invalid_format_never_signed_or_sent() {
        let fs = default_sender();
        let payloads = vec![payload("old-format.json", "2.0", now())];

        let outcomes = fs.send_files(&payloads, &credential());

        assert_eq!(
            outcomes[0].error(),
            Some("Can't prepare file to send: Invalid format version: 2.0")
        );
        assert_eq!(fs.cryptographer().calls.get(), 0);
        assert_eq!(fs.sender().calls(), 0);
    }

    #[test]
    fn test_exactly_one_month_old_passes() {
        let fs = default_sender();
        let created = Utc.with_ymd_and_hms(2026, 9, 17, 12, 0, 0).unwrap();
        let payloads = vec![payload("edge.json", "3.1", created)];

        let outcomes = fs.send_files(&payloads, &credential());
        assert!(outcomes[0].is_success());
    }

    #[test]
    fn test_one_month_and_one_second_old_fails() {
        let fs = default_sender();
        let created = now() - Duration::seconds(1);
        let created = created.checked_sub_months(chrono::Months::new(1)).unwrap();
        let payloads = vec![payload("stale.json", "4.0", created)];

        let outcomes = fs.send_files(&payloads, &credential());

        let message = outcomes[0].error().unwrap();
        assert!(message.starts_with("Can't prepare file to send: Too old document"));
        assert!(message.ends_with("2026-09-17T11:59:59Z"));
        assert_eq!(fs.cryptographer().calls.get(), 0);
        assert_eq!(fs.sender().calls(), 0);
    }

    #[test]
    fn test_exclusive_boundary_from_config() {
        let mut config = PipelineConfig::default();
        config.freshness.boundary = Boundary::Exclusive;
        let fs = FileSender::new(
            CountingRecognizer::default(),
            CountingCryptographer::default(),
            CountingSender::default(),
            FixedClock(now()),
            config,
        );
        let created = Utc.with_ymd_and_hms(2026, 9, 17, 12, 0, 0).unwrap();
        let payloads = vec![payload("edge.json", "4.0", created)];

        let outcomes = fs.send_files(&payloads, &credential());
        assert!(outcomes[0].error().unwrap().contains("Too old document"));
    }

    #[test]
    fn test_recognition_failure() {
        let fs = default_sender();
        let payloads = vec![RawPayload::new("garbage.bin", b"\x00\x01not json".to_vec())];

        let outcomes = fs.send_files(&payloads, &credential());

        let message = outcomes[0].error().unwrap();
        assert!(message.starts_with("Can't prepare file to send: Can't recognize garbage.bin"));
        assert_eq!(fs.recognizer().calls.get(), 1);
        assert_eq!(fs.cryptographer().calls.get(), 0);
        assert_eq!(fs.sender().calls(), 0);
    }

    #[test]
    fn test_signing_failure_skips_sender() {
        let fs = file_sender(
            CountingCryptographer {
                fail_with: Some("certificate expired"),
                ..Default::default()
            },
            CountingSender::default(),
        );
        let payloads = vec![fresh("a.json")];

        let outcomes = fs.send_files(&payloads, &credential());

        assert_eq!(
            outcomes[0].error(),
            Some("Can't prepare file to send: certificate expired")
        );
        assert_eq!(fs.cryptographer().calls.get(), 1);
        assert_eq!(fs.sender().calls(), 0);
    }

    #[test]
    fn test_signing_panic_is_contained() {
        let fs = file_sender(
            CountingCryptographer {
                panic: true,
                ..Default::default()
            },
            CountingSender::default(),
        );
        let payloads = vec![fresh("a.json"), fresh("b.json")];

        let outcomes = fs.send_files(&payloads, &credential());

        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(
                outcome.error(),
                Some("Can't prepare file to send: panicked: hsm unavailable")
            );
        }
        assert_eq!(fs.sender().calls(), 0);
    }

    #[test]
    fn test_send_failure_keeps_original_text() {
        let fs = file_sender(
            CountingCryptographer::default(),
            CountingSender {
                fail_with: Some("connection refused"),
                ..Default::default()
            },
        );
        let payloads = vec![fresh("a.json")];

        let outcomes = fs.send_files(&payloads, &credential());

        assert_eq!(outcomes[0].error(), Some("Can't send: connection refused"));
        assert_eq!(fs.cryptographer().calls.get(), 1);
        assert_eq!(fs.sender().calls(), 1);
    }

    #[test]
    fn test_mixed_batch_end_to_end() {
        let fs = default_sender();
        let payloads = vec![
            payload("bad-format.json", "1.0", now()),
            payload("too-old.json", "4.0", now() - Duration::days(60)),
            fresh("valid.json"),
        ];

        let report = fs.send_batch(&payloads, &credential());

        assert_eq!(report.received_count, 3);
        assert_eq!(report.sent_count, 1);
        assert_eq!(report.failed_count, 2);
        assert!(report.batch_id.starts_with("batch-"));

        let outcomes = &report.outcomes;
        assert_eq!(outcomes[0].payload().name, "bad-format.json");
        assert_eq!(
            outcomes[0].error(),
            Some("Can't prepare file to send: Invalid format version: 1.0")
        );
        assert_eq!(outcomes[1].payload().name, "too-old.json");
        assert!(outcomes[1]
            .error()
            .unwrap()
            .starts_with("Can't prepare file to send: Too old document, date of creation: "));
        assert_eq!(outcomes[2], Outcome::Sent { payload: &payloads[2] });

        assert_eq!(fs.recognizer().calls.get(), 3);
        assert_eq!(fs.cryptographer().calls.get(), 1);
        assert_eq!(fs.sender().calls(), 1);
    }

    #[test]
    fn test_failure_kind_survives_prefix() {
        let fs = default_sender();
        let payloads = vec![payload("bad.json", "9.9", now())];
        let doc_ctx = LogContext::new("batch-test").with_document("bad.json");

        let err = fs
            .prepare(&payloads[0], &credential(), &doc_ctx)
            .refine_error(PREPARE_CONTEXT)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatVersion);
    }

    #[test]
    fn test_clock_closure_is_read_per_document() {
        let reads = Cell::new(0);
        let clock = || {
            reads.set(reads.get() + 1);
            now()
        };
        let fs = FileSender::new(
            CountingRecognizer::default(),
            CountingCryptographer::default(),
            CountingSender::default(),
            clock,
            PipelineConfig::default(),
        );
        let payloads = vec![fresh("a.json"), fresh("b.json"), payload("x", "0.1", now())];

        fs.send_files(&payloads, &credential());

        // Once for the batch, once per document reaching the freshness stage.
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let fs = default_sender();
        let report = fs.send_batch(&[], &credential());
        assert_eq!(report.received_count, 0);
        assert!(report.outcomes.is_empty());
    }

    #[test]
    fn test_fault_from_recognizer_double() {
        struct Unreadable;
        impl Recognizer for Unreadable {
            fn recognize(&self, _payload: &RawPayload) -> anyhow::Result<Document> {
                Err(anyhow!("unsupported encoding"))
            }
        }

        let fs = FileSender::new(
            Unreadable,
            CountingCryptographer::default(),
            CountingSender::default(),
            FixedClock(now()),
            PipelineConfig::default(),
        );
        let payloads = vec![RawPayload::new("a", b"".to_vec())];

        let outcomes = fs.send_files(&payloads, &credential());
        assert_eq!(
            outcomes[0].error(),
            Some("Can't prepare file to send: unsupported encoding")
        );
    }
}
