//! Python bindings.
//!
//! Exposes `send_files` running the pipeline with the reference
//! collaborators: JSON recognition, Ed25519 signing and an in-memory outbox
//! whose signed documents are returned to the caller.

use chrono::{DateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

use crate::config::PipelineConfig;
use crate::document::{JsonRecognizer, RawPayload};
use crate::logging::init_logger;
use crate::pipeline::FileSender;
use crate::security::{Credential, Ed25519Cryptographer};
use crate::transport::OutboxSender;

/// Validate, sign and dispatch a batch of files.
///
/// # Arguments
/// * `files` - List of (name, bytes) tuples
/// * `key_id` - Identifier of the signing key
/// * `secret_base64` - Base64-encoded 32-byte Ed25519 seed
/// * `now` - Optional RFC 3339 instant to validate freshness against
///
/// # Returns
/// Dict with batch_id, counts, per-file outcomes and the signed documents
#[pyfunction]
#[pyo3(signature = (files, key_id, secret_base64, now=None))]
fn send_files(
    py: Python<'_>,
    files: Vec<(String, Vec<u8>)>,
    key_id: String,
    secret_base64: String,
    now: Option<String>,
) -> PyResult<Py<PyAny>> {
    init_logger();

    let credential = Credential::from_base64(&key_id, &secret_base64).map_err(PyValueError::new_err)?;
    let config = PipelineConfig::from_env().map_err(|e| PyValueError::new_err(e.to_string()))?;

    let fixed_now = match now {
        Some(ts) => Some(
            DateTime::parse_from_rfc3339(&ts)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| PyValueError::new_err(format!("Invalid now {:?}: {}", ts, e)))?,
        ),
        None => None,
    };
    let clock = move || fixed_now.unwrap_or_else(Utc::now);

    let payloads: Vec<RawPayload> = files
        .into_iter()
        .map(|(name, content)| RawPayload::new(name, content))
        .collect();

    let file_sender = FileSender::new(
        JsonRecognizer,
        Ed25519Cryptographer,
        OutboxSender::new(),
        clock,
        config,
    );
    let report = file_sender.send_batch(&payloads, &credential);

    let py_result = PyDict::new(py);
    py_result.set_item("batch_id", &report.batch_id)?;
    py_result.set_item("received_count", report.received_count)?;
    py_result.set_item("sent_count", report.sent_count)?;
    py_result.set_item("failed_count", report.failed_count)?;

    let outcomes_list = PyList::empty(py);
    for outcome in &report.outcomes {
        let outcome_dict = PyDict::new(py);
        outcome_dict.set_item("name", &outcome.payload().name)?;
        outcome_dict.set_item("success", outcome.is_success())?;
        outcome_dict.set_item("error", outcome.error())?;
        outcomes_list.append(outcome_dict)?;
    }
    py_result.set_item("outcomes", outcomes_list)?;

    let delivered_list = PyList::empty(py);
    for document in file_sender.sender().drain() {
        delivered_list.append(PyBytes::new(py, &document.content))?;
    }
    py_result.set_item("delivered", delivered_list)?;

    Ok(py_result.into())
}

/// Python module definition
#[pymodule]
fn docdispatch_core(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(send_files, m)?)?;
    Ok(())
}
