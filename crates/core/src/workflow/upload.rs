use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::upload::{ExportFile, UploadReport, PREVIEW_ROWS};
use crate::gateway::AnalysisGateway;
use crate::workflow::WorkflowError;

const SELECT_INVALID_MESSAGE: &str = "Please select a valid CSV file";
const SELECT_MISSING_MESSAGE: &str = "Please select a file first";
const UPLOAD_FALLBACK: &str = "Failed to upload CSV";

/// Result of a submit call.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Completed(UploadReport),
    /// Another submit was already in flight; this one was ignored.
    Busy,
}

#[derive(Debug, Default)]
struct UploadState {
    selected: Option<Arc<ExportFile>>,
    report: Option<UploadReport>,
    error: Option<String>,
}

/// Owns file selection and submission. While an upload is in flight, further
/// submits are ignored rather than queued, so a double-trigger can never
/// produce two ingests.
pub struct UploadCoordinator {
    gateway: Arc<dyn AnalysisGateway>,
    state: Mutex<UploadState>,
    in_flight: AtomicBool,
}

impl UploadCoordinator {
    pub fn new(gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(UploadState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Accept a candidate file. A non-CSV name is rejected and the previous
    /// selection, if any, stays in place.
    pub async fn select(&self, file: ExportFile) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        if !file.is_csv() {
            let name = file.name;
            state.error = Some(SELECT_INVALID_MESSAGE.to_string());
            tracing::debug!(file = %name, "rejected non-csv selection");
            return Err(WorkflowError::InvalidFileType { name });
        }
        tracing::debug!(file = %file.name, size = file.bytes.len(), "file selected");
        state.selected = Some(Arc::new(file));
        state.error = None;
        Ok(())
    }

    /// Upload the selected file and replace the held report wholesale.
    pub async fn submit(&self) -> Result<UploadOutcome, WorkflowError> {
        let file = {
            let mut state = self.state.lock().await;
            match &state.selected {
                Some(file) => Arc::clone(file),
                None => {
                    state.error = Some(SELECT_MISSING_MESSAGE.to_string());
                    return Err(WorkflowError::Precondition(
                        SELECT_MISSING_MESSAGE.to_string(),
                    ));
                }
            }
        };

        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!(file = %file.name, "upload already in flight; ignoring submit");
            return Ok(UploadOutcome::Busy);
        }
        let _reset = InFlightReset(&self.in_flight);

        match self.gateway.upload_csv(&file).await {
            Ok(mut report) => {
                report.preview.truncate(PREVIEW_ROWS);
                tracing::info!(
                    file = %file.name,
                    cleaned = report.cleaned_rows,
                    dropped = report.dropped_rows,
                    merged = report.duplicates_merged,
                    "upload processed"
                );
                let mut state = self.state.lock().await;
                state.report = Some(report.clone());
                state.error = None;
                Ok(UploadOutcome::Completed(report))
            }
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "upload failed");
                let message = err.display_message(UPLOAD_FALLBACK);
                let mut state = self.state.lock().await;
                state.error = Some(message);
                Err(err.into())
            }
        }
    }

    /// Select and submit the bundled demo dataset through the exact same path
    /// a user-picked file takes.
    pub async fn load_sample(&self) -> Result<UploadOutcome, WorkflowError> {
        self.select(ExportFile::bundled_sample()).await?;
        self.submit().await
    }

    pub async fn selected_name(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.selected.as_ref().map(|file| file.name.clone())
    }

    pub async fn report(&self) -> Option<UploadReport> {
        self.state.lock().await.report.clone()
    }

    pub async fn has_report(&self) -> bool {
        self.state.lock().await.report.is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }
}

/// Clears the in-flight flag when the submit future finishes or is dropped.
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
