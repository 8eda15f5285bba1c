//! Drives [`ScanFlow`] against the API.
//!
//! A submission retries transport failures on the configured delays with
//! the same ticket, so the recorder sees one `client_request_id` however
//! many attempts it takes. Server rejections are final and never retried.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use vocatrack_core::scan_flow::{
    ReadResult, ScanFlow, ScanFlowError, ScanReceipt, ScanState, SubmitOutcome, SubmitTicket,
};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Something that can record a scan.
#[async_trait]
pub trait ScanSubmitter: Send + Sync {
    async fn submit(&self, ticket: &SubmitTicket) -> Result<ScanReceipt, ClientError>;
}

#[async_trait]
impl ScanSubmitter for ApiClient {
    async fn submit(&self, ticket: &SubmitTicket) -> Result<ScanReceipt, ClientError> {
        self.submit_scan(&ticket.token, ticket.request_id).await
    }
}

pub struct Scanner<S> {
    submitter: S,
    flow: ScanFlow,
    retry_delays: Vec<Duration>,
    attempt_timeout: Duration,
}

impl<S: ScanSubmitter> Scanner<S> {
    pub fn new(submitter: S, config: &ClientConfig) -> Self {
        Self {
            submitter,
            flow: ScanFlow::default(),
            retry_delays: config.scan_retry_delays.clone(),
            attempt_timeout: config.request_timeout,
        }
    }

    /// Return accepted results to idle after `delay`; see [`Scanner::tick`].
    pub fn with_auto_dismiss(mut self, delay: chrono::Duration) -> Self {
        self.flow = ScanFlow::new(Some(delay));
        self
    }

    pub fn state(&self) -> &ScanState {
        self.flow.state()
    }

    pub fn read(&mut self, payload: &str) -> Result<ReadResult, ScanFlowError> {
        self.flow.read(payload)
    }

    /// Submit the code read last and wait for the final outcome.
    pub async fn submit(&mut self) -> Result<&ScanState, ScanFlowError> {
        let ticket = self.flow.begin_submit()?;
        self.drive(ticket).await
    }

    /// Resubmit a failed scan under its original request id.
    pub async fn retry(&mut self) -> Result<&ScanState, ScanFlowError> {
        let ticket = self.flow.retry()?;
        self.drive(ticket).await
    }

    pub fn acknowledge(&mut self) -> Result<(), ScanFlowError> {
        self.flow.acknowledge()
    }

    pub fn rescan(&mut self) -> Result<(), ScanFlowError> {
        self.flow.rescan()
    }

    pub fn tick(&mut self) -> bool {
        self.flow.tick(Utc::now())
    }

    async fn drive(&mut self, ticket: SubmitTicket) -> Result<&ScanState, ScanFlowError> {
        let outcome = self.attempt(&ticket).await;
        self.flow.resolve(ticket.request_id, outcome, Utc::now())?;
        Ok(self.flow.state())
    }

    async fn attempt(&self, ticket: &SubmitTicket) -> SubmitOutcome {
        let mut delays = self.retry_delays.iter();
        let mut attempt = 1_u32;

        loop {
            let result =
                match tokio::time::timeout(self.attempt_timeout, self.submitter.submit(ticket))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ClientError::Timeout),
                };

            let err = match result {
                Ok(receipt) => {
                    tracing::info!(
                        request_id = %ticket.request_id,
                        attempt,
                        replayed = receipt.replayed,
                        "Scan accepted"
                    );
                    return SubmitOutcome::Accepted(receipt);
                }
                Err(ClientError::Api {
                    reason: Some(reason),
                    message,
                    ..
                }) => {
                    tracing::info!(request_id = %ticket.request_id, %reason, "Scan rejected");
                    return SubmitOutcome::Rejected { reason, message };
                }
                Err(err) => err,
            };

            match delays.next() {
                Some(delay) if err.is_retryable() => {
                    tracing::warn!(
                        request_id = %ticket.request_id,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Scan submission failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                    attempt += 1;
                }
                _ => {
                    tracing::warn!(
                        request_id = %ticket.request_id,
                        attempt,
                        error = %err,
                        "Scan submission failed"
                    );
                    return SubmitOutcome::TransportFailed {
                        message: err.user_message(),
                    };
                }
            }
        }
    }
}
