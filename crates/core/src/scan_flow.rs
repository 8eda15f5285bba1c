//! Client-side scan submission state machine.
//!
//! ```text
//! Idle --read--> Scanning --begin_submit--> Submitting --resolve--> Accepted --acknowledge/tick--> Idle
//!                                                   |            \-> Rejected --rescan--> Idle
//!                                                   |             \-> Failed --retry--> Submitting
//!                                                   \-- read/begin_submit while in flight: SubmissionInFlight
//! ```
//!
//! The machine never talks to the network. A driver (see the
//! `vocatrack-client` scanner) calls [`ScanFlow::begin_submit`], performs the
//! request with the returned [`SubmitTicket`], and feeds the outcome back via
//! [`ScanFlow::resolve`]. The ticket's `request_id` doubles as the
//! idempotency key, so retrying a failed submission can never record a
//! second scan.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::attendance::remaining_scans;
use crate::qr_token::{extract_token, PayloadError};
use crate::scan_rejection::ScanRejection;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One submission attempt for one physical scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub request_id: Uuid,
    pub token: String,
}

/// What the recorder returns for an accepted scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanReceipt {
    pub scan_id: DbId,
    pub points_awarded: i32,
    pub created_at: Timestamp,
    pub completed_count: i32,
    pub required_count: i32,
    /// True when the recorder returned an earlier result for the same request id.
    #[serde(default)]
    pub replayed: bool,
}

impl ScanReceipt {
    /// Scans still needed today (`required - completed`, never negative).
    pub fn remaining_today(&self) -> i32 {
        remaining_scans(self.completed_count, self.required_count)
    }
}

/// Result of one submission, as interpreted by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(ScanReceipt),
    Rejected {
        reason: ScanRejection,
        message: String,
    },
    /// The driver could not learn whether the scan was recorded.
    TransportFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning {
        token: String,
    },
    Submitting {
        ticket: SubmitTicket,
    },
    Accepted {
        receipt: ScanReceipt,
        since: Timestamp,
    },
    Rejected {
        reason: ScanRejection,
        message: String,
    },
    Failed {
        ticket: SubmitTicket,
        message: String,
    },
}

impl ScanState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning { .. } => "scanning",
            Self::Submitting { .. } => "submitting",
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanFlowError {
    #[error("Invalid code: {0}")]
    InvalidCode(#[from] PayloadError),

    #[error("A submission for this scan is already in flight")]
    SubmissionInFlight,

    #[error("No scanned code to submit")]
    NothingToSubmit,

    #[error("Outcome does not belong to the pending submission")]
    StaleOutcome,

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

/// What happened to a payload handed to [`ScanFlow::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// The payload is ready to submit.
    Ready,
    /// The camera re-read the payload that was just rejected. Ignored.
    IgnoredStale,
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScanFlow {
    state: ScanState,
    auto_dismiss: Option<Duration>,
    /// Token of the last rejected scan, ignored until a different one is read.
    stale_token: Option<String>,
}

impl Default for ScanFlow {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ScanFlow {
    /// `auto_dismiss` returns an accepted scan to idle after the given delay.
    pub fn new(auto_dismiss: Option<Duration>) -> Self {
        Self {
            state: ScanState::Idle,
            auto_dismiss,
            stale_token: None,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, ScanState::Submitting { .. })
    }

    /// Accept a payload decoded by the camera.
    ///
    /// Malformed payloads leave the machine in `Idle` and never reach the
    /// network.
    pub fn read(&mut self, payload: &str) -> Result<ReadResult, ScanFlowError> {
        match &self.state {
            ScanState::Idle | ScanState::Scanning { .. } => {}
            ScanState::Submitting { .. } => return Err(ScanFlowError::SubmissionInFlight),
            other => {
                return Err(ScanFlowError::InvalidTransition {
                    state: other.name(),
                    action: "read a code",
                })
            }
        }

        let token = match extract_token(payload) {
            Ok(token) => token,
            Err(e) => {
                self.state = ScanState::Idle;
                return Err(e.into());
            }
        };

        if self.stale_token.as_deref() == Some(token.as_str()) {
            self.state = ScanState::Idle;
            return Ok(ReadResult::IgnoredStale);
        }

        self.stale_token = None;
        self.state = ScanState::Scanning { token };
        Ok(ReadResult::Ready)
    }

    /// Move to `Submitting` and hand out the ticket for the request.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, ScanFlowError> {
        match &self.state {
            ScanState::Scanning { token } => {
                let ticket = SubmitTicket {
                    request_id: Uuid::new_v4(),
                    token: token.clone(),
                };
                self.state = ScanState::Submitting {
                    ticket: ticket.clone(),
                };
                Ok(ticket)
            }
            ScanState::Submitting { .. } => Err(ScanFlowError::SubmissionInFlight),
            _ => Err(ScanFlowError::NothingToSubmit),
        }
    }

    /// Feed back the outcome for a ticket. Outcomes for other tickets are refused.
    pub fn resolve(
        &mut self,
        request_id: Uuid,
        outcome: SubmitOutcome,
        now: Timestamp,
    ) -> Result<(), ScanFlowError> {
        let ticket = match &self.state {
            ScanState::Submitting { ticket } if ticket.request_id == request_id => ticket.clone(),
            _ => return Err(ScanFlowError::StaleOutcome),
        };

        self.state = match outcome {
            SubmitOutcome::Accepted(receipt) => ScanState::Accepted {
                receipt,
                since: now,
            },
            SubmitOutcome::Rejected { reason, message } => {
                self.stale_token = Some(ticket.token);
                ScanState::Rejected { reason, message }
            }
            SubmitOutcome::TransportFailed { message } => ScanState::Failed { ticket, message },
        };
        Ok(())
    }

    /// Close the result view of an accepted scan.
    pub fn acknowledge(&mut self) -> Result<(), ScanFlowError> {
        match self.state {
            ScanState::Accepted { .. } => {
                self.state = ScanState::Idle;
                Ok(())
            }
            ref other => Err(ScanFlowError::InvalidTransition {
                state: other.name(),
                action: "acknowledge",
            }),
        }
    }

    /// Apply the auto-dismiss timeout. Returns `true` if the state changed.
    pub fn tick(&mut self, now: Timestamp) -> bool {
        let (Some(delay), ScanState::Accepted { since, .. }) = (self.auto_dismiss, &self.state)
        else {
            return false;
        };
        if now - *since >= delay {
            self.state = ScanState::Idle;
            return true;
        }
        false
    }

    /// Leave a rejected or failed scan and resume live scanning.
    ///
    /// The rejected token stays suppressed so a camera still pointed at the
    /// same code does not resubmit it.
    pub fn rescan(&mut self) -> Result<(), ScanFlowError> {
        match self.state {
            ScanState::Rejected { .. } | ScanState::Failed { .. } => {
                self.state = ScanState::Idle;
                Ok(())
            }
            ref other => Err(ScanFlowError::InvalidTransition {
                state: other.name(),
                action: "rescan",
            }),
        }
    }

    /// Resubmit a failed attempt with the same idempotency key.
    pub fn retry(&mut self) -> Result<SubmitTicket, ScanFlowError> {
        match &self.state {
            ScanState::Failed { ticket, .. } => {
                let ticket = ticket.clone();
                self.state = ScanState::Submitting {
                    ticket: ticket.clone(),
                };
                Ok(ticket)
            }
            other => Err(ScanFlowError::InvalidTransition {
                state: other.name(),
                action: "retry",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn receipt() -> ScanReceipt {
        ScanReceipt {
            scan_id: 1,
            points_awarded: 2,
            created_at: Utc::now(),
            completed_count: 1,
            required_count: 3,
            replayed: false,
        }
    }

    fn submitting(flow: &mut ScanFlow) -> SubmitTicket {
        flow.read("token-abc").unwrap();
        flow.begin_submit().unwrap()
    }

    #[test]
    fn happy_path_returns_to_idle() {
        let mut flow = ScanFlow::default();
        let ticket = submitting(&mut flow);
        assert!(flow.is_submitting());

        flow.resolve(ticket.request_id, SubmitOutcome::Accepted(receipt()), Utc::now())
            .unwrap();
        assert_matches!(flow.state(), ScanState::Accepted { receipt, .. } if receipt.remaining_today() == 2);

        flow.acknowledge().unwrap();
        assert_eq!(flow.state(), &ScanState::Idle);
    }

    #[test]
    fn malformed_payload_stays_idle() {
        let mut flow = ScanFlow::default();
        assert_matches!(flow.read("   "), Err(ScanFlowError::InvalidCode(PayloadError::Empty)));
        assert_eq!(flow.state(), &ScanState::Idle);
        assert_matches!(flow.begin_submit(), Err(ScanFlowError::NothingToSubmit));
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut flow = ScanFlow::default();
        submitting(&mut flow);
        assert_matches!(flow.begin_submit(), Err(ScanFlowError::SubmissionInFlight));
        assert_matches!(flow.read("token-abc"), Err(ScanFlowError::SubmissionInFlight));
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut flow = ScanFlow::default();
        submitting(&mut flow);
        let result = flow.resolve(Uuid::new_v4(), SubmitOutcome::Accepted(receipt()), Utc::now());
        assert_matches!(result, Err(ScanFlowError::StaleOutcome));
        assert!(flow.is_submitting());
    }

    #[test]
    fn rejected_token_is_suppressed_after_rescan() {
        let mut flow = ScanFlow::default();
        let ticket = submitting(&mut flow);
        flow.resolve(
            ticket.request_id,
            SubmitOutcome::Rejected {
                reason: ScanRejection::ExpiredToken,
                message: "expired".into(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_matches!(flow.state(), ScanState::Rejected { reason: ScanRejection::ExpiredToken, .. });
        assert_matches!(flow.read("token-abc"), Err(ScanFlowError::InvalidTransition { .. }));

        flow.rescan().unwrap();
        assert_eq!(flow.read("token-abc").unwrap(), ReadResult::IgnoredStale);
        assert_eq!(flow.state(), &ScanState::Idle);

        assert_eq!(flow.read("token-new").unwrap(), ReadResult::Ready);
        assert_matches!(flow.state(), ScanState::Scanning { token } if token == "token-new");
    }

    #[test]
    fn failed_submission_retries_with_same_request_id() {
        let mut flow = ScanFlow::default();
        let ticket = submitting(&mut flow);
        flow.resolve(
            ticket.request_id,
            SubmitOutcome::TransportFailed {
                message: "timeout".into(),
            },
            Utc::now(),
        )
        .unwrap();
        assert_matches!(flow.state(), ScanState::Failed { .. });

        let retried = flow.retry().unwrap();
        assert_eq!(retried, ticket);
        assert!(flow.is_submitting());
    }

    #[test]
    fn auto_dismiss_after_delay() {
        let mut flow = ScanFlow::new(Some(Duration::seconds(5)));
        let ticket = submitting(&mut flow);
        let accepted_at = Utc::now();
        flow.resolve(ticket.request_id, SubmitOutcome::Accepted(receipt()), accepted_at)
            .unwrap();

        assert!(!flow.tick(accepted_at + Duration::seconds(4)));
        assert!(flow.tick(accepted_at + Duration::seconds(5)));
        assert_eq!(flow.state(), &ScanState::Idle);
    }

    #[test]
    fn no_auto_dismiss_without_delay() {
        let mut flow = ScanFlow::default();
        let ticket = submitting(&mut flow);
        let now = Utc::now();
        flow.resolve(ticket.request_id, SubmitOutcome::Accepted(receipt()), now)
            .unwrap();
        assert!(!flow.tick(now + Duration::hours(1)));
    }

    #[test]
    fn acknowledge_requires_accepted() {
        let mut flow = ScanFlow::default();
        assert_matches!(
            flow.acknowledge(),
            Err(ScanFlowError::InvalidTransition { state: "idle", .. })
        );
    }

    #[test]
    fn remaining_never_negative() {
        let mut r = receipt();
        r.completed_count = 5;
        assert_eq!(r.remaining_today(), 0);
    }
}
