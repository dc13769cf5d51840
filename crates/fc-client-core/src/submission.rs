//! Prepare, submit and confirm lifecycle shared by both forms.

use fc_registry::PreparedTx;
use fc_types::{PendingTransaction, TxHash, TxStatus};
use tracing::{debug, warn};

use crate::error::FlowError;

pub const PROCESSING: &str = "Processing…";
pub const SUCCESS: &str = "Success!";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preparation {
    /// Inputs are incomplete; nothing to simulate.
    #[default]
    Idle,
    Preparing(u64),
    Ready(PreparedTx),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Attempt {
    #[default]
    Idle,
    Sending,
    Pending(PendingTransaction),
    Confirmed(TxHash),
    Failed(FlowError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingInput,
    ReadyToSubmit,
    Submitting,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One line of inline feedback under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusLine {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Submission state owned by a single form.
///
/// At most one transaction is in flight; preparations are numbered so a
/// simulation that finishes after the inputs changed again is ignored.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    preparation: Preparation,
    generation: u64,
    attempt: Attempt,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preparation(&self) -> &Preparation {
        &self.preparation
    }

    /// Inputs became incomplete: drop any pending simulation.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.preparation = Preparation::Idle;
    }

    /// Back to collecting input. Preparation numbers keep increasing, so a
    /// simulation started before the reset can never be taken as current.
    pub fn reset(&mut self) {
        self.invalidate();
        self.attempt = Attempt::Idle;
    }

    /// Starts a new simulation and returns its number.
    pub fn begin_prepare(&mut self) -> u64 {
        self.generation += 1;
        self.preparation = Preparation::Preparing(self.generation);
        self.generation
    }

    /// Returns `false` when the simulation was superseded.
    pub fn finish_prepare(&mut self, generation: u64, result: Result<PreparedTx, FlowError>) -> bool {
        if self.preparation != Preparation::Preparing(generation) {
            debug!(generation, "dropping superseded preparation");
            return false;
        }
        self.preparation = match result {
            Ok(tx) => Preparation::Ready(tx),
            Err(err) => {
                debug!(generation, error = %err, "preparation failed");
                Preparation::Failed(err.to_string())
            }
        };
        true
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.attempt, Attempt::Sending | Attempt::Pending(_))
    }

    pub fn can_submit(&self) -> bool {
        matches!(self.preparation, Preparation::Ready(_)) && !self.is_busy()
    }

    /// Takes the prepared transaction for signing, or nothing if submission
    /// is not currently allowed.
    pub fn begin_submit(&mut self) -> Option<PreparedTx> {
        if !self.can_submit() {
            return None;
        }
        let Preparation::Ready(tx) = &self.preparation else {
            return None;
        };
        let tx = tx.clone();
        self.attempt = Attempt::Sending;
        Some(tx)
    }

    pub fn finish_submit(&mut self, result: Result<TxHash, FlowError>) {
        if self.attempt != Attempt::Sending {
            return;
        }
        self.attempt = match result {
            Ok(hash) => Attempt::Pending(PendingTransaction {
                hash,
                status: TxStatus::Pending,
            }),
            Err(err) => {
                warn!(detail = %err.detail(), "transaction was not sent");
                Attempt::Failed(err)
            }
        };
    }

    /// Hash of the transaction awaiting inclusion.
    pub fn pending_hash(&self) -> Option<TxHash> {
        match &self.attempt {
            Attempt::Pending(pending) => Some(pending.hash),
            _ => None,
        }
    }

    /// Records a receipt poll. Returns `true` when this settled the
    /// transaction as confirmed.
    pub fn record_status(&mut self, hash: &TxHash, status: TxStatus) -> bool {
        if self.pending_hash().as_ref() != Some(hash) {
            return false;
        }
        match status {
            TxStatus::Pending => false,
            TxStatus::Confirmed => {
                self.attempt = Attempt::Confirmed(*hash);
                true
            }
            TxStatus::Failed => {
                let err = FlowError::ConfirmationFailed(*hash);
                warn!(detail = %err.detail(), "transaction failed on chain");
                self.attempt = Attempt::Failed(err);
                false
            }
        }
    }

    pub fn error(&self) -> Option<&FlowError> {
        match &self.attempt {
            Attempt::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.attempt {
            Attempt::Sending | Attempt::Pending(_) => Phase::Submitting,
            Attempt::Confirmed(_) => Phase::Confirmed,
            Attempt::Failed(_) => Phase::Failed,
            Attempt::Idle if matches!(self.preparation, Preparation::Ready(_)) => {
                Phase::ReadyToSubmit
            }
            Attempt::Idle => Phase::CollectingInput,
        }
    }

    pub fn status_lines(&self) -> Vec<StatusLine> {
        let mut lines = Vec::new();
        if let Preparation::Failed(message) = &self.preparation {
            lines.push(StatusLine::new(StatusKind::Error, message.as_str()));
        }
        match &self.attempt {
            Attempt::Idle => {}
            Attempt::Sending | Attempt::Pending(_) => {
                lines.push(StatusLine::new(StatusKind::Info, PROCESSING));
            }
            Attempt::Confirmed(_) => lines.push(StatusLine::new(StatusKind::Success, SUCCESS)),
            Attempt::Failed(err) => lines.push(StatusLine::new(StatusKind::Error, err.to_string())),
        }
        lines
    }
}
