use fc_types::TxHash;

/// Why a registry submission did not go through.
///
/// `Display` is the text shown next to the form: preparation failures keep
/// the node's own message, later stages collapse to a generic line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    Preparation(String),
    #[error("Transaction error")]
    Submission(String),
    #[error("Transaction error")]
    ConfirmationFailed(TxHash),
    /// Never shown: an unreadable account reads as unregistered.
    #[error("account data unavailable")]
    ReadUnavailable,
}

impl FlowError {
    /// Detail for logs; the user-facing text is `Display`.
    pub fn detail(&self) -> String {
        match self {
            FlowError::Submission(detail) => detail.clone(),
            FlowError::ConfirmationFailed(hash) => format!("transaction {hash} reverted"),
            other => other.to_string(),
        }
    }
}
