use thiserror::Error;

use crate::ptb::linear::LinearityViolation;
use crate::types::ObjectId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("rpc transport error: {0}")]
    Rpc(String),

    #[error("rpc error {code}: {message}")]
    RpcResponse { code: i64, message: String },

    #[error("malformed rpc payload: {0}")]
    Decode(String),

    #[error("invalid sui address: {0}")]
    InvalidAddress(String),

    #[error("no {rule} package known for network {network}")]
    UnknownRulePackage { rule: &'static str, network: &'static str },

    #[error("page fetch failed: {0}")]
    PageSource(String),

    #[error("kiosk {kiosk_id} scan failed: {reason}")]
    KioskScan { kiosk_id: ObjectId, reason: String },

    #[error("transaction graph rejected: {0}")]
    Linearity(#[from] LinearityViolation),

    #[error("submission failed: {0}")]
    Submission(String),

    #[error("transaction {digest} executed with failure: {reason}")]
    ExecutionFailed { digest: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a whole discovery-and-unlock run, collapsed to the three
/// outcomes a caller can act on.
#[derive(Debug)]
pub enum PipelineError {
    /// An owned-cap page, a kiosk scan or the rule package lookup failed.
    Discovery(Error),
    /// No discovered asset carried the selected identity. The graph was still
    /// submitted `submissions` times without any borrow/return block.
    NoMatchFound { asset_id: ObjectId, submissions: usize },
    /// The graph failed the conformance check, or the wallet/network
    /// rejected it.
    Submission(Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Discovery(e) => write!(f, "discovery failed: {e}"),
            PipelineError::NoMatchFound {
                asset_id,
                submissions,
            } => write!(
                f,
                "no kiosk asset matches {asset_id} ({submissions} empty submission(s) issued)"
            ),
            PipelineError::Submission(e) => write!(f, "submission failed: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Discovery(e) | PipelineError::Submission(e) => Some(e),
            PipelineError::NoMatchFound { .. } => None,
        }
    }
}
