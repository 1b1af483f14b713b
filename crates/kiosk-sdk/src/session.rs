use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ptb::TransactionGraph;
use crate::types::{ObjectId, SuiAddress};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    pub show_object_changes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    /// `transferred`, `mutated`, `created`, ...
    #[serde(rename = "type")]
    pub change_type: String,
    pub object_id: ObjectId,
    #[serde(default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub recipient: Option<SuiAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    pub digest: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
}

/// A connected wallet: the one thing allowed to sign and broadcast.
pub trait WalletSession: Sync {
    fn address(&self) -> SuiAddress;

    /// Sign and execute `graph` atomically.
    fn sign_and_execute(
        &self,
        graph: &TransactionGraph,
        options: &ExecuteOptions,
    ) -> impl Future<Output = Result<ExecutionReceipt>> + Send;
}
