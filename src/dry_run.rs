//! Wallet session that stops short of signing.
//!
//! Each graph handed to it is checked for conformance, serialized, and
//! fingerprinted with sha256. The unsigned JSON is kept so the CLI can print
//! exactly what a wallet would have been asked to sign.

use std::sync::Mutex;

use serde::Serialize;
use sha2::{Digest, Sha256};

use kiosk_sdk::{
    Error, ExecuteOptions, ExecutionReceipt, ExecutionStatus, SuiAddress, TransactionGraph,
    WalletSession,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunRecord {
    pub digest: String,
    pub commands: usize,
    pub graph: serde_json::Value,
}

pub struct DryRunSession {
    address: SuiAddress,
    records: Mutex<Vec<DryRunRecord>>,
}

impl DryRunSession {
    pub fn new(address: SuiAddress) -> Self {
        Self {
            address,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<DryRunRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| {
                log::error!("dry-run record lock poisoned");
                poisoned.into_inner()
            })
            .clone()
    }
}

fn graph_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl WalletSession for DryRunSession {
    fn address(&self) -> SuiAddress {
        self.address
    }

    async fn sign_and_execute(
        &self,
        graph: &TransactionGraph,
        _options: &ExecuteOptions,
    ) -> kiosk_sdk::Result<ExecutionReceipt> {
        graph.verify()?;

        let bytes = serde_json::to_vec(graph).map_err(|e| Error::Submission(e.to_string()))?;
        let digest = graph_digest(&bytes);
        let json = serde_json::to_value(graph).map_err(|e| Error::Submission(e.to_string()))?;
        log::info!(
            "dry run: {} command(s), sha256 {digest}",
            graph.commands().len()
        );

        self.records
            .lock()
            .map_err(|_| Error::Submission("dry-run record lock poisoned".into()))?
            .push(DryRunRecord {
                digest: digest.clone(),
                commands: graph.commands().len(),
                graph: json,
            });

        Ok(ExecutionReceipt {
            digest,
            status: ExecutionStatus::Success,
            object_changes: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_sdk::testing::owner;
    use kiosk_sdk::{
        DESTINATION_ADDRESS, GraphBuilder, KioskRule, MatchedAsset, Network, ObjectId,
        ROOTLET_TYPE, append_unlock_transfer,
    };

    fn unlock_graph() -> TransactionGraph {
        let asset = MatchedAsset {
            id: ObjectId::from("0xA1"),
            listing: None,
            kiosk_id: ObjectId::from("0xkA"),
            personal_kiosk_cap_id: ObjectId::from("0xcapA"),
        };
        let package = Network::Mainnet
            .rule_package_id(KioskRule::PersonalKiosk)
            .unwrap();
        let mut builder = GraphBuilder::new();
        append_unlock_transfer(&mut builder, &asset, &package, ROOTLET_TYPE, &DESTINATION_ADDRESS);
        builder.finish().unwrap()
    }

    #[tokio::test]
    async fn digest_is_stable_for_the_same_graph() {
        let session = DryRunSession::new(owner());
        let graph = unlock_graph();
        let first = session
            .sign_and_execute(&graph, &ExecuteOptions::default())
            .await
            .unwrap();
        let second = session
            .sign_and_execute(&graph, &ExecuteOptions::default())
            .await
            .unwrap();

        assert_eq!(first.digest, second.digest);
        assert_eq!(first.digest.len(), 64);
        let records = session.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].commands, 5);
        assert_eq!(records[0].graph["version"], 1);
    }

    #[tokio::test]
    async fn unbalanced_graph_is_not_recorded() {
        let session = DryRunSession::new(owner());
        let mut builder = GraphBuilder::new();
        let _ = kiosk_sdk::personal_kiosk_borrow(
            &mut builder,
            &ObjectId::from("0xpk"),
            &ObjectId::from("0xcapA"),
        );
        let graph = builder.finish_unchecked();

        let result = session
            .sign_and_execute(&graph, &ExecuteOptions::default())
            .await;
        assert!(matches!(result, Err(Error::Linearity(_))));
        assert!(session.records().is_empty());
    }
}
