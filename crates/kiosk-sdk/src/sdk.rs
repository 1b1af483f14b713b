//! `RootletSdk`: discovery and unlock-transfer behind one coordinator.
//!
//! Owns the kiosk backend and the deployment config. The wallet session is
//! passed into each unlock call, so one SDK value can serve several sessions.

use serde::Serialize;

use crate::chain::KioskBackend;
use crate::config::{DeploymentConfig, SubmissionPolicy};
use crate::discovery;
use crate::error::{Error, PipelineError, Result};
use crate::network::KioskRule;
use crate::ptb::GraphBuilder;
use crate::ptb::kiosk::append_unlock_transfer;
use crate::session::{ExecuteOptions, ExecutionReceipt, ExecutionStatus, WalletSession};
use crate::types::{FetchKioskOptions, MatchedAsset, ObjectId, SuiAddress};

// ── Results ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockResult {
    pub asset_id: ObjectId,
    pub kiosk_id: ObjectId,
    /// Digest of the last submission.
    pub digest: String,
    pub submissions: usize,
}

// ── Struct ──────────────────────────────────────────────────────────────────

pub struct RootletSdk<B: KioskBackend> {
    backend: B,
    config: DeploymentConfig,
}

impl<B: KioskBackend> RootletSdk<B> {
    pub fn new(backend: B, config: DeploymentConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn explorer_url(&self, asset_id: &ObjectId) -> String {
        self.config.explorer_object_url(asset_id)
    }

    // ── Discovery ───────────────────────────────────────────────────────────

    /// Every asset of the configured type held in `owner`'s personal kiosks.
    pub async fn discover_matching_assets(&self, owner: &SuiAddress) -> Result<Vec<MatchedAsset>> {
        self.discover_with_options(owner, FetchKioskOptions::scan()).await
    }

    /// Discovery with explicit kiosk fetch options, e.g. to read listing prices.
    pub async fn discover_with_options(
        &self,
        owner: &SuiAddress,
        options: FetchKioskOptions,
    ) -> Result<Vec<MatchedAsset>> {
        discovery::discover_with_options(
            &self.backend,
            owner,
            &self.config.target_type,
            self.config.page_limit,
            options,
        )
        .await
    }

    // ── Unlock ──────────────────────────────────────────────────────────────

    /// Rediscover the session's assets and move `asset_id` out of its personal
    /// kiosk to `destination`.
    ///
    /// Only the asset whose id equals `asset_id` gets a borrow/return block.
    /// Submissions follow the configured [`SubmissionPolicy`]; when nothing
    /// matched, the graph is still submitted and the run ends in
    /// [`PipelineError::NoMatchFound`].
    pub async fn unlock_and_transfer<W: WalletSession>(
        &self,
        session: &W,
        asset_id: &ObjectId,
        destination: &SuiAddress,
    ) -> std::result::Result<UnlockResult, PipelineError> {
        let owner = session.address();
        let assets = self
            .discover_matching_assets(&owner)
            .await
            .map_err(PipelineError::Discovery)?;

        let target = asset_id.clone();
        let mut builder = GraphBuilder::new();
        let mut unlocked: Option<&MatchedAsset> = None;
        let mut submissions = 0usize;
        let mut last_receipt: Option<ExecutionReceipt> = None;

        for asset in &assets {
            if unlocked.is_none() && asset.id == target {
                let package = self
                    .backend
                    .rule_package_id(KioskRule::PersonalKiosk)
                    .map_err(PipelineError::Discovery)?;
                append_unlock_transfer(
                    &mut builder,
                    asset,
                    &package,
                    &self.config.target_type,
                    destination,
                );
                unlocked = Some(asset);
                log::info!("unlock block for {target} in kiosk {}", asset.kiosk_id);
            }

            if self.config.submission_policy == SubmissionPolicy::PerIteratedAsset {
                last_receipt = Some(self.submit(session, &builder).await?);
                submissions += 1;
            }
        }

        if self.config.submission_policy == SubmissionPolicy::Once {
            last_receipt = Some(self.submit(session, &builder).await?);
            submissions += 1;
        }

        match (unlocked, last_receipt) {
            (Some(asset), Some(receipt)) => Ok(UnlockResult {
                asset_id: asset.id.clone(),
                kiosk_id: asset.kiosk_id.clone(),
                digest: receipt.digest,
                submissions,
            }),
            _ => {
                log::warn!("{target} not found among {} discovered asset(s)", assets.len());
                Err(PipelineError::NoMatchFound {
                    asset_id: target,
                    submissions,
                })
            }
        }
    }

    async fn submit<W: WalletSession>(
        &self,
        session: &W,
        builder: &GraphBuilder,
    ) -> std::result::Result<ExecutionReceipt, PipelineError> {
        let graph = builder
            .snapshot()
            .map_err(|e| PipelineError::Submission(Error::from(e)))?;
        let options = ExecuteOptions {
            show_object_changes: true,
        };
        let receipt = session
            .sign_and_execute(&graph, &options)
            .await
            .map_err(PipelineError::Submission)?;

        match &receipt.status {
            ExecutionStatus::Success => {
                log::debug!(
                    "submitted {} command(s), digest {}",
                    graph.commands().len(),
                    receipt.digest
                );
                Ok(receipt)
            }
            ExecutionStatus::Failure { error } => {
                Err(PipelineError::Submission(Error::ExecutionFailed {
                    digest: receipt.digest.clone(),
                    reason: error.clone(),
                }))
            }
        }
    }
}
