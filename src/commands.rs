use serde::Serialize;

use kiosk_sdk::{DeploymentConfig, KioskBackend, MatchedAsset, ObjectId, SuiAddress};

use crate::dry_run::{DryRunRecord, DryRunSession};
use crate::state::{FlowController, FlowOutcome};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockReport {
    /// Set for every report built on [`DryRunSession`]: the graphs were
    /// checked and recorded, never signed or broadcast.
    pub dry_run: bool,
    pub outcome: FlowOutcome,
    pub submissions: Vec<DryRunRecord>,
}

fn parse_address(address: &str) -> Result<SuiAddress, String> {
    address
        .parse()
        .map_err(|e: kiosk_sdk::Error| format!("invalid wallet address: {e}"))
}

fn parse_asset_id(asset_id: &str) -> Result<ObjectId, String> {
    let trimmed = asset_id.trim();
    if trimmed.is_empty() {
        return Err("asset id must not be empty".to_string());
    }
    Ok(ObjectId::from(trimmed))
}

pub async fn discover_assets<B: KioskBackend>(
    flow: &FlowController<B>,
    address: &str,
    listing_prices: bool,
) -> Result<Vec<MatchedAsset>, String> {
    let owner = parse_address(address)?;
    flow.discover(&owner, listing_prices)
        .await
        .map_err(|e| format!("discovery failed: {e}"))
}

/// Select `asset_id` and run the flow as `address` without signing.
pub async fn unlock_asset<B: KioskBackend>(
    flow: &FlowController<B>,
    address: &str,
    asset_id: &str,
) -> Result<UnlockReport, String> {
    let owner = parse_address(address)?;
    let target = parse_asset_id(asset_id)?;
    let session = DryRunSession::new(owner);

    flow.reset();
    flow.select(target);
    let outcome = flow.run(&session).await;
    log::info!(
        "dry run: {} graph(s) recorded, nothing signed or broadcast",
        session.records().len()
    );

    Ok(UnlockReport {
        dry_run: true,
        outcome,
        submissions: session.records(),
    })
}

pub fn explorer_link(config: &DeploymentConfig, asset_id: &str) -> Result<String, String> {
    let id = parse_asset_id(asset_id)?;
    Ok(config.explorer_object_url(&id))
}
