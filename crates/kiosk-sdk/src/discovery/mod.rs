//! Wallet → personal kiosk cap → kiosk → Rootlet discovery.
//!
//! The stages run strictly in order: the owned-cap index is paged to
//! completion, narrowed to personal caps, each cap's kiosk is scanned, and
//! the scanned items are joined back to their caps and filtered by type.

pub mod matcher;
pub mod pager;
pub mod reconcile;
pub mod scan;

use crate::chain::KioskBackend;
use crate::error::Result;
use crate::types::{FetchKioskOptions, MatchedAsset, SuiAddress};

pub use matcher::{join_items_to_caps, match_assets};
pub use pager::{PageSource, Pager};
pub use reconcile::{OwnedCaps, personal_caps, reconcile_personal_caps};
pub use scan::{ScannedKiosk, scan_kiosks};

/// Every asset of `target_type` held in a personal kiosk of `owner`.
pub async fn discover_matching_assets<B: KioskBackend>(
    backend: &B,
    owner: &SuiAddress,
    target_type: &str,
    page_limit: u32,
) -> Result<Vec<MatchedAsset>> {
    discover_with_options(
        backend,
        owner,
        target_type,
        page_limit,
        FetchKioskOptions::scan(),
    )
    .await
}

/// Same as [`discover_matching_assets`], with the kiosk fetch options spelled
/// out. Listing prices only show up on matches when `options` asks for them.
pub async fn discover_with_options<B: KioskBackend>(
    backend: &B,
    owner: &SuiAddress,
    target_type: &str,
    page_limit: u32,
    options: FetchKioskOptions,
) -> Result<Vec<MatchedAsset>> {
    let caps = reconcile_personal_caps(backend, owner, page_limit).await?;
    let scanned = scan_kiosks(backend, caps, options).await?;
    let matched = match_assets(&scanned, target_type);
    log::info!(
        "{owner}: {} matching asset(s) across {} personal kiosk(s)",
        matched.len(),
        scanned.len()
    );
    Ok(matched)
}
