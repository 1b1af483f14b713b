use std::collections::HashMap;

use crate::types::{KioskItem, KioskOwnerCap, MatchedAsset, ObjectId};

use super::scan::ScannedKiosk;

/// Join items to the caps controlling their kiosks, keyed by kiosk id.
///
/// Items whose kiosk is not controlled by any of `caps` are dropped.
pub fn join_items_to_caps<'a>(
    caps: impl IntoIterator<Item = &'a KioskOwnerCap>,
    items: impl IntoIterator<Item = &'a KioskItem>,
) -> Vec<(&'a KioskItem, &'a KioskOwnerCap)> {
    let by_kiosk: HashMap<&ObjectId, &KioskOwnerCap> =
        caps.into_iter().map(|cap| (&cap.kiosk_id, cap)).collect();

    items
        .into_iter()
        .filter_map(|item| match by_kiosk.get(&item.kiosk_id) {
            Some(cap) => Some((item, *cap)),
            None => {
                log::warn!(
                    "item {} names kiosk {} which no held cap controls",
                    item.object_id,
                    item.kiosk_id
                );
                None
            }
        })
        .collect()
}

/// Every item of exactly `target_type` across the scanned kiosks, ordered by
/// asset id so the result does not depend on page or scan order.
pub fn match_assets(scanned: &[ScannedKiosk], target_type: &str) -> Vec<MatchedAsset> {
    let caps = scanned.iter().map(|s| &s.cap);
    let items = scanned
        .iter()
        .flat_map(|s| s.contents.items.iter())
        .filter(|item| item.item_type == target_type);

    let mut matched: Vec<MatchedAsset> = join_items_to_caps(caps, items)
        .into_iter()
        .map(|(item, cap)| MatchedAsset {
            id: item.object_id.clone(),
            listing: item.listing.clone(),
            kiosk_id: item.kiosk_id.clone(),
            personal_kiosk_cap_id: cap.object_id.clone(),
        })
        .collect();
    matched.sort_by(|a, b| a.id.cmp(&b.id));
    matched
}
