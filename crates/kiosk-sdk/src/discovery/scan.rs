use crate::chain::KioskBackend;
use crate::error::{Error, Result};
use crate::types::{FetchKioskOptions, KioskContents, KioskOwnerCap};

/// A kiosk's contents together with the cap it was reached through.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedKiosk {
    pub cap: KioskOwnerCap,
    pub contents: KioskContents,
}

/// Fetch the full contents of each cap's kiosk, one kiosk at a time.
///
/// The first failing kiosk aborts the scan; nothing already fetched is returned.
pub async fn scan_kiosks<B: KioskBackend>(
    backend: &B,
    caps: Vec<KioskOwnerCap>,
    options: FetchKioskOptions,
) -> Result<Vec<ScannedKiosk>> {
    let mut scanned = Vec::with_capacity(caps.len());
    for cap in caps {
        let contents = backend
            .kiosk_contents(&cap.kiosk_id, options)
            .await
            .map_err(|e| Error::KioskScan {
                kiosk_id: cap.kiosk_id.clone(),
                reason: e.to_string(),
            })?;
        log::debug!(
            "scanned kiosk {} via cap {}: {} item(s)",
            cap.kiosk_id,
            cap.object_id,
            contents.items.len()
        );
        scanned.push(ScannedKiosk { cap, contents });
    }
    Ok(scanned)
}
