use crate::chain::KioskBackend;
use crate::error::Result;
use crate::types::{KioskOwnerCap, Page, SuiAddress};

use super::pager::{PageSource, Pager};

/// The owned-cap index of one address, viewed as a page source.
pub struct OwnedCaps<'a, B> {
    backend: &'a B,
    owner: &'a SuiAddress,
}

impl<'a, B: KioskBackend> OwnedCaps<'a, B> {
    pub fn new(backend: &'a B, owner: &'a SuiAddress) -> Self {
        Self { backend, owner }
    }
}

impl<B: KioskBackend> PageSource for OwnedCaps<'_, B> {
    type Item = KioskOwnerCap;

    fn fetch_page(
        &self,
        cursor: Option<&str>,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Page<KioskOwnerCap>>> + Send {
        self.backend.owned_kiosk_caps(self.owner, limit, cursor)
    }
}

/// Keep only personal-kiosk caps.
pub fn personal_caps(caps: Vec<KioskOwnerCap>) -> Vec<KioskOwnerCap> {
    caps.into_iter().filter(|cap| cap.is_personal).collect()
}

/// Every kiosk owner cap held by `owner`, across all pages, narrowed to the
/// personal ones. A failed page aborts the whole walk.
pub async fn reconcile_personal_caps<B: KioskBackend>(
    backend: &B,
    owner: &SuiAddress,
    page_limit: u32,
) -> Result<Vec<KioskOwnerCap>> {
    let source = OwnedCaps::new(backend, owner);
    let all = Pager::new(&source, page_limit).collect_all().await?;
    let total = all.len();
    let personal = personal_caps(all);
    log::info!(
        "{owner}: {total} kiosk owner cap(s), {} personal",
        personal.len()
    );
    Ok(personal)
}
