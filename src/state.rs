use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use kiosk_sdk::{
    FetchKioskOptions, KioskBackend, MatchedAsset, ObjectId, PipelineError, RootletSdk,
    SuiAddress, WalletSession,
};

/// The one failure message a flow surfaces; the cause goes to the log.
pub const FAILURE_REASON: &str = "unlock and transfer failed";

// ============================================================================
// Flow outcome (shown to the user)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FlowOutcome {
    #[serde(rename_all = "camelCase")]
    Completed {
        asset_id: ObjectId,
        explorer_url: String,
        completed_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl FlowOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FlowOutcome::Completed { .. })
    }

    fn failed() -> Self {
        FlowOutcome::Failed {
            reason: FAILURE_REASON.to_string(),
            failed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    pub revision: u64,
    pub selected: Option<ObjectId>,
    pub last_outcome: Option<FlowOutcome>,
}

// ============================================================================
// Flow controller
// ============================================================================

/// Drives one unlock-and-transfer at a time for a selected asset.
pub struct FlowController<B: KioskBackend> {
    sdk: RootletSdk<B>,
    state: Mutex<FlowState>,
}

impl<B: KioskBackend> FlowController<B> {
    pub fn new(sdk: RootletSdk<B>) -> Self {
        Self {
            sdk,
            state: Mutex::new(FlowState::default()),
        }
    }

    pub fn sdk(&self) -> &RootletSdk<B> {
        &self.sdk
    }

    pub fn snapshot(&self) -> FlowState {
        self.lock().clone()
    }

    pub fn select(&self, asset_id: ObjectId) {
        self.update(|state| state.selected = Some(asset_id));
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.snapshot().selected
    }

    pub fn last_outcome(&self) -> Option<FlowOutcome> {
        self.snapshot().last_outcome
    }

    /// Forget the selection and the last outcome.
    pub fn reset(&self) {
        self.update(|state| {
            state.selected = None;
            state.last_outcome = None;
        });
    }

    /// Rootlets in `owner`'s personal kiosks; `listing_prices` also reads the
    /// asking price of listed ones.
    pub async fn discover(
        &self,
        owner: &SuiAddress,
        listing_prices: bool,
    ) -> kiosk_sdk::Result<Vec<MatchedAsset>> {
        let mut options = FetchKioskOptions::scan();
        if listing_prices {
            options = options.with_listing_prices();
        }
        self.sdk.discover_with_options(owner, options).await
    }

    /// Unlock the selected asset and send it to the configured destination.
    ///
    /// The selection is read once, before anything is fetched. Every failure
    /// becomes [`FlowOutcome::Failed`] with [`FAILURE_REASON`].
    pub async fn run<W: WalletSession>(&self, session: &W) -> FlowOutcome {
        let outcome = match self.selected() {
            None => {
                log::warn!("unlock requested with no asset selected");
                FlowOutcome::failed()
            }
            Some(target) => match self.unlock(session, &target).await {
                Ok(()) => {
                    log::info!(
                        "unlock of {target} to {} accepted by the session",
                        self.sdk.config().destination
                    );
                    FlowOutcome::Completed {
                        explorer_url: self.sdk.explorer_url(&target),
                        asset_id: target,
                        completed_at: Utc::now(),
                    }
                }
                Err(e) => {
                    log::error!("unlock of {target} failed: {e}");
                    FlowOutcome::failed()
                }
            },
        };

        let recorded = outcome.clone();
        self.update(|state| state.last_outcome = Some(recorded));
        outcome
    }

    async fn unlock<W: WalletSession>(
        &self,
        session: &W,
        target: &ObjectId,
    ) -> Result<(), PipelineError> {
        let destination = self.sdk.config().destination;
        let result = self
            .sdk
            .unlock_and_transfer(session, target, &destination)
            .await?;
        log::debug!(
            "{} submission(s), last digest {}",
            result.submissions,
            result.digest
        );
        Ok(())
    }

    /// A panic while the lock was held leaves the state as it was written so
    /// far; keep using it.
    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            log::error!("flow state lock poisoned");
            poisoned.into_inner()
        })
    }

    fn update(&self, f: impl FnOnce(&mut FlowState)) {
        let mut state = self.lock();
        f(&mut state);
        state.revision += 1;
    }
}
