pub mod chain;
pub mod config;
pub mod discovery;
pub mod error;
pub mod network;
pub mod ptb;
pub mod sdk;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

// Core types
pub use chain::{KioskBackend, SuiRpcBackend};
pub use config::{
    DEFAULT_PAGE_LIMIT, DESTINATION_ADDRESS, DeploymentConfig, EXPLORER_BASE_URL, ROOTLET_TYPE,
    SubmissionPolicy,
};
pub use error::{Error, PipelineError, Result};
pub use network::{KioskRule, Network};
pub use sdk::{RootletSdk, UnlockResult};
pub use session::{ExecuteOptions, ExecutionReceipt, ExecutionStatus, ObjectChange, WalletSession};
pub use types::{
    FetchKioskOptions, KioskContents, KioskItem, KioskListing, KioskOwnerCap, MatchedAsset,
    ObjectId, Page, SuiAddress,
};

// Discovery pipeline
pub use discovery::{
    OwnedCaps, PageSource, Pager, ScannedKiosk, discover_matching_assets, discover_with_options,
    join_items_to_caps, match_assets, personal_caps, reconcile_personal_caps, scan_kiosks,
};

// Transaction graphs
pub use ptb::kiosk::{
    Borrowed, ItemKind, OwnerCapKind, Receipt, append_unlock_transfer, kiosk_borrow, kiosk_return,
    personal_kiosk_borrow, personal_kiosk_return, transfer_borrowed,
};
pub use ptb::linear::{LinearityViolation, Token, verify_linear};
pub use ptb::{
    Argument, CallArg, Command, GraphBuilder, MoveCall, PureValue, TransactionGraph, Usage,
};
