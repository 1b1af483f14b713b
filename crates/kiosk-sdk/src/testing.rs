//! In-memory backend and wallet session for exercising the pipeline without a
//! fullnode.
//!
//! `MockBackend` serves scripted owned-cap pages behind `cursor-N` cursors and
//! a fixed set of kiosks, and can be told to fail on a given page or kiosk.
//! `RecordingSession` keeps every graph it is asked to execute and runs the
//! linear check on it first, the way the network would reject a malformed
//! block.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chain::KioskBackend;
use crate::config::ROOTLET_TYPE;
use crate::error::{Error, Result};
use crate::network::{KioskRule, Network};
use crate::ptb::kiosk::KIOSK_MODULE;
use crate::ptb::{Argument, CallArg, Command, PureValue, TransactionGraph};
use crate::session::{
    ExecuteOptions, ExecutionReceipt, ExecutionStatus, ObjectChange, WalletSession,
};
use crate::types::{
    FetchKioskOptions, KioskContents, KioskItem, KioskListing, KioskOwnerCap, ObjectId, Page,
    SuiAddress,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Wallet address used across the fixtures.
pub fn owner() -> SuiAddress {
    "0xa11ce".parse().expect("valid address")
}

pub fn personal_cap(id: &str, kiosk: &str) -> KioskOwnerCap {
    KioskOwnerCap {
        object_id: ObjectId::from(id),
        kiosk_id: ObjectId::from(kiosk),
        is_personal: true,
    }
}

pub fn plain_cap(id: &str, kiosk: &str) -> KioskOwnerCap {
    KioskOwnerCap {
        is_personal: false,
        ..personal_cap(id, kiosk)
    }
}

pub fn kiosk_item(id: &str, item_type: &str, kiosk: &str) -> KioskItem {
    KioskItem {
        object_id: ObjectId::from(id),
        item_type: item_type.to_string(),
        kiosk_id: ObjectId::from(kiosk),
        is_locked: true,
        listing: None,
        data: None,
    }
}

pub fn rootlet(id: &str, kiosk: &str) -> KioskItem {
    kiosk_item(id, ROOTLET_TYPE, kiosk)
}

/// A Rootlet listed for `price` MIST through the listing field `listing_id`.
pub fn listed_rootlet(id: &str, kiosk: &str, listing_id: &str, price: u64) -> KioskItem {
    KioskItem {
        listing: Some(KioskListing {
            listing_id: ObjectId::from(listing_id),
            is_exclusive: false,
            price: Some(price),
        }),
        ..rootlet(id, kiosk)
    }
}

/// Personal caps A and B; only A's kiosk holds a Rootlet (`0xA1`).
pub fn two_kiosk_backend() -> MockBackend {
    MockBackend::new()
        .with_cap_page(vec![personal_cap("0xcapA", "0xkA")])
        .with_cap_page(vec![
            plain_cap("0xcapP", "0xkP"),
            personal_cap("0xcapB", "0xkB"),
        ])
        .with_kiosk("0xkA", vec![rootlet("0xA1", "0xkA")])
        .with_kiosk("0xkB", vec![kiosk_item("0xB1", "0x9::other::Thing", "0xkB")])
        .with_kiosk("0xkP", vec![rootlet("0xP1", "0xkP")])
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

fn page_cursor(index: usize) -> String {
    format!("cursor-{index}")
}

pub struct MockBackend {
    network: Network,
    cap_pages: Vec<Vec<KioskOwnerCap>>,
    kiosks: HashMap<ObjectId, Vec<KioskItem>>,
    failing_page: Option<usize>,
    failing_kiosks: HashSet<ObjectId>,
    page_requests: Mutex<Vec<Option<String>>>,
    kiosk_requests: Mutex<Vec<ObjectId>>,
    kiosk_options: Mutex<Vec<FetchKioskOptions>>,
    rule_lookups: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            network: Network::Mainnet,
            cap_pages: Vec::new(),
            kiosks: HashMap::new(),
            failing_page: None,
            failing_kiosks: HashSet::new(),
            page_requests: Mutex::new(Vec::new()),
            kiosk_requests: Mutex::new(Vec::new()),
            kiosk_options: Mutex::new(Vec::new()),
            rule_lookups: AtomicUsize::new(0),
        }
    }

    /// Rule packages are resolved from this network's table.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_cap_page(mut self, caps: Vec<KioskOwnerCap>) -> Self {
        self.cap_pages.push(caps);
        self
    }

    pub fn with_kiosk(mut self, kiosk_id: &str, items: Vec<KioskItem>) -> Self {
        self.kiosks.insert(ObjectId::from(kiosk_id), items);
        self
    }

    /// Fail the request for the page at `index` (0-based).
    pub fn fail_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    pub fn fail_kiosk(mut self, kiosk_id: &str) -> Self {
        self.failing_kiosks.insert(ObjectId::from(kiosk_id));
        self
    }

    /// Cursors of every owned-cap request, in order.
    pub fn page_requests(&self) -> Vec<Option<String>> {
        self.page_requests.lock().expect("lock").clone()
    }

    pub fn kiosk_requests(&self) -> Vec<ObjectId> {
        self.kiosk_requests.lock().expect("lock").clone()
    }

    /// Fetch options of every kiosk request, in order.
    pub fn kiosk_options(&self) -> Vec<FetchKioskOptions> {
        self.kiosk_options.lock().expect("lock").clone()
    }

    pub fn rule_lookups(&self) -> usize {
        self.rule_lookups.load(Ordering::SeqCst)
    }
}

impl KioskBackend for MockBackend {
    async fn owned_kiosk_caps(
        &self,
        _owner: &SuiAddress,
        _limit: u32,
        cursor: Option<&str>,
    ) -> Result<Page<KioskOwnerCap>> {
        self.page_requests
            .lock()
            .expect("lock")
            .push(cursor.map(str::to_string));

        let index = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::PageSource(format!("unknown cursor {c}")))?,
        };
        if self.failing_page == Some(index) {
            return Err(Error::Rpc(format!("page {index} unavailable")));
        }

        let data = self.cap_pages.get(index).cloned().unwrap_or_default();
        let has_next_page = index + 1 < self.cap_pages.len();
        Ok(Page {
            data,
            has_next_page,
            next_cursor: has_next_page.then(|| page_cursor(index + 1)),
        })
    }

    async fn kiosk_contents(
        &self,
        kiosk_id: &ObjectId,
        options: FetchKioskOptions,
    ) -> Result<KioskContents> {
        self.kiosk_requests
            .lock()
            .expect("lock")
            .push(kiosk_id.clone());
        self.kiosk_options.lock().expect("lock").push(options);

        if self.failing_kiosks.contains(kiosk_id) {
            return Err(Error::Rpc(format!("kiosk {kiosk_id} unavailable")));
        }
        let mut items = self
            .kiosks
            .get(kiosk_id)
            .cloned()
            .ok_or_else(|| Error::RpcResponse {
                code: -32602,
                message: format!("kiosk {kiosk_id} does not exist"),
            })?;
        // Scripted objects and prices are only served when asked for.
        for item in &mut items {
            if !options.with_objects {
                item.data = None;
            }
            if let (false, Some(listing)) = (options.with_listing_prices, item.listing.as_mut()) {
                listing.price = None;
            }
        }
        Ok(KioskContents { items })
    }

    fn rule_package_id(&self, rule: KioskRule) -> Result<ObjectId> {
        self.rule_lookups.fetch_add(1, Ordering::SeqCst);
        self.network.rule_package_id(rule)
    }
}

// ---------------------------------------------------------------------------
// RecordingSession
// ---------------------------------------------------------------------------

enum Failure {
    Transport(String),
    Abort(String),
}

pub struct RecordingSession {
    address: SuiAddress,
    submitted: Mutex<Vec<TransactionGraph>>,
    failure: Option<Failure>,
}

impl RecordingSession {
    pub fn new(address: SuiAddress) -> Self {
        Self {
            address,
            submitted: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Every submission is refused before execution.
    pub fn rejecting(mut self, reason: &str) -> Self {
        self.failure = Some(Failure::Transport(reason.to_string()));
        self
    }

    /// Every submission executes and aborts with `reason`.
    pub fn aborting(mut self, reason: &str) -> Self {
        self.failure = Some(Failure::Abort(reason.to_string()));
        self
    }

    pub fn submitted(&self) -> Vec<TransactionGraph> {
        self.submitted.lock().expect("lock").clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submitted.lock().expect("lock").len()
    }
}

/// Items the graph transfers, identified through the kiosk borrow that
/// produced them.
fn transferred_items(graph: &TransactionGraph, recipient: SuiAddress) -> Vec<ObjectChange> {
    let borrow_target = format!("{KIOSK_MODULE}::borrow_val");
    let mut changes = Vec::new();
    for command in graph.commands() {
        let Command::TransferObjects { objects, .. } = command else {
            continue;
        };
        for object in objects {
            let Argument::NestedResult { index, .. } = object else {
                continue;
            };
            let Some(Command::MoveCall(call)) = graph.commands().get(usize::from(*index)) else {
                continue;
            };
            if call.target != borrow_target {
                continue;
            }
            let item_id = call.arguments.iter().find_map(|arg| match arg {
                Argument::Input { index } => match graph.inputs().get(usize::from(*index)) {
                    Some(CallArg::Pure {
                        value: PureValue::Id(id),
                    }) => Some(id.clone()),
                    _ => None,
                },
                _ => None,
            });
            if let Some(object_id) = item_id {
                changes.push(ObjectChange {
                    change_type: "transferred".to_string(),
                    object_id,
                    object_type: call.type_arguments.first().cloned(),
                    recipient: Some(recipient),
                });
            }
        }
    }
    changes
}

fn transfer_recipient(graph: &TransactionGraph) -> Option<SuiAddress> {
    graph.commands().iter().find_map(|command| match command {
        Command::TransferObjects {
            address: Argument::Input { index },
            ..
        } => match graph.inputs().get(usize::from(*index)) {
            Some(CallArg::Pure {
                value: PureValue::Address(address),
            }) => Some(*address),
            _ => None,
        },
        _ => None,
    })
}

impl WalletSession for RecordingSession {
    fn address(&self) -> SuiAddress {
        self.address
    }

    async fn sign_and_execute(
        &self,
        graph: &TransactionGraph,
        options: &ExecuteOptions,
    ) -> Result<ExecutionReceipt> {
        graph.verify()?;
        let n = {
            let mut submitted = self.submitted.lock().expect("lock");
            submitted.push(graph.clone());
            submitted.len()
        };
        let digest = format!("digest-{n}");

        match &self.failure {
            Some(Failure::Transport(reason)) => Err(Error::Submission(reason.clone())),
            Some(Failure::Abort(reason)) => Ok(ExecutionReceipt {
                digest,
                status: ExecutionStatus::Failure {
                    error: reason.clone(),
                },
                object_changes: Vec::new(),
            }),
            None => {
                let recipient = transfer_recipient(graph);
                let object_changes = match (options.show_object_changes, recipient) {
                    (true, Some(recipient)) => transferred_items(graph, recipient),
                    _ => Vec::new(),
                };
                Ok(ExecutionReceipt {
                    digest,
                    status: ExecutionStatus::Success,
                    object_changes,
                })
            }
        }
    }
}
