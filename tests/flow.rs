use kiosk_sdk::testing::{
    MockBackend, RecordingSession, listed_rootlet, owner, personal_cap, two_kiosk_backend,
};
use kiosk_sdk::{
    Command, DeploymentConfig, ExecuteOptions, ExecutionReceipt, Network, ObjectId, RootletSdk,
    SuiAddress, TransactionGraph, WalletSession,
};
use rootlet_lib::commands::{discover_assets, unlock_asset};
use rootlet_lib::state::{FAILURE_REASON, FlowController, FlowOutcome};

fn flow(backend: MockBackend) -> FlowController<MockBackend> {
    FlowController::new(RootletSdk::new(
        backend,
        DeploymentConfig::for_network(Network::Mainnet),
    ))
}

fn wallet() -> String {
    owner().to_string()
}

/// Changes the flow's selection from inside the signing step, then executes
/// like a `RecordingSession`.
struct ReselectingSession<'a> {
    flow: &'a FlowController<MockBackend>,
    reselect: ObjectId,
    inner: RecordingSession,
}

impl WalletSession for ReselectingSession<'_> {
    fn address(&self) -> SuiAddress {
        self.inner.address()
    }

    async fn sign_and_execute(
        &self,
        graph: &TransactionGraph,
        options: &ExecuteOptions,
    ) -> kiosk_sdk::Result<ExecutionReceipt> {
        self.flow.select(self.reselect.clone());
        self.inner.sign_and_execute(graph, options).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discover_command_lists_the_personal_kiosk_rootlet() {
    let flow = flow(two_kiosk_backend());
    let assets = discover_assets(&flow, &wallet(), false).await.unwrap();

    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].id, ObjectId::from("0xA1"));
    assert_eq!(assets[0].personal_kiosk_cap_id, ObjectId::from("0xcapA"));
}

#[tokio::test]
async fn discover_command_reads_prices_on_request() {
    let backend = MockBackend::new()
        .with_cap_page(vec![personal_cap("0xcapL", "0xkL")])
        .with_kiosk("0xkL", vec![listed_rootlet("0xL1", "0xkL", "0xlistL1", 9_000)]);
    let flow = flow(backend);

    let without = discover_assets(&flow, &wallet(), false).await.unwrap();
    assert_eq!(without[0].listing.as_ref().unwrap().price, None);

    let with = discover_assets(&flow, &wallet(), true).await.unwrap();
    assert_eq!(with[0].listing.as_ref().unwrap().price, Some(9_000));
    assert!(flow.sdk().backend().kiosk_options()[1].with_listing_prices);
}

#[tokio::test]
async fn dry_run_unlock_records_the_checked_graph() {
    let flow = flow(two_kiosk_backend());
    let report = unlock_asset(&flow, &wallet(), "0xA1").await.unwrap();

    assert!(report.dry_run);
    assert!(report.outcome.is_completed());
    assert_eq!(report.submissions.len(), 1);
    assert_eq!(report.submissions[0].commands, 5);
    assert_eq!(report.submissions[0].digest.len(), 64);
    assert_eq!(flow.selected(), Some(ObjectId::from("0xA1")));
}

#[tokio::test]
async fn dry_run_for_unknown_asset_fails_after_submitting() {
    let flow = flow(two_kiosk_backend());
    let report = unlock_asset(&flow, &wallet(), "0xZZ").await.unwrap();

    match &report.outcome {
        FlowOutcome::Failed { reason, .. } => assert_eq!(reason, FAILURE_REASON),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert_eq!(report.submissions.len(), 1);
    assert_eq!(report.submissions[0].commands, 0);
}

#[tokio::test]
async fn every_failure_collapses_to_the_same_outcome() {
    let discovery_broken = flow(two_kiosk_backend().fail_page(0));
    let rejected = flow(two_kiosk_backend());

    discovery_broken.select(ObjectId::from("0xA1"));
    rejected.select(ObjectId::from("0xA1"));

    let a = discovery_broken
        .run(&RecordingSession::new(owner()))
        .await;
    let b = rejected
        .run(&RecordingSession::new(owner()).aborting("MoveAbort(kiosk, 2)"))
        .await;

    for outcome in [a, b] {
        match outcome {
            FlowOutcome::Failed { reason, .. } => assert_eq!(reason, FAILURE_REASON),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn selection_is_read_once_per_run() {
    let flow = flow(two_kiosk_backend());
    flow.select(ObjectId::from("0xA1"));
    let session = ReselectingSession {
        flow: &flow,
        reselect: ObjectId::from("0xZZ"),
        inner: RecordingSession::new(owner()),
    };

    let outcome = flow.run(&session).await;
    match &outcome {
        FlowOutcome::Completed { asset_id, .. } => assert_eq!(asset_id, &ObjectId::from("0xA1")),
        other => panic!("expected Completed, got {other:?}"),
    }

    let graphs = session.inner.submitted();
    assert_eq!(graphs.len(), 1);
    assert_eq!(graphs[0].commands().len(), 5);
    assert!(matches!(
        graphs[0].commands()[2],
        Command::TransferObjects { .. }
    ));

    // The change made mid-run is kept for the next run.
    assert_eq!(flow.selected(), Some(ObjectId::from("0xZZ")));
    assert_eq!(flow.last_outcome(), Some(outcome));
}
