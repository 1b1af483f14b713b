use kiosk_sdk::testing::{
    MockBackend, RecordingSession, listed_rootlet, owner, personal_cap, rootlet,
    two_kiosk_backend,
};
use kiosk_sdk::{
    Command, DeploymentConfig, Error, FetchKioskOptions, Network, ObjectId, PipelineError,
    ROOTLET_TYPE, RootletSdk, SubmissionPolicy, discover_matching_assets,
};

fn sdk(backend: MockBackend) -> RootletSdk<MockBackend> {
    RootletSdk::new(backend, DeploymentConfig::for_network(Network::Mainnet))
}

fn sdk_with_policy(backend: MockBackend, policy: SubmissionPolicy) -> RootletSdk<MockBackend> {
    let mut config = DeploymentConfig::for_network(Network::Mainnet);
    config.submission_policy = policy;
    RootletSdk::new(backend, config)
}

fn borrow_return_steps(command: &Command) -> bool {
    matches!(command, Command::MoveCall(call)
        if call.target.ends_with("::borrow_val") || call.target.ends_with("::return_val"))
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discovers_only_the_rootlet_in_a_personal_kiosk() {
    let sdk = sdk(two_kiosk_backend());
    let assets = sdk.discover_matching_assets(&owner()).await.unwrap();

    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].id, ObjectId::from("0xA1"));
    assert_eq!(assets[0].kiosk_id, ObjectId::from("0xkA"));
    assert_eq!(assets[0].personal_kiosk_cap_id, ObjectId::from("0xcapA"));
}

#[tokio::test]
async fn walks_every_cap_page_then_scans_personal_kiosks() {
    let sdk = sdk(two_kiosk_backend());
    sdk.discover_matching_assets(&owner()).await.unwrap();

    assert_eq!(
        sdk.backend().page_requests(),
        vec![None, Some("cursor-1".to_string())]
    );
    assert_eq!(
        sdk.backend().kiosk_requests(),
        vec![ObjectId::from("0xkA"), ObjectId::from("0xkB")]
    );
}

#[tokio::test]
async fn empty_wallet_yields_nothing() {
    let sdk = sdk(MockBackend::new());
    assert!(sdk.discover_matching_assets(&owner()).await.unwrap().is_empty());
    assert_eq!(sdk.backend().page_requests(), vec![None]);
    assert!(sdk.backend().kiosk_requests().is_empty());
}

#[tokio::test]
async fn listing_prices_are_read_only_when_requested() {
    let backend = MockBackend::new()
        .with_cap_page(vec![personal_cap("0xcapL", "0xkL")])
        .with_kiosk("0xkL", vec![listed_rootlet("0xL1", "0xkL", "0xlistL1", 4_200)]);
    let sdk = sdk(backend);

    let plain = sdk.discover_matching_assets(&owner()).await.unwrap();
    let listing = plain[0].listing.as_ref().unwrap();
    assert_eq!(listing.listing_id, ObjectId::from("0xlistL1"));
    assert_eq!(listing.price, None);

    let priced = sdk
        .discover_with_options(&owner(), FetchKioskOptions::scan().with_listing_prices())
        .await
        .unwrap();
    assert_eq!(priced[0].listing.as_ref().unwrap().price, Some(4_200));

    let options = sdk.backend().kiosk_options();
    assert_eq!(options.len(), 2);
    assert!(options.iter().all(|o| o.with_objects));
    assert!(!options[0].with_listing_prices);
    assert!(options[1].with_listing_prices);
}

#[tokio::test]
async fn failed_page_aborts_discovery() {
    let backend = two_kiosk_backend().fail_page(1);
    let result = discover_matching_assets(&backend, &owner(), ROOTLET_TYPE, 50).await;

    assert!(matches!(result, Err(Error::Rpc(_))));
    assert!(backend.kiosk_requests().is_empty());
}

#[tokio::test]
async fn failed_kiosk_scan_aborts_discovery() {
    let backend = two_kiosk_backend().fail_kiosk("0xkB");
    let result = discover_matching_assets(&backend, &owner(), ROOTLET_TYPE, 50).await;

    match result {
        Err(Error::KioskScan { kiosk_id, .. }) => assert_eq!(kiosk_id, ObjectId::from("0xkB")),
        other => panic!("expected KioskScan, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Unlock and transfer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlocking_a_discovered_rootlet_submits_the_five_step_block() {
    let sdk = sdk(two_kiosk_backend());
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let result = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap();

    assert_eq!(result.asset_id, ObjectId::from("0xA1"));
    assert_eq!(result.kiosk_id, ObjectId::from("0xkA"));
    assert_eq!(result.submissions, 1);
    assert_eq!(sdk.backend().rule_lookups(), 1);

    let submitted = session.submitted();
    assert_eq!(submitted.len(), 1);
    let graph = &submitted[0];
    assert_eq!(graph.commands().len(), 5);
    assert!(matches!(graph.commands()[2], Command::TransferObjects { .. }));
    assert_eq!(graph.verify(), Ok(()));
}

#[tokio::test]
async fn unknown_asset_still_submits_an_empty_graph() {
    let sdk = sdk(two_kiosk_backend());
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xZZ"), &destination)
        .await
        .unwrap_err();

    match err {
        PipelineError::NoMatchFound {
            asset_id,
            submissions,
        } => {
            assert_eq!(asset_id, ObjectId::from("0xZZ"));
            assert_eq!(submissions, 1);
        }
        other => panic!("expected NoMatchFound, got {other}"),
    }
    let submitted = session.submitted();
    assert_eq!(submitted.len(), 1);
    assert!(!submitted[0].commands().iter().any(borrow_return_steps));
    assert_eq!(sdk.backend().rule_lookups(), 0);
}

#[tokio::test]
async fn submits_once_per_iterated_asset() {
    let backend = MockBackend::new()
        .with_cap_page(vec![personal_cap("0xcapA", "0xkA")])
        .with_kiosk(
            "0xkA",
            vec![rootlet("0xA1", "0xkA"), rootlet("0xA2", "0xkA"), rootlet("0xA3", "0xkA")],
        );
    let sdk = sdk(backend);
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let result = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA2"), &destination)
        .await
        .unwrap();

    assert_eq!(result.submissions, 3);
    let graphs = session.submitted();
    // Nothing matched yet when the first asset was visited.
    assert!(graphs[0].is_empty());
    assert_eq!(graphs[1].commands().len(), 5);
    assert_eq!(graphs[2], graphs[1]);
}

#[tokio::test]
async fn once_policy_submits_a_single_graph() {
    let backend = MockBackend::new()
        .with_cap_page(vec![personal_cap("0xcapA", "0xkA")])
        .with_kiosk("0xkA", vec![rootlet("0xA1", "0xkA"), rootlet("0xA2", "0xkA")]);
    let sdk = sdk_with_policy(backend, SubmissionPolicy::Once);
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let result = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap();

    assert_eq!(result.submissions, 1);
    assert_eq!(session.submission_count(), 1);
}

#[tokio::test]
async fn no_assets_means_no_submission() {
    let sdk = sdk(MockBackend::new());
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::NoMatchFound { submissions: 0, .. }
    ));
    assert_eq!(session.submission_count(), 0);
}

#[tokio::test]
async fn discovery_failure_stops_before_submission() {
    let sdk = sdk(two_kiosk_backend().fail_kiosk("0xkA"));
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Discovery(Error::KioskScan { .. })));
    assert_eq!(session.submission_count(), 0);
}

#[tokio::test]
async fn missing_rule_package_is_a_discovery_failure() {
    let sdk = sdk(two_kiosk_backend().with_network(Network::Localnet));
    let session = RecordingSession::new(owner());
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Discovery(Error::UnknownRulePackage { .. })
    ));
    assert_eq!(session.submission_count(), 0);
}

#[tokio::test]
async fn rejected_submission_is_a_submission_failure() {
    let sdk = sdk(two_kiosk_backend());
    let session = RecordingSession::new(owner()).rejecting("user declined");
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Submission(Error::Submission(_))));
}

#[tokio::test]
async fn aborted_execution_is_a_submission_failure() {
    let sdk = sdk(two_kiosk_backend());
    let session = RecordingSession::new(owner()).aborting("MoveAbort(kiosk, 2)");
    let destination = sdk.config().destination;

    let err = sdk
        .unlock_and_transfer(&session, &ObjectId::from("0xA1"), &destination)
        .await
        .unwrap_err();

    match err {
        PipelineError::Submission(Error::ExecutionFailed { digest, reason }) => {
            assert_eq!(digest, "digest-1");
            assert_eq!(reason, "MoveAbort(kiosk, 2)");
        }
        other => panic!("expected ExecutionFailed, got {other}"),
    }
}
