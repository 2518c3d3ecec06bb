use std::sync::Arc;
use std::time::Duration;

use payroll_graphql_client::{ClientConfig, Error, ErrorKind, GraphQLClient};
use payroll_graphql_e2e::mock::MockHasura;
use payroll_graphql_e2e::runner::{Outcome, Report, RunOptions, Tally, Tier};
use payroll_graphql_e2e::{fixtures, runner};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start_mock() -> MockHasura {
    init_tracing();
    MockHasura::start().await.expect("mock hasura failed to start")
}

macro_rules! e2e_test {
    ($module:ident :: $name:ident) => {
        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        async fn $name() {
            let mock = start_mock().await;
            let ctx = mock.context().expect("client for mock");
            payroll_graphql_e2e::specs::$module::$name(&ctx).await.unwrap();
        }
    };
}

payroll_graphql_e2e::for_each_spec!(e2e_test);
payroll_graphql_e2e::for_each_mock_only_spec!(e2e_test);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn full_suite_passes_in_parallel_against_one_mock() {
    let mock = start_mock().await;
    let ctx = Arc::new(mock.context().expect("client for mock"));

    let options = RunOptions {
        include_mock_only: true,
        ..RunOptions::default()
    };
    let report = runner::run_all(ctx, options).await;
    assert!(report.total() > 0, "no specs registered");
    assert_eq!(report.failed(), 0, "failures: {:#?}", report.failures());
    assert_eq!(report.tier(Tier::MockOnly).count(), 6);
    assert!(report.tier(Tier::MockOnly).all(|o| o.area != "subscriptions"));
    let areas = report.by_area();
    assert_eq!(areas["notes"], Tally { passed: 16, failed: 0 });
    assert_eq!(areas["subscriptions"], Tally { passed: 3, failed: 0 });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runner_filter_selects_by_path() {
    let mock = start_mock().await;
    let ctx = Arc::new(mock.context().expect("client for mock"));

    let options = RunOptions {
        filter: Some("federation::"),
        ..RunOptions::default()
    };
    let report = runner::run_all(ctx, options).await;
    assert_eq!(report.total(), 2);
    assert!(report.outcomes.iter().all(|o| o.area == "federation"));
    assert_eq!(report.failed(), 0, "failures: {:#?}", report.failures());
    assert_eq!(report.to_string(), "federation 2/2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runner_reports_a_stalled_spec_by_name() {
    let mock = start_mock().await;
    let ctx = Arc::new(mock.context().expect("client for mock"));

    let options = RunOptions {
        filter: Some("subscriptions::notes_updates_follow_inserts"),
        spec_timeout: Duration::from_millis(1),
        ..RunOptions::default()
    };
    let report = runner::run_all(ctx, options).await;
    assert_eq!(report.total(), 1);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert!(
        failures[0].starts_with("subscriptions::notes_updates_follow_inserts: timed out"),
        "{failures:?}"
    );
}

#[test]
fn report_tallies_each_area() {
    let outcome = |area, name, error: Option<&str>| Outcome {
        area,
        name,
        tier: Tier::Common,
        duration: Duration::ZERO,
        error: error.map(str::to_string),
    };
    let report = Report {
        outcomes: vec![
            outcome("federation", "sdl", None),
            outcome("notes", "add", None),
            outcome("notes", "delete", Some("boom")),
        ],
    };
    assert_eq!(report.failed(), 1);
    assert_eq!(report.by_area()["notes"], Tally { passed: 1, failed: 1 });
    assert_eq!(report.failures(), vec!["notes::delete: boom".to_string()]);
    assert_eq!(report.to_string(), "federation 1/1, notes 1/2");
}

#[tokio::test]
async fn missing_admin_secret_is_access_denied() {
    let mock = start_mock().await;
    let mut config = mock.config();
    config.auth.admin_secret = None;
    let client = GraphQLClient::new(&config).unwrap();

    let err = client
        .get_notes_basic(fixtures::fresh_entity())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::AccessDenied));
    assert!(err.to_string().contains("required, but not found"));
}

#[tokio::test]
async fn wrong_admin_secret_is_access_denied() {
    let mock = start_mock().await;
    let mut config = mock.config();
    config.auth.admin_secret = Some("not-the-secret".into());
    let client = GraphQLClient::new(&config).unwrap();

    let err = client.service_sdl().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::AccessDenied));
}

#[tokio::test]
async fn subscription_without_secret_is_refused_during_init() {
    let mock = start_mock().await;
    let mut config = mock.config();
    config.auth.admin_secret = None;
    let client = GraphQLClient::new(&config).unwrap();

    let result = client.notes_updates(fixtures::fresh_entity()).await;
    assert!(
        matches!(result, Err(Error::Protocol(_) | Error::WebSocket(_))),
        "expected the socket to close during init"
    );
}

#[tokio::test]
async fn crud_operations_are_not_served() {
    let mock = start_mock().await;
    let client = GraphQLClient::new(&mock.config()).unwrap();

    let err = client
        .count::<payroll_graphql_client::types::tables::Notes>(None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ValidationFailed));
}

#[tokio::test]
async fn config_file_reaches_the_mock() {
    let mock = start_mock().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(payroll_graphql_client::config::CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        format!(
            "[endpoint]\nurl = \"{}\"\nws_url = \"{}\"\n\n[auth]\nadmin_secret = \"{}\"\n",
            mock.endpoint(),
            mock.ws_endpoint(),
            payroll_graphql_e2e::mock::ADMIN_SECRET,
        ),
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();
    let client = GraphQLClient::new(&config).unwrap();
    assert!(client.service_sdl().await.unwrap().contains("type notes"));
}
