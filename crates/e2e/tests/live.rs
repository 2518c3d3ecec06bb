//! The shared specs against a real endpoint configured through `HASURA_*`.
//!
//! Ignored by default:
//! `HASURA_GRAPHQL_ENDPOINT=... HASURA_GRAPHQL_ADMIN_SECRET=... cargo test -p payroll-graphql-e2e --test live -- --ignored`

use std::sync::Arc;

use payroll_graphql_e2e::client::TestContext;
use payroll_graphql_e2e::runner;

fn get_ctx() -> TestContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    TestContext::from_env().expect("HASURA_* environment must describe a reachable endpoint")
}

macro_rules! e2e_test {
    ($module:ident :: $name:ident) => {
        #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
        #[ignore = "needs a live Hasura endpoint"]
        async fn $name() {
            let ctx = get_ctx();
            payroll_graphql_e2e::specs::$module::$name(&ctx).await.unwrap();
        }
    };
}

payroll_graphql_e2e::for_each_spec!(e2e_test);

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "needs a live Hasura endpoint"]
async fn full_suite_against_live_endpoint() {
    let ctx = Arc::new(get_ctx());
    let filter = std::env::var("E2E_FILTER").ok();
    let options = runner::RunOptions {
        filter: filter.as_deref(),
        ..runner::RunOptions::default()
    };
    let report = runner::run_all(ctx, options).await;
    for outcome in &report.outcomes {
        eprintln!(
            "{} {} ({:?})",
            if outcome.passed() { "ok  " } else { "FAIL" },
            outcome.path(),
            outcome.duration
        );
    }
    eprintln!("{report}");
    assert_eq!(report.failed(), 0, "failures: {:#?}", report.failures());
}
