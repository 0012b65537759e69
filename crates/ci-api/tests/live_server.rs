//! Tests against a running CI server
//!
//! # Running locally
//!
//! ```bash
//! # Start a server (first start needs the setup wizard completed)
//! docker run -d -p 8111:8111 jetbrains/teamcity-server
//!
//! # Run the live tests
//! TEAMCITY_TOKEN=... cargo test -p ci-api --test live_server -- --ignored --nocapture
//! ```
//!
//! # Environment Variables
//!
//! - `TEAMCITY_URL`: server URL (default: http://localhost:8111)
//! - `TEAMCITY_TOKEN`: access token, or `TEAMCITY_USERNAME` / `TEAMCITY_PASSWORD`
//! - `TEAMCITY_TIMEOUT_SECS`: per-request timeout (default: 30)
//! - `TEAMCITY_RETRY_COUNT`: attempts for retried calls (default: 3)

use std::time::Duration;

use ci_api::{ApiError, TestContext};
use ci_compare::{assert_that_models, CompareOptions};
use ci_registry::EntityKind;

fn server_assigned() -> CompareOptions {
    CompareOptions::new().ignore_fields(["href", "webUrl", "parentProjectId", "parentProject"])
}

async fn live_context() -> TestContext {
    ci_api::init_test_tracing();
    let ctx = TestContext::from_env().expect("invalid harness configuration");
    assert!(
        ctx.client().wait_for_healthy(Duration::from_secs(60)).await,
        "server at {} did not become healthy",
        ctx.config().base_url
    );
    ctx
}

#[tokio::test]
#[ignore] // Run with: cargo test -p ci-api --test live_server -- --ignored
async fn test_create_project_roundtrip() {
    let ctx = live_context().await;

    let result: Result<(), ApiError> = ctx
        .run(|ctx| async move {
            let project = ctx.with_fixtures(|f| f.project());
            let response = ctx.client().create_project(&project).await?;
            assert_that_models(&project, response.json())
                .contains(&server_assigned())
                .unwrap();

            let fetched = ctx.client().get_project(&project.id).await?;
            assert_eq!(fetched.json()["name"], project.name.as_str());
            Ok(())
        })
        .await;

    result.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_create_build_type_in_project() {
    let ctx = live_context().await;

    let result: Result<(), ApiError> = ctx
        .run(|ctx| async move {
            let project = ctx.with_fixtures(|f| f.project());
            ctx.client().create_project(&project).await?;

            let build_type = ctx.with_fixtures(|f| f.build_type(&project.id));
            let response = ctx.client().create_build_type(&build_type).await?;
            assert_eq!(response.json()["id"], build_type.id.as_str());
            assert_eq!(ctx.registry().stats().total, 2);
            Ok(())
        })
        .await;

    result.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_create_user() {
    let ctx = live_context().await;

    let result: Result<(), ApiError> = ctx
        .run(|ctx| async move {
            let user = ctx.with_fixtures(|f| f.user());
            let response = ctx.client().create_user(&user).await?;
            assert_eq!(response.json()["username"], user.username.as_str());
            assert!(ctx.registry().contains(EntityKind::User, &user.username));
            Ok(())
        })
        .await;

    result.unwrap();
}
