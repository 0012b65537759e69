//! Typed calls for the modeled REST endpoints

use std::time::{Duration, Instant};

use ci_fixtures::{BuildTypeFixture, ProjectFixture, UserFixture};
use tracing::{debug, info};

use crate::{ApiClient, ApiResponse, ApiResult};

pub const PROJECTS_PATH: &str = "/app/rest/projects";
pub const BUILD_TYPES_PATH: &str = "/app/rest/buildTypes";
pub const USERS_PATH: &str = "/app/rest/users";
pub const SERVER_PATH: &str = "/app/rest/server";

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(2);

impl ApiClient {
    /// Create a project; registered for cleanup on success
    pub async fn create_project(&self, project: &ProjectFixture) -> ApiResult<ApiResponse> {
        self.post(PROJECTS_PATH, project).await
    }

    /// Create a build type; its project must already exist
    pub async fn create_build_type(&self, build_type: &BuildTypeFixture) -> ApiResult<ApiResponse> {
        self.post(BUILD_TYPES_PATH, build_type).await
    }

    /// Create a user; registered for cleanup on success
    pub async fn create_user(&self, user: &UserFixture) -> ApiResult<ApiResponse> {
        self.post(USERS_PATH, user).await
    }

    pub async fn get_project(&self, id: &str) -> ApiResult<ApiResponse> {
        self.get(&format!("{}/id:{}", PROJECTS_PATH, id)).await
    }

    pub async fn get_build_type(&self, id: &str) -> ApiResult<ApiResponse> {
        self.get(&format!("{}/id:{}", BUILD_TYPES_PATH, id)).await
    }

    pub async fn get_user(&self, username: &str) -> ApiResult<ApiResponse> {
        self.get(&format!("{}/username:{}", USERS_PATH, username))
            .await
    }

    /// Delete a project now
    ///
    /// The registry entry stays in place, so the teardown delete reports a
    /// failed cleanup for it.
    pub async fn delete_project(&self, id: &str) -> ApiResult<ApiResponse> {
        self.delete(&format!("{}/id:{}", PROJECTS_PATH, id)).await
    }

    pub async fn delete_build_type(&self, id: &str) -> ApiResult<ApiResponse> {
        self.delete(&format!("{}/id:{}", BUILD_TYPES_PATH, id))
            .await
    }

    pub async fn delete_user(&self, username: &str) -> ApiResult<ApiResponse> {
        self.delete(&format!("{}/username:{}", USERS_PATH, username))
            .await
    }

    /// Fetch the server information document
    pub async fn server_info(&self) -> ApiResult<ApiResponse> {
        self.get(SERVER_PATH).await
    }

    /// Check if the server answers
    pub async fn is_healthy(&self) -> bool {
        self.server_info().await.is_ok()
    }

    /// Wait for the server to become healthy
    pub async fn wait_for_healthy(&self, timeout: Duration) -> bool {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if self.is_healthy().await {
                info!(url = %self.transport().base_url(), "Server is ready");
                return true;
            }
            debug!("Server not ready yet");
            tokio::time::sleep(HEALTH_CHECK_INTERVAL).await;
        }

        false
    }
}
