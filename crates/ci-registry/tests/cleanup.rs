//! Cleanup behaviour of the entity registry as seen from a test lifecycle

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};

use ci_registry::{CleanupError, CleanupState, EntityKind, EntityRegistry, RegisteredEntity};
use tracing_subscriber::fmt::MakeWriter;

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn warnings(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains("WARN"))
            .map(String::from)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

#[tokio::test]
async fn test_cleanup_drains_unconditionally_and_warns_once() {
    let (logs, _guard) = capture_logs();
    let registry = EntityRegistry::new();
    let deleted = Arc::new(Mutex::new(Vec::new()));

    registry.add(RegisteredEntity::new(EntityKind::Project, "Broken_1", || async {
        Err(CleanupError::Request("500 Internal Server Error".to_string()))
    }));
    let sink = deleted.clone();
    registry.add(RegisteredEntity::new(EntityKind::Project, "Healthy_2", move || async move {
        sink.lock().unwrap().push("Healthy_2".to_string());
        Ok(())
    }));

    let report = registry.cleanup_all().await;

    assert_eq!(registry.stats().total, 0);
    assert_eq!(*deleted.lock().unwrap(), vec!["Healthy_2".to_string()]);
    assert_eq!(report.cleaned(), 1);

    let warnings = logs.warnings();
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
    assert!(warnings[0].contains("project"));
    assert!(warnings[0].contains("Broken_1"));
}

#[tokio::test]
async fn test_clear_then_stats_is_empty() {
    let registry = EntityRegistry::new();
    registry.add(RegisteredEntity::new(EntityKind::User, "u1", || async { Ok(()) }));
    registry.add(RegisteredEntity::new(EntityKind::BuildType, "b1", || async { Ok(()) }));

    registry.clear();

    let stats = registry.stats();
    assert_eq!(stats.total, 0);
    assert!(stats.by_type.is_empty());
}

/// Cleanup has no parent/child ordering: when the project goes first, the
/// server has already removed its build type and that delete fails. The
/// failure is reported but both entries leave the registry.
#[tokio::test]
async fn test_parent_deleted_before_child_is_tolerated() {
    let (logs, _guard) = capture_logs();
    let server: Arc<Mutex<HashSet<&'static str>>> =
        Arc::new(Mutex::new(["Project_A", "BuildType_A"].into_iter().collect()));
    let registry = EntityRegistry::new();

    let project_server = server.clone();
    registry.add(RegisteredEntity::new(EntityKind::Project, "Project_A", move || async move {
        let mut server = project_server.lock().unwrap();
        server.remove("Project_A");
        // Deleting a project cascades to its build types
        server.remove("BuildType_A");
        Ok(())
    }));

    let build_type_server = server.clone();
    registry.add(RegisteredEntity::new(EntityKind::BuildType, "BuildType_A", move || async move {
        if build_type_server.lock().unwrap().remove("BuildType_A") {
            Ok(())
        } else {
            Err(CleanupError::Request("404 Not Found".to_string()))
        }
    }));

    let report = registry.cleanup_all().await;

    assert!(registry.is_empty());
    assert!(server.lock().unwrap().is_empty());
    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].kind, EntityKind::BuildType);
    assert!(matches!(failed[0].state, CleanupState::CleanupFailed(ref reason) if reason.contains("404")));
    assert_eq!(logs.warnings().len(), 1);
}

#[tokio::test]
async fn test_unknown_kind_requires_manual_review() {
    let registry = EntityRegistry::new();
    registry.add(
        RegisteredEntity::new(EntityKind::Unknown, "42", || async {
            Err(CleanupError::ManualReviewRequired {
                url: "/app/rest/agentPools".to_string(),
            })
        })
        .with_display_name("pool"),
    );

    let report = registry.cleanup_by_type(EntityKind::Unknown).await;
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.display_name.as_deref(), Some("pool"));
    assert!(!outcome.is_cleaned());
    assert!(registry.is_empty());
}
