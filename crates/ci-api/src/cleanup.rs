//! Registration of created entities for cleanup

use ci_registry::{CleanupError, EntityKind, EntityRegistry, RegisteredEntity};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::endpoints::{BUILD_TYPES_PATH, PROJECTS_PATH, USERS_PATH};
use crate::{ApiResponse, RequestOptions, Transport};

/// Identifier of a created entity, as found in the response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIdentifier {
    /// The raw id or username
    pub id: String,
    /// REST locator addressing the entity, e.g. `id:Project_1` or `username:bob`
    pub locator: String,
}

/// Classify the entity a creation URL produces
///
/// Build types are checked first, since they are also created below
/// `/projects/<id>/buildTypes`. URLs matching none of the known
/// collections are [`EntityKind::Unknown`].
pub fn classify_entity(path: &str) -> EntityKind {
    if path.contains("/buildTypes") {
        EntityKind::BuildType
    } else if path.contains("/users") {
        EntityKind::User
    } else if path.contains("/projects") {
        EntityKind::Project
    } else {
        EntityKind::Unknown
    }
}

/// Find the identifying field in a creation response
///
/// Users are addressed by `username` when present; everything else by `id`.
/// Numeric ids are accepted and stringified.
pub fn created_identifier(kind: EntityKind, body: &Value) -> Option<CreatedIdentifier> {
    let by_username = || {
        field_as_string(body, "username").map(|username| CreatedIdentifier {
            locator: format!("username:{}", username),
            id: username,
        })
    };
    let by_id = || {
        field_as_string(body, "id").map(|id| CreatedIdentifier {
            locator: format!("id:{}", id),
            id,
        })
    };

    match kind {
        EntityKind::User => by_username().or_else(by_id),
        _ => by_id().or_else(by_username),
    }
}

fn field_as_string(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn collection_path(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Project => Some(PROJECTS_PATH),
        EntityKind::BuildType => Some(BUILD_TYPES_PATH),
        EntityKind::User => Some(USERS_PATH),
        EntityKind::Unknown => None,
    }
}

/// Register the entity created by a successful `POST` to `path`
///
/// Called by the client after the success flag is set; does nothing when
/// the body names no identifier.
pub(crate) fn register_created(
    registry: &EntityRegistry,
    transport: &Transport,
    path: &str,
    response: &ApiResponse,
) {
    let kind = classify_entity(path);
    let Some(identifier) = created_identifier(kind, response.json()) else {
        if response.status.is_success() {
            warn!(path = %path, status = response.status.as_u16(), "Created entity has no id or username; nothing registered");
        }
        return;
    };

    if kind == EntityKind::Unknown {
        warn!(
            path = %path,
            id = %identifier.id,
            "Entity created through an unrecognised endpoint; it needs manual cleanup"
        );
    }

    let entity = cleanup_entity(kind, identifier, transport.clone(), path);
    let entity = match response.json().get("name").and_then(Value::as_str) {
        Some(name) => entity.with_display_name(name),
        None => entity,
    };

    info!(kind = %entity.kind(), id = %entity.id(), "Registered created entity");
    registry.add(entity);
}

/// Build the registry entry whose callback deletes the entity
fn cleanup_entity(
    kind: EntityKind,
    identifier: CreatedIdentifier,
    transport: Transport,
    created_at: &str,
) -> RegisteredEntity {
    let CreatedIdentifier { id, locator } = identifier;
    let delete_path = collection_path(kind).map(|collection| format!("{}/{}", collection, locator));
    let created_url = transport.url(created_at);

    RegisteredEntity::new(kind, id, move || async move {
        let Some(path) = delete_path else {
            return Err(CleanupError::ManualReviewRequired { url: created_url });
        };

        let response = transport
            .send(Method::DELETE, &path, None, &RequestOptions::default())
            .await
            .map_err(|err| CleanupError::Request(err.to_string()))?;

        if response.success {
            debug!(path = %path, "Deleted entity");
            Ok(())
        } else {
            Err(CleanupError::Request(format!(
                "DELETE {} returned {}",
                response.url, response.status
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_known_collections() {
        assert_eq!(classify_entity("/app/rest/projects"), EntityKind::Project);
        assert_eq!(classify_entity("/app/rest/buildTypes"), EntityKind::BuildType);
        assert_eq!(classify_entity("/app/rest/users"), EntityKind::User);
    }

    #[test]
    fn test_build_type_wins_over_project() {
        assert_eq!(
            classify_entity("/app/rest/projects/id:P1/buildTypes"),
            EntityKind::BuildType
        );
    }

    #[test]
    fn test_unmatched_url_is_unknown() {
        assert_eq!(classify_entity("/app/rest/agentPools"), EntityKind::Unknown);
    }

    #[test]
    fn test_identifier_prefers_id() {
        let body = json!({"id": "Project_1", "name": "x"});
        let identifier = created_identifier(EntityKind::Project, &body).unwrap();
        assert_eq!(identifier.id, "Project_1");
        assert_eq!(identifier.locator, "id:Project_1");
    }

    #[test]
    fn test_user_identified_by_username() {
        let body = json!({"id": 17, "username": "alice"});
        let identifier = created_identifier(EntityKind::User, &body).unwrap();
        assert_eq!(identifier.locator, "username:alice");
    }

    #[test]
    fn test_numeric_id_accepted() {
        let body = json!({"id": 17});
        let identifier = created_identifier(EntityKind::User, &body).unwrap();
        assert_eq!(identifier.id, "17");
        assert_eq!(identifier.locator, "id:17");
    }

    #[test]
    fn test_missing_identifier() {
        assert!(created_identifier(EntityKind::Project, &json!({"name": "x"})).is_none());
        assert!(created_identifier(EntityKind::Project, &json!({"id": ""})).is_none());
        assert!(created_identifier(EntityKind::Project, &Value::Null).is_none());
    }
}
