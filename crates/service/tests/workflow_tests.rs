#![allow(clippy::unwrap_used, reason = "test code")]

use std::sync::Arc;

use attendify_client::{
    ApiClient, ClientConfig, Collection, CredentialStore, CredentialsError, FileCredentialStore, MemoryCredentialStore,
};
use attendify_core::{Credentials, Group, User};
use attendify_service::group_wizard::NAME_TAKEN;
use attendify_service::{
    CallbackOutcome, GroupWizard, GroupWorkflows, ListView, NoticeLevel, NoticeLog, ServiceError, SessionContext,
    SessionState, WizardStep,
};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&ClientConfig::new(server.uri()), store).unwrap())
}

fn stored(access: &str, refresh: &str) -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with_credentials(Credentials {
        access_token: access.to_owned(),
        refresh_token: refresh.to_owned(),
    }))
}

/// Reads fine but refuses to persist anything.
#[derive(Debug, Default)]
struct ReadOnlyStore;

impl CredentialStore for ReadOnlyStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        Ok(None)
    }

    fn save(&self, _credentials: &Credentials) -> Result<(), CredentialsError> {
        Err(CredentialsError::NoConfigDir)
    }

    fn clear(&self) -> Result<(), CredentialsError> {
        Ok(())
    }
}

fn group_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "created_at": "2024-05-01T08:00:00Z",
        "updated_at": "2024-05-01T08:00:00Z"
    })
}

fn profile_json() -> serde_json::Value {
    json!({
        "id": "u1", "username": "alice", "email": "alice@example.com",
        "roles": ["admin"], "premissions": ["groups.view"]
    })
}

fn user_json(id: &str) -> serde_json::Value {
    json!({ "id": id, "username": id, "email": format!("{id}@example.com") })
}

fn members_page(ids: &[&str]) -> serde_json::Value {
    let data: Vec<_> = ids.iter().map(|id| user_json(id)).collect();
    json!({ "data": data, "meta": { "total": ids.len(), "totalPages": 1 } })
}

#[tokio::test]
async fn test_login_stores_tokens_and_logout_clears_them() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let session = SessionContext::new(client_for(&server, store.clone()));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": profile_json(),
                "credentials": { "accessToken": "acc", "refreshToken": "ref" }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("Authorization", "Bearer acc"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "down" })))
        .expect(1)
        .mount(&server)
        .await;

    let user = session.login("alice@example.com", "pw").await.unwrap();
    assert_eq!(user.user.username, "alice");
    assert!(session.is_authenticated());
    assert!(session.has_permission("groups.view"));
    assert_eq!(store.load().unwrap().unwrap().access_token, "acc");

    session.logout().await.unwrap();
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_failed_login_stays_anonymous() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let session = SessionContext::new(client_for(&server, store.clone()));

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "Invalid credentials" } })),
        )
        .mount(&server)
        .await;

    let err = session.login("alice@example.com", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn test_oauth_callback_without_tokens_goes_back_to_login() {
    let server = MockServer::start().await;
    let session = SessionContext::new(client_for(&server, Arc::new(MemoryCredentialStore::new())));

    let outcome = session.complete_oauth_callback("?accessToken=only").await.unwrap();
    assert_eq!(outcome, CallbackOutcome::MissingTokens);
    assert_eq!(outcome.redirect(), "/login");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_oauth_callback_signs_in() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let session = SessionContext::new(client_for(&server, store.clone()));

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": profile_json() })))
        .mount(&server)
        .await;

    let outcome = session.complete_oauth_callback("?accessToken=a1&refreshToken=r1").await.unwrap();
    assert_eq!(outcome.redirect(), "/");
    assert!(session.has_role("admin"));
    assert_eq!(store.load().unwrap().unwrap().refresh_token, "r1");
}

#[tokio::test]
async fn test_restore_renews_an_expired_token_once() {
    let server = MockServer::start().await;
    let store = stored("old", "refresh-1");
    let session = SessionContext::new(client_for(&server, store.clone()));

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "expired" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "accessToken": "new", "refreshToken": "refresh-2" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": profile_json() })))
        .mount(&server)
        .await;

    let state = session.restore().await.unwrap();
    assert!(state.is_authenticated());
    assert_eq!(store.load().unwrap().unwrap().refresh_token, "refresh-2");
}

#[tokio::test]
async fn test_restore_without_credentials_is_anonymous() {
    let server = MockServer::start().await;
    let session = SessionContext::new(client_for(&server, Arc::new(MemoryCredentialStore::new())));

    assert_eq!(session.restore().await.unwrap(), SessionState::Anonymous);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_duplicate_group_name_blocks_wizard_before_any_post() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let notices = Arc::new(NoticeLog::new());
    let workflows = GroupWorkflows::new(client, notices.clone());

    Mock::given(method("GET"))
        .and(path("/group"))
        .and(query_param("search", "engineering"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "g1",
                "name": "Engineering",
                "created_at": "2024-05-01T08:00:00Z",
                "updated_at": "2024-05-01T08:00:00Z"
            }],
            "meta": { "total": 1, "totalPages": 1 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/group/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut wizard = GroupWizard::create();
    wizard.set_name("engineering").unwrap();
    assert!(!workflows.advance(&mut wizard).await.unwrap());
    assert_eq!(wizard.step(), WizardStep::Details);
    assert_eq!(wizard.errors().get("name"), Some(NAME_TAKEN));
    assert!(notices.notices().is_empty());
}

#[tokio::test]
async fn test_wizard_creates_group_with_members() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let notices = Arc::new(NoticeLog::new());
    let workflows = GroupWorkflows::new(client, notices.clone());

    Mock::given(method("GET"))
        .and(path("/group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [], "meta": { "total": 0, "totalPages": 0 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/group/create"))
        .and(body_json(json!({ "name": "Design", "description": "", "users": [{ "id": "u2" }] })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut wizard = GroupWizard::create();
    wizard.set_name("Design").unwrap();
    assert!(workflows.advance(&mut wizard).await.unwrap());
    let member: User = serde_json::from_value(user_json("u2")).unwrap();
    wizard.add_member(member).unwrap();
    workflows.submit(&mut wizard, None).await.unwrap();

    assert_eq!(wizard.step(), WizardStep::Closed);
    let notices = notices.drain();
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_remove_member_drops_exactly_that_member() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let notices = Arc::new(NoticeLog::new());
    let workflows = GroupWorkflows::new(Arc::clone(&client), notices.clone());

    Mock::given(method("GET"))
        .and(path("/user/g1/get-by-group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_page(&["u1", "u2", "u3"])))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/g1/get-by-group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_page(&["u1", "u3"])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/group/group-user/g1/edit"))
        .and(body_json(json!({ "users": [{ "id": "u1" }, { "id": "u3" }] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let list = ListView::<User>::mount(
        Arc::new(Collection::<User>::group_members(client, "g1")),
        "/groups/g1",
        "",
        notices.clone(),
    );
    list.refresh().await.unwrap();
    assert_eq!(list.snapshot().await.page.items.len(), 3);

    workflows.remove_member("g1", "u2", Some(&list)).await.unwrap();
    let ids: Vec<String> = list.snapshot().await.page.items.into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["u1", "u3"]);

    list.refresh().await.unwrap();
    let ids: Vec<String> = list.snapshot().await.page.items.into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["u1", "u3"]);
    assert_eq!(notices.drain()[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_remove_unknown_member_is_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let notices = Arc::new(NoticeLog::new());
    let workflows = GroupWorkflows::new(client, notices.clone());

    Mock::given(method("GET"))
        .and(path("/user/g1/get-by-group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_page(&["u1"])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/group/group-user/g1/edit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = workflows.remove_member("g1", "u9", None).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(notices.drain()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_logout_clears_unreadable_credentials_file() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let file = dir.path().join("credentials.json");
    std::fs::write(&file, "{ not json").unwrap();
    let store = Arc::new(FileCredentialStore::new(file.clone()));
    let session = SessionContext::new(Arc::new(ApiClient::new(&ClientConfig::new(server.uri()), store).unwrap()));

    session.logout().await.unwrap();
    assert!(!file.exists());
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_that_cannot_store_tokens_stays_anonymous() {
    let server = MockServer::start().await;
    let client = Arc::new(ApiClient::new(&ClientConfig::new(server.uri()), Arc::new(ReadOnlyStore)).unwrap());
    let session = SessionContext::new(client);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": profile_json(),
                "credentials": { "accessToken": "acc", "refreshToken": "ref" }
            }
        })))
        .mount(&server)
        .await;

    let err = session.login("alice@example.com", "pw").await.unwrap_err();
    assert!(matches!(err, ServiceError::Credentials(_)), "{err:?}");
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_duplicate_name_on_a_later_search_page_blocks_wizard() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let workflows = GroupWorkflows::new(client, Arc::new(NoticeLog::new()));

    let near_misses: Vec<_> = (0..50).map(|n| group_json(&format!("g{n}"), &format!("Ops team {n}"))).collect();
    Mock::given(method("GET"))
        .and(path("/group"))
        .and(query_param("search", "ops"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": near_misses,
            "meta": { "total": 51, "totalPages": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/group"))
        .and(query_param("search", "ops"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [group_json("g99", "OPS")],
            "meta": { "total": 51, "totalPages": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/group/create"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut wizard = GroupWizard::create();
    wizard.set_name("ops").unwrap();
    assert!(!workflows.advance(&mut wizard).await.unwrap());
    assert_eq!(wizard.errors().get("name"), Some(NAME_TAKEN));
}

#[tokio::test]
async fn test_delete_succeeds_even_when_list_reload_fails() {
    let server = MockServer::start().await;
    let client = client_for(&server, stored("acc", "ref"));
    let notices = Arc::new(NoticeLog::new());
    let workflows = GroupWorkflows::new(Arc::clone(&client), notices.clone());

    Mock::given(method("DELETE"))
        .and(path("/group/g1/delete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/group"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })))
        .mount(&server)
        .await;

    let list = ListView::<Group>::mount(Arc::new(Collection::<Group>::of(client)), "/groups", "", notices.clone());
    workflows.delete_group("g1", Some(&list)).await.unwrap();

    let levels: Vec<NoticeLevel> = notices.drain().into_iter().map(|n| n.level).collect();
    assert_eq!(levels, vec![NoticeLevel::Success, NoticeLevel::Error]);
}
