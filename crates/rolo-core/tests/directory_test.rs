#![allow(clippy::unwrap_used)]
// End-to-end tests for the `Directory` facade against a mock server.

use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rolo_api::TransferFormat;
use rolo_core::{CoreError, Directory, DirectoryConfig, ImportFile, QueryKey};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer, state_dir: &std::path::Path) -> DirectoryConfig {
    let mut config = DirectoryConfig::new(Url::parse(&server.uri()).unwrap());
    config.state_dir = Some(state_dir.to_path_buf());
    config
}

fn contact_json(id: u64, first: &str, last: &str) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": first,
        "lastName": last,
        "emails": [{ "id": 1, "email": "a@x.com", "type": "WORK" }],
        "phones": [{ "id": 1, "phoneNumber": "+1234567890", "type": "PERSONAL" }],
        "userId": 42,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    })
}

fn page_envelope(content: Vec<serde_json::Value>) -> serde_json::Value {
    let total = content.len();
    json!({
        "success": true,
        "message": "ok",
        "data": {
            "content": content,
            "totalElements": total,
            "totalPages": if total == 0 { 0 } else { 1 },
            "size": 10,
            "number": 0,
            "first": true,
            "last": true,
            "empty": total == 0
        }
    })
}

fn login_envelope() -> serde_json::Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": "jwt-abc",
            "type": "Bearer",
            "user": {
                "id": 42,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "active": true
            }
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_envelope()))
        .mount(server)
        .await;
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn login_establishes_session() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    assert!(!directory.session().is_authenticated());

    let user = directory.login("ada", "secret").await.unwrap();
    assert_eq!(user.first_name, "Ada");
    assert!(directory.session().is_authenticated());
}

#[tokio::test]
async fn rejected_login_leaves_session_empty() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid username or password"
        })))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    let err = directory.login("ada", "wrong").await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidCredentials { .. }));
    assert!(!directory.session().is_authenticated());
}

#[tokio::test]
async fn session_survives_restart() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    {
        let directory = Directory::new(&config(&server, state.path())).unwrap();
        directory.login("ada", "secret").await.unwrap();
    }

    // A fresh facade over the same state dir picks the session up and
    // sends the persisted token.
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "data": {
                "id": 42,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "active": true
            }
        })))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    assert!(directory.session().is_authenticated());
    let user = directory.me().await.unwrap();
    assert_eq!(user.id, 42);
}

#[tokio::test]
async fn logged_out_calls_fail_without_a_request() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    let err = directory.active_page().await.unwrap_err();

    assert!(matches!(err, CoreError::NotAuthenticated));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_token_expires_the_session() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/contacts/5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "ok",
                "data": contact_json(5, "Grace", "Hopper")
            })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/contacts/5"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Token expired"
        })))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    // Prime the detail cache, then hit the dead-token path.
    let contact = directory.contact(5).await.unwrap();
    let err = directory
        .update_contact(5, update_request(&contact))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::SessionExpired));
    assert!(!directory.session().is_authenticated());
    // A failed mutation invalidates nothing.
    let entry = directory.cache().peek(&QueryKey::Detail(5)).unwrap();
    assert!(!entry.stale);
}

fn update_request(contact: &rolo_api::Contact) -> rolo_api::ContactRequest {
    rolo_api::ContactRequest {
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        title: contact.title.clone(),
        emails: contact.emails.clone(),
        phones: contact.phones.clone(),
    }
}

// ── Cache & invalidation ────────────────────────────────────────────

#[tokio::test]
async fn listing_is_cached_until_a_mutation() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    // First fetch sees one contact; after the create, a refetch sees two.
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_envelope(vec![contact_json(1, "Ada", "Lovelace")])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_envelope(vec![
            contact_json(1, "Ada", "Lovelace"),
            contact_json(2, "Alan", "Turing"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "created",
            "data": contact_json(2, "Alan", "Turing")
        })))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    assert_eq!(directory.active_page().await.unwrap().content.len(), 1);
    // Cache hit: the exhausted first mock is not consulted again.
    assert_eq!(directory.active_page().await.unwrap().content.len(), 1);

    directory
        .create_contact(update_request(&directory.active_page().await.unwrap().content[0]))
        .await
        .unwrap();

    assert_eq!(directory.active_page().await.unwrap().content.len(), 2);
}

#[tokio::test]
async fn committed_search_uses_the_search_endpoint() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/contacts/search"))
        .and(query_param("query", "grace"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_envelope(vec![contact_json(5, "Grace", "Hopper")])),
        )
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    directory.search().commit("grace");
    let page = directory.active_page().await.unwrap();
    assert_eq!(page.content[0].first_name, "Grace");
}

// ── Import / export ─────────────────────────────────────────────────

#[tokio::test]
async fn malformed_import_never_reaches_the_server() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    let before = server.received_requests().await.unwrap().len();
    let file = ImportFile::from_bytes("contacts.csv", b"bogus,header\n1,2\n".to_vec()).unwrap();
    let err = directory.import(&file).await.unwrap_err();

    assert!(matches!(err, CoreError::MalformedImport { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test]
async fn import_uploads_and_invalidates_listings() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_envelope(vec![])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/contacts/import/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Imported 1 contacts",
            "data": [contact_json(9, "Ada", "Lovelace")]
        })))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    // Prime the listing cache so invalidation is observable.
    directory.active_page().await.unwrap();
    assert!(!directory
        .cache()
        .peek(&directory.search().active_key())
        .unwrap()
        .stale);

    let body = "First Name,Last Name,Title,Emails,Phones\n\
                Ada,Lovelace,,a@x.com (WORK),+1234567890 (HOME)\n";
    let file = ImportFile::from_bytes("contacts.csv", body.as_bytes().to_vec()).unwrap();
    let created = directory.import(&file).await.unwrap();

    assert_eq!(created.len(), 1);
    assert!(directory
        .cache()
        .peek(&directory.search().active_key())
        .unwrap()
        .stale);
}

#[tokio::test]
async fn export_passes_the_blob_through() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    let blob = "First Name,Last Name,Title,Emails,Phones\nAda,Lovelace,,,\n";
    Mock::given(method("GET"))
        .and(path("/contacts/export/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(blob))
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();

    let payload = directory.export(TransferFormat::Csv).await.unwrap();
    assert_eq!(payload.bytes, blob.as_bytes());
    assert_eq!(payload.file_name(), "contacts.csv");
}

// ── Logout ──────────────────────────────────────────────────────────

#[tokio::test]
async fn logout_drops_session_and_cache() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_envelope(vec![contact_json(1, "Ada", "Lovelace")])),
        )
        .mount(&server)
        .await;

    let directory = Directory::new(&config(&server, state.path())).unwrap();
    directory.login("ada", "secret").await.unwrap();
    directory.active_page().await.unwrap();
    let key = directory.search().active_key();
    assert!(directory.cache().peek(&key).is_some());

    directory.logout();

    assert!(!directory.session().is_authenticated());
    assert!(directory.cache().peek(&key).is_none());
    assert!(matches!(
        directory.active_page().await.unwrap_err(),
        CoreError::NotAuthenticated
    ));
}
