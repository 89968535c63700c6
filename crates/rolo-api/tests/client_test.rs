#![allow(clippy::unwrap_used)]
// Integration tests for `DirectoryClient` using wiremock.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rolo_api::{
    ContactRequest, DirectoryClient, Error, TransferFormat, LoginRequest, PageRequest, SortDir,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DirectoryClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let token: SecretString = "test-token".to_string().into();
    let client = DirectoryClient::with_client(reqwest::Client::new(), base_url, Arc::new(token));
    (server, client)
}

fn contact_json(id: u64, first: &str, last: &str) -> serde_json::Value {
    json!({
        "id": id,
        "firstName": first,
        "lastName": last,
        "title": "Manager",
        "emails": [{ "id": 1, "email": "a@x.com", "type": "WORK" }],
        "phones": [{ "id": 1, "phoneNumber": "+1234567890", "type": "PERSONAL" }],
        "userId": 42,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    })
}

fn page_envelope(content: Vec<serde_json::Value>, total: u64, size: u32) -> serde_json::Value {
    let total_pages = if total == 0 { 0 } else { total.div_ceil(u64::from(size)) };
    json!({
        "success": true,
        "message": "ok",
        "data": {
            "content": content,
            "totalElements": total,
            "totalPages": total_pages,
            "size": size,
            "number": 0,
            "first": true,
            "last": total <= u64::from(size),
            "empty": total == 0
        }
    })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    let envelope = json!({
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
    });

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let auth = client
        .login(&LoginRequest {
            username: "ada".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

    assert_eq!(auth.token, "jwt-abc");
    assert_eq!(auth.user.id, 42);
    assert_eq!(auth.user.first_name, "Ada");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid username or password"
        })))
        .mount(&server)
        .await;

    let result = client
        .login(&LoginRequest {
            username: "ada".into(),
            password: "wrong".into(),
        })
        .await;

    match result {
        Err(Error::Authorization { status, ref message }) => {
            assert_eq!(status, 401);
            assert!(message.contains("Invalid"), "got: {message}");
        }
        other => panic!("expected Authorization error, got: {other:?}"),
    }
}

// ── Listing & pagination ────────────────────────────────────────────

#[tokio::test]
async fn test_list_attaches_bearer_token_and_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("page", "0"))
        .and(query_param("size", "10"))
        .and(query_param("sortDir", "ASC"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_envelope(vec![contact_json(1, "Ada", "Lovelace")], 1, 10)),
        )
        .mount(&server)
        .await;

    let page = client.list_contacts(&PageRequest::default()).await.unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].first_name, "Ada");
    assert_eq!(page.total_elements, 1);
}

#[tokio::test]
async fn test_page_invariants_hold() {
    let (server, client) = setup().await;

    let content: Vec<_> = (1..=5)
        .map(|i| contact_json(i, "C", &format!("N{i}")))
        .collect();
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_envelope(content, 23, 5)))
        .mount(&server)
        .await;

    let request = PageRequest {
        page: 0,
        size: 5,
        sort_by: Some("lastName".into()),
        sort_dir: SortDir::Asc,
    };
    let page = client.list_contacts(&request).await.unwrap();

    assert!(page.content.len() <= page.size as usize);
    assert_eq!(page.number, request.page);
    assert_eq!(
        u64::from(page.total_pages),
        page.total_elements.div_ceil(u64::from(page.size))
    );
}

#[tokio::test]
async fn test_search_sends_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/search"))
        .and(query_param("query", "ali"))
        .and(query_param("page", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_envelope(vec![], 0, 10)))
        .mount(&server)
        .await;

    let page = client
        .search_contacts("ali", &PageRequest::default())
        .await
        .unwrap();

    assert!(page.empty);
    assert_eq!(page.total_pages, 0);
}

// ── Mutations & error classification ────────────────────────────────

#[tokio::test]
async fn test_create_validation_error_carries_fields() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": { "emails": "at least one email is required" }
        })))
        .mount(&server)
        .await;

    let request = ContactRequest {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        title: None,
        emails: vec![],
        phones: vec![],
    };
    let err = client.create_contact(&request).await.unwrap_err();

    assert!(err.is_validation());
    let fields = err.field_errors().unwrap();
    assert!(fields.contains_key("emails"));
}

#[tokio::test]
async fn test_get_missing_contact_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Contact not found with id: 999"
        })))
        .mount(&server)
        .await;

    let err = client.get_contact(999).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/contacts/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.delete_contact(7).await.unwrap_err();
    assert!(err.is_transient());
    assert!(!err.is_authorization());
}

#[tokio::test]
async fn test_envelope_failure_on_200() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "unexpected condition",
            "data": null
        })))
        .mount(&server)
        .await;

    match client.get_contact(1).await {
        Err(Error::Api { ref message }) => assert!(message.contains("unexpected")),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Import / export ─────────────────────────────────────────────────

#[tokio::test]
async fn test_import_json_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/contacts/import/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Imported 2 contacts",
            "data": [contact_json(1, "Ada", "Lovelace"), contact_json(2, "Alan", "Turing")]
        })))
        .mount(&server)
        .await;

    let bytes = br#"[{"firstName":"Ada","lastName":"Lovelace","emails":[],"phones":[]}]"#.to_vec();
    let created = client
        .import_contacts(TransferFormat::Json, "contacts.json", bytes)
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[1].first_name, "Alan");
}

#[tokio::test]
async fn test_export_csv_is_raw_blob() {
    let (server, client) = setup().await;

    let blob = "First Name,Last Name,Title,Emails,Phones\nAda,Lovelace,,,\n";
    Mock::given(method("GET"))
        .and(path("/contacts/export/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string(blob))
        .mount(&server)
        .await;

    let bytes = client.export_contacts(TransferFormat::Csv).await.unwrap();
    assert_eq!(bytes, blob.as_bytes());
}

#[tokio::test]
async fn test_export_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/export/json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.export_contacts(TransferFormat::Json).await.unwrap_err();
    assert!(err.is_authorization());
}
