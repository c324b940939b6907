//! Tests for the backend REST client.
//!
//! These tests use mock servers to verify request shapes and response
//! handling without a real project.

use serde_json::json;
use std::sync::Arc;
use verse_core::{AuthBackend, AuthState, BlobStore, DocPath, DocumentStore, VerseError};
use verse_firebase::{FirebaseClient, FirebaseConfig};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "musicverse-test.appspot.com";

fn client_for(server: &MockServer) -> FirebaseClient {
    let config = FirebaseConfig::new("test-key", server.uri(), BUCKET).with_base_url(&server.uri());
    FirebaseClient::new(config).expect("Failed to create client")
}

fn sign_in_body(id_token: &str, expires_in: &str) -> serde_json::Value {
    json!({
        "kind": "identitytoolkit#VerifyPasswordResponse",
        "localId": "uid-1",
        "email": "ada@example.com",
        "displayName": "",
        "idToken": id_token,
        "refreshToken": "refresh-1",
        "expiresIn": expires_in,
        "registered": true
    })
}

async fn mount_sign_in(server: &MockServer, id_token: &str, expires_in: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body(id_token, expires_in)))
        .mount(server)
        .await;
}

async fn signed_in_client(server: &MockServer) -> FirebaseClient {
    mount_sign_in(server, "id-token-1", "3600").await;
    let client = client_for(server);
    client
        .sign_in_with_password("ada@example.com", "secret1")
        .await
        .expect("Failed to sign in");
    client
}

fn identity_error(code: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": { "code": 400, "message": code, "errors": [] }
    }))
}

// =============================================================================
// Authentication Tests
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        mount_sign_in(&server, "id-token-1", "3600").await;

        let client = client_for(&server);
        let user = client
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(user.id.as_str(), "uid-1");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.display_name.is_none());
        assert!(client.is_authenticated().await);
        assert_eq!(client.refresh_token().await.as_deref(), Some("refresh-1"));
        assert_eq!(*client.auth_state().borrow(), AuthState::SignedIn(user));
    }

    #[tokio::test]
    async fn test_sign_in_sends_password_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(body_json(json!({
                "email": "ada@example.com",
                "password": "secret1",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("t", "3600")))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(identity_error("INVALID_LOGIN_CREDENTIALS"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .sign_in_with_password("ada@example.com", "wrong")
            .await
            .unwrap_err();

        match err {
            VerseError::Auth(msg) => assert_eq!(msg, "Invalid email or password."),
            other => panic!("Expected Auth error, got {other:?}"),
        }
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_sign_up_email_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(identity_error("EMAIL_EXISTS"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .create_account("ada@example.com", "secret1")
            .await
            .unwrap_err();

        assert_eq!(err.notice(), "Email is already in use.");
    }

    #[tokio::test]
    async fn test_provider_sign_in_posts_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithIdp"))
            .and(body_string_contains("id_token=google-token&providerId=google.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-g",
                "email": "grace@example.com",
                "displayName": "Grace",
                "photoUrl": "https://photos.example.com/grace.png",
                "idToken": "id-token-g",
                "refreshToken": "refresh-g",
                "expiresIn": "3600"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let user = client
            .sign_in_with_provider(&verse_core::FederatedCredential::new("google.com", "google-token"))
            .await
            .unwrap();

        assert_eq!(user.greeting_name(), "Grace");
        assert_eq!(
            user.photo_url.as_deref(),
            Some("https://photos.example.com/grace.png")
        );
    }

    #[tokio::test]
    async fn test_update_profile_requires_sign_in() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        let err = client.update_profile(Some("Ada"), None).await.unwrap_err();
        assert!(matches!(err, VerseError::SignInRequired));
    }

    #[tokio::test]
    async fn test_update_profile_publishes_new_user() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:update"))
            .and(body_string_contains("\"idToken\":\"id-token-1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "ada@example.com",
                "displayName": "Ada"
            })))
            .mount(&server)
            .await;

        let rx = client.auth_state();
        let user = client.update_profile(Some("Ada"), None).await.unwrap();

        assert_eq!(user.greeting_name(), "Ada");
        assert_eq!(rx.borrow().user().map(|u| u.greeting_name()), Some("Ada"));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;

        client.sign_out().await.unwrap();

        assert!(!client.is_authenticated().await);
        assert_eq!(*client.auth_state().borrow(), AuthState::SignedOut);
    }
}

// =============================================================================
// Session Restore Tests
// =============================================================================

mod session_restore {
    use super::*;

    #[tokio::test]
    async fn test_without_token_signs_out() {
        let server = MockServer::start().await;
        let client = client_for(&server);
        assert!(client.auth_state().borrow().is_loading());

        assert!(client.restore_session(None).await.is_none());
        assert_eq!(*client.auth_state().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_restores_from_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(query_param("key", "test-key"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=stored-refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "id-token-2",
                "refresh_token": "refresh-2",
                "user_id": "uid-1",
                "expires_in": "3600",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:lookup"))
            .and(body_json(json!({ "idToken": "id-token-2" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{ "localId": "uid-1", "email": "ada@example.com", "displayName": "Ada" }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let user = client.restore_session(Some("stored-refresh")).await.unwrap();

        assert_eq!(user.greeting_name(), "Ada");
        assert_eq!(client.refresh_token().await.as_deref(), Some("refresh-2"));
        assert!(client.auth_state().borrow().user().is_some());
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "TOKEN_EXPIRED" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);

        assert!(client.restore_session(Some("old")).await.is_none());
        assert_eq!(*client.auth_state().borrow(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_before_use() {
        let server = MockServer::start().await;
        // Shorter than the refresh margin, so the first request refreshes
        mount_sign_in(&server, "stale-token", "30").await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "fresh-token",
                "refresh_token": "refresh-2",
                "user_id": "uid-1",
                "expires_in": "3600"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/uid-1.json"))
            .and(query_param("auth", "fresh-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Ada" })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();

        let profile = DocPath::root("users").child("uid-1");
        assert!(client.get(&profile).await.unwrap().is_some());
        // Second read reuses the refreshed token
        assert!(client.get(&profile).await.unwrap().is_some());
    }
}

// =============================================================================
// Database Tests
// =============================================================================

mod database {
    use super::*;

    #[tokio::test]
    async fn test_get_attaches_auth_token() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("GET"))
            .and(path("/playlists/uid-1.json"))
            .and(query_param("auth", "id-token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "-Nabc": { "name": "Road Trip" }
            })))
            .mount(&server)
            .await;

        let value = client
            .get(&DocPath::root("playlists").child("uid-1"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(value["-Nabc"]["name"], "Road Trip");
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/music.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.get(&DocPath::root("music")).await.unwrap().is_none());

        // Signed out: no auth parameter
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].url.query().is_none());
    }

    #[tokio::test]
    async fn test_set_update_push() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("PUT"))
            .and(path("/users/uid-1.json"))
            .and(body_json(json!({ "name": "Ada" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Ada" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/playlists/uid-1/-Nabc.json"))
            .and(body_json(json!({ "name": "Night Drive" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Night Drive" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/playlists/uid-1.json"))
            .and(body_json(json!({ "name": "Road Trip" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nxyz" })))
            .expect(1)
            .mount(&server)
            .await;

        client
            .set(&DocPath::root("users").child("uid-1"), json!({ "name": "Ada" }))
            .await
            .unwrap();

        let mut fields = serde_json::Map::new();
        fields.insert("name".into(), json!("Night Drive"));
        client
            .update(&DocPath::root("playlists").child("uid-1").child("-Nabc"), fields)
            .await
            .unwrap();

        let key = client
            .push(&DocPath::root("playlists").child("uid-1"), json!({ "name": "Road Trip" }))
            .await
            .unwrap();
        assert_eq!(key, "-Nxyz");
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/music/1.json"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Permission denied" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .set(&DocPath::root("music").child("1"), json!({}))
            .await
            .unwrap_err();

        match err {
            VerseError::PermissionDenied(msg) => assert_eq!(msg, "Permission denied"),
            other => panic!("Expected PermissionDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/music.json"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.get(&DocPath::root("music")).await.unwrap_err();

        assert!(matches!(err, VerseError::Backend(_)));
        assert_eq!(err.notice(), "Something went wrong. Please try again.");
    }
}

// =============================================================================
// Storage Tests
// =============================================================================

mod storage {
    use super::*;

    #[tokio::test]
    async fn test_upload_media() {
        let server = MockServer::start().await;
        let client = signed_in_client(&server).await;
        Mock::given(method("POST"))
            .and(path(format!("/v0/b/{BUCKET}/o")))
            .and(query_param("uploadType", "media"))
            .and(query_param("name", "albumImages/cover.png"))
            .and(header("content-type", "image/png"))
            .and(header("authorization", "Bearer id-token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "albumImages/cover.png",
                "contentType": "image/png",
                "downloadTokens": "tok-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client
            .upload(
                &DocPath::root("albumImages").child("cover.png"),
                vec![0x89, 0x50, 0x4e, 0x47],
                "image/png",
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let upload = requests.last().unwrap();
        assert_eq!(upload.body, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn test_download_url_uses_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v0/b/{BUCKET}/o/musicFiles%2Fsong.mp3")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "musicFiles/song.mp3",
                "downloadTokens": "tok-9,tok-10"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client
            .download_url(&DocPath::root("musicFiles").child("song.mp3"))
            .await
            .unwrap();

        assert_eq!(
            url,
            format!(
                "{}/v0/b/{BUCKET}/o/musicFiles%2Fsong.mp3?alt=media&token=tok-9",
                server.uri()
            )
        );
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v0/b/{BUCKET}/o/musicFiles%2Fgone.mp3")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Not Found." }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .download_url(&DocPath::root("musicFiles").child("gone.mp3"))
            .await
            .unwrap_err();

        assert!(matches!(err, VerseError::NotFound { .. }));
    }
}

// =============================================================================
// Library Service Tests (REST backend end to end)
// =============================================================================

mod library_services {
    use super::*;
    use verse_library::{
        AuthSession, BlobFile, LibraryContext, PlaylistService, RegistrationForm, SyncState,
    };

    #[tokio::test]
    async fn test_create_playlist_round_trip() {
        let server = MockServer::start().await;
        let client = Arc::new(signed_in_client(&server).await);
        Mock::given(method("POST"))
            .and(path("/playlists/uid-1.json"))
            .and(query_param("auth", "id-token-1"))
            .and(body_json(json!({ "name": "Road Trip" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "-Nabc" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/playlists/uid-1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "-Nabc": { "name": "Road Trip" }
            })))
            .mount(&server)
            .await;

        let playlists = PlaylistService::new(LibraryContext::from_backend(client));
        let id = playlists.create_playlist("  Road Trip ").await.unwrap();

        assert_eq!(id.as_str(), "-Nabc");
        let entries = playlists.playlists().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].playlist.name, "Road Trip");
        assert_eq!(entries[0].sync, SyncState::Confirmed);
    }

    #[tokio::test]
    async fn test_register_uploads_photo_and_writes_profile() {
        let server = MockServer::start().await;
        let photo_object = "users%2Fuid-1%2FprofilePhoto";
        let photo_url = format!(
            "{}/v0/b/{BUCKET}/o/{photo_object}?alt=media&token=photo-tok",
            server.uri()
        );

        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_body("id-token-1", "3600")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/v0/b/{BUCKET}/o")))
            .and(query_param("name", "users/uid-1/profilePhoto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "users/uid-1/profilePhoto"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v0/b/{BUCKET}/o/{photo_object}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "users/uid-1/profilePhoto",
                "downloadTokens": "photo-tok"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:update"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-1",
                "email": "ada@example.com",
                "displayName": "Ada",
                "photoUrl": photo_url
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/uid-1.json"))
            .and(body_json(json!({
                "name": "Ada",
                "email": "ada@example.com",
                "profilePhoto": photo_url
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = Arc::new(client_for(&server));
        let session = AuthSession::new(LibraryContext::from_backend(client));
        let user = session
            .register(RegistrationForm {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "secret1".into(),
                confirm_password: "secret1".into(),
                photo: Some(BlobFile::new("me.png", "image/png", vec![1, 2, 3])),
            })
            .await
            .unwrap();

        assert_eq!(user.greeting_name(), "Ada");
        assert_eq!(user.photo_url.as_deref(), Some(photo_url.as_str()));
        assert_eq!(session.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_signed_out_playlist_creation_sends_nothing() {
        let server = MockServer::start().await;
        let client = Arc::new(client_for(&server));
        client.restore_session(None).await;

        let playlists = PlaylistService::new(LibraryContext::from_backend(client));
        let err = playlists.create_playlist("Road Trip").await.unwrap_err();

        assert!(matches!(err, VerseError::SignInRequired));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
