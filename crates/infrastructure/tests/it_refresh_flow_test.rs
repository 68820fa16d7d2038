//! End-to-end dispatcher tests against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use futures::future::join_all;
use mockito::{Matcher, Server, ServerGuard};
use relay_application::{
    AuthError, AuthGateway, Authenticator, CredentialStore, DispatchError, Dispatcher,
    RefreshError, TokenRefresher,
};
use relay_domain::{ClientSettings, Credential, Navigation, RequestSpec, UserRole};
use relay_infrastructure::{
    FileCredentialStore, HttpAuthClient, ReqwestHttpClient, SignInRedirector, TokioFileSystem,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

struct Client {
    dispatcher: Dispatcher<ReqwestHttpClient>,
    store: Arc<FileCredentialStore<TokioFileSystem>>,
    navigations: UnboundedReceiver<Navigation>,
    auth: Arc<HttpAuthClient>,
    settings: ClientSettings,
    _dir: TempDir,
}

async fn client(server: &ServerGuard, stored: Option<Credential>) -> Client {
    let dir = TempDir::new().unwrap();
    let settings = ClientSettings::with_base_url(format!("{}/api", server.url()));

    let store = Arc::new(
        FileCredentialStore::open(TokioFileSystem::new(), dir.path().join("credentials.json"))
            .await
            .unwrap(),
    );
    if let Some(credential) = stored {
        store.set(credential).await.unwrap();
    }

    let auth = Arc::new(HttpAuthClient::new(settings.clone()).unwrap());
    let (redirector, navigations) = SignInRedirector::new(settings.sign_in_route.clone());
    let dispatcher = Dispatcher::new(
        ReqwestHttpClient::new(settings.clone()).unwrap(),
        Arc::clone(&store) as Arc<dyn CredentialStore>,
        Arc::clone(&auth) as Arc<dyn TokenRefresher>,
        Arc::new(redirector),
    );

    Client {
        dispatcher,
        store,
        navigations,
        auth,
        settings,
        _dir: dir,
    }
}

#[tokio::test]
async fn concurrent_expired_requests_share_one_refresh() {
    //* Given
    let mut server = Server::new_async().await;

    let expired = server
        .mock("GET", Matcher::Regex(r"^/api/(campaigns|profile|notifications)$".to_string()))
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(r#"{"detail":"Token expired"}"#)
        .expect(3)
        .create_async()
        .await;
    let fresh = server
        .mock("GET", Matcher::Regex(r"^/api/(campaigns|profile|notifications)$".to_string()))
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true}"#)
        .expect(3)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .match_body(Matcher::JsonString(r#"{"refresh_token":"R1"}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"A2","refresh_token":"R2","token_type":"bearer"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, Some(Credential::new("A1", "R1"))).await;

    //* When
    let responses = join_all(
        ["/campaigns", "/profile", "/notifications"]
            .into_iter()
            .map(|path| client.dispatcher.send(RequestSpec::get(path))),
    )
    .await;

    //* Then
    for response in responses {
        assert_eq!(response.unwrap().status.as_u16(), 200);
    }
    refresh.assert_async().await;
    expired.assert_async().await;
    fresh.assert_async().await;

    let reopened = FileCredentialStore::open(TokioFileSystem::new(), client.store.path())
        .await
        .unwrap();
    assert_eq!(reopened.get().await, Some(Credential::new("A2", "R2")));
}

#[tokio::test]
async fn rejected_refresh_ends_session_and_redirects() {
    //* Given
    let mut server = Server::new_async().await;

    let _expired = server
        .mock("GET", Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .with_status(401)
        .with_body(r#"{"detail":"Invalid refresh token"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut client = client(&server, Some(Credential::new("A1", "R1"))).await;

    //* When
    let err = client
        .dispatcher
        .send(RequestSpec::get("/campaigns"))
        .await
        .unwrap_err();

    //* Then
    refresh.assert_async().await;
    let DispatchError::RefreshFailed(RefreshError::Rejected { status, message }) = err else {
        panic!("expected a rejected refresh, got {err:?}");
    };
    assert_eq!(status, 401);
    assert_eq!(message, "Invalid refresh token");

    assert!(client.store.get().await.is_none());
    assert!(!client.store.path().exists());

    let navigation = client.navigations.recv().await.expect("redirect expected");
    assert_eq!(navigation.route, "/signin");
    assert!(client.navigations.try_recv().is_err());
}

#[tokio::test]
async fn login_then_fetch_current_user() {
    //* Given
    let mut server = Server::new_async().await;

    let login = server
        .mock("POST", "/api/auth/login")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".to_string(), "brand@demo.com".to_string()),
            Matcher::UrlEncoded("password".to_string(), "secret".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "access_token": "A1",
                "refresh_token": "R1",
                "token_type": "bearer",
                "user_id": "42",
                "email": "brand@demo.com",
                "role": "BRAND"
            }"#,
        )
        .expect(1)
        .create_async()
        .await;
    let me = server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer A1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"user_id":"42","email":"brand@demo.com","role":"BRAND"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, None).await;
    let authenticator = Authenticator::new(
        Arc::clone(&client.auth) as Arc<dyn AuthGateway>,
        client.dispatcher.clone(),
        client.settings.current_user_path.clone(),
    );

    //* When
    let user = authenticator.login("brand@demo.com", "secret").await.unwrap();
    let restored = authenticator.restore().await;

    //* Then
    login.assert_async().await;
    me.assert_async().await;
    assert_eq!(user.role, UserRole::Brand);
    assert_eq!(restored, Some(user));
    assert_eq!(
        client.store.get().await,
        Some(Credential::new("A1", "R1"))
    );
}

#[tokio::test]
async fn signup_error_surfaces_backend_detail() {
    //* Given
    let mut server = Server::new_async().await;

    let signup = server
        .mock("POST", "/api/auth/signup")
        .match_body(Matcher::PartialJsonString(
            r#"{"email":"taken@demo.com","role":"INFLUENCER"}"#.to_string(),
        ))
        .with_status(400)
        .with_body(r#"{"detail":"Email already registered"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server, None).await;
    let authenticator = Authenticator::new(
        Arc::clone(&client.auth) as Arc<dyn AuthGateway>,
        client.dispatcher.clone(),
        client.settings.current_user_path.clone(),
    );

    //* When
    let err = authenticator
        .signup("taken@demo.com", "pw", UserRole::Influencer)
        .await
        .unwrap_err();

    //* Then
    signup.assert_async().await;
    let AuthError::Rejected { status, message } = err else {
        panic!("expected rejection, got {err:?}");
    };
    assert_eq!(status, 400);
    assert_eq!(message, "Email already registered");
    assert!(client.store.get().await.is_none());
}
