//! Wires the adapters together and runs one command.

use std::sync::Arc;

use anyhow::{Context, Result};
use relay_application::{Authenticator, DispatchError, Dispatcher, TokenRefresher};
use relay_domain::{ClientSettings, Navigation, RequestBody, RequestSpec, ResponseSpec, SessionUser};
use relay_infrastructure::{
    FileCredentialStore, HttpAuthClient, ReqwestHttpClient, SignInRedirector, TokioFileSystem,
    default_credentials_path,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::cli::Command;

/// A fully wired client: one dispatcher, its authenticator, and the
/// navigation channel fed by forced logouts.
pub struct App {
    settings: ClientSettings,
    dispatcher: Dispatcher<ReqwestHttpClient>,
    authenticator: Authenticator<ReqwestHttpClient>,
    navigations: UnboundedReceiver<Navigation>,
}

impl App {
    /// Builds the client described by `settings`.
    pub async fn build(settings: ClientSettings) -> Result<Self> {
        let credentials_path = settings
            .credentials_path
            .clone()
            .or_else(default_credentials_path)
            .context("no data directory found; set credentials_path in the settings")?;
        let store = FileCredentialStore::open(TokioFileSystem::new(), credentials_path)
            .await
            .context("failed to open credential store")?;
        debug!(path = %store.path().display(), "using credential file");

        let auth = Arc::new(HttpAuthClient::new(settings.clone())?);
        let (redirector, navigations) = SignInRedirector::new(settings.sign_in_route.clone());
        let dispatcher = Dispatcher::new(
            ReqwestHttpClient::new(settings.clone())?,
            Arc::new(store),
            Arc::clone(&auth) as Arc<dyn TokenRefresher>,
            Arc::new(redirector),
        )
        .with_refresh_timeout(settings.refresh_timeout());
        let authenticator =
            Authenticator::new(auth, dispatcher.clone(), settings.current_user_path.clone());

        Ok(Self {
            settings,
            dispatcher,
            authenticator,
            navigations,
        })
    }

    /// Runs `command`, printing its outcome.
    pub async fn run(mut self, command: Command) -> Result<()> {
        let outcome = self.execute(command).await;
        while let Ok(navigation) = self.navigations.try_recv() {
            eprintln!(
                "Session ended ({}). Sign in again (client route {}).",
                navigation.reason, navigation.route
            );
        }
        outcome
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Login {
                email,
                password,
                admin,
            } => {
                let user = if admin {
                    self.authenticator.admin_login(&email, &password).await?
                } else {
                    self.authenticator.login(&email, &password).await?
                };
                print_user("Signed in as", &user);
            }
            Command::Signup {
                email,
                password,
                role,
            } => {
                let user = self.authenticator.signup(&email, &password, role).await?;
                print_user("Signed up as", &user);
            }
            Command::Google { code, role } => {
                let user = self.authenticator.google_auth(&code, role).await?;
                print_user("Signed in as", &user);
            }
            Command::Logout => {
                self.authenticator.logout().await;
                println!("Signed out.");
            }
            Command::Whoami => match self.authenticator.restore().await {
                Some(user) => print_user("Signed in as", &user),
                None => println!("Not signed in."),
            },
            Command::Send {
                method,
                path,
                headers,
                json,
                form,
            } => {
                let mut request = RequestSpec::new(method, path);
                for (name, value) in headers {
                    request = request.with_header(name, value);
                }
                if let Some(json) = json {
                    request = request.with_body(RequestBody::json(json));
                } else if !form.is_empty() {
                    request = request.with_body(RequestBody::form(form));
                }
                self.send(request).await?;
            }
        }
        Ok(())
    }

    async fn send(&self, request: RequestSpec) -> Result<()> {
        match self.dispatcher.send(request).await {
            Ok(response) => {
                print_response(&response);
                Ok(())
            }
            Err(DispatchError::Unauthorized(response)) => {
                print_response(&response);
                anyhow::bail!("request still unauthorized after refreshing the credential")
            }
            Err(error) if error.is_session_expired() => Err(error).with_context(|| {
                format!("session expired; sign in against {}", self.settings.base_url)
            }),
            Err(error) => Err(error.into()),
        }
    }
}

fn print_user(prefix: &str, user: &SessionUser) {
    println!("{prefix} {} ({}, id {})", user.email, user.role, user.id);
}

fn print_response(response: &ResponseSpec) {
    println!("{} ({})", response.status, response.duration_display());
    let body = response.text();
    if !body.is_empty() {
        println!("{body}");
    }
}
