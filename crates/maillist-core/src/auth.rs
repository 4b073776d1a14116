//! Obtaining and caching an authorized Gmail session.

use crate::error::{Error, Result};
use crate::gmail::{GmailClient, MailApi, Profile};
use maillist_oauth::{ClientSecrets, LoopbackLogin, Token, TokenStore};
use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// The `OAuth2` and HTTP machinery behind an [`Authenticator`].
pub trait Backend: Debug + Clone + Send + Sync + 'static {
    /// API client produced by [`Backend::connect`].
    type Client: MailApi + Clone + 'static;

    /// Runs an interactive login.
    fn authorize(&self, secrets: &ClientSecrets) -> impl Future<Output = Result<Token>> + Send;

    /// Exchanges the token's refresh token for a new access token.
    fn refresh(
        &self,
        secrets: &ClientSecrets,
        token: &Token,
    ) -> impl Future<Output = Result<Token>> + Send;

    /// Builds an API client for `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn connect(&self, token: &Token) -> Result<Self::Client>;
}

/// Production backend: browser login and the Gmail REST API.
#[derive(Debug, Clone)]
pub struct GmailBackend {
    login_timeout: Duration,
}

impl GmailBackend {
    /// Creates a backend that waits up to `login_timeout` for the browser.
    #[must_use]
    pub const fn new(login_timeout: Duration) -> Self {
        Self { login_timeout }
    }
}

impl Backend for GmailBackend {
    type Client = GmailClient;

    async fn authorize(&self, secrets: &ClientSecrets) -> Result<Token> {
        let login = LoopbackLogin::new(secrets.client()?, self.login_timeout);
        login
            .authorize(|url| {
                info!("Opening browser for authorization");
                if let Err(e) = opener::open_browser(url.as_str()) {
                    warn!("Could not open a browser ({e}); visit {url}");
                }
            })
            .await
            .map_err(|e| {
                if e.is_abandoned() {
                    Error::AuthorizationIncomplete(e.to_string())
                } else {
                    e.into()
                }
            })
    }

    async fn refresh(&self, secrets: &ClientSecrets, token: &Token) -> Result<Token> {
        Ok(secrets.client()?.refresh_token(token).await?)
    }

    fn connect(&self, token: &Token) -> Result<GmailClient> {
        Ok(GmailClient::new(token))
    }
}

/// An authorized client and the account it belongs to.
#[derive(Debug, Clone)]
pub struct Session<C> {
    /// API client.
    pub client: C,
    /// Account profile, fetched once per authorization.
    pub profile: Profile,
}

/// Loads, refreshes or obtains a token and keeps the resulting session.
#[derive(Debug, Clone)]
pub struct Authenticator<B: Backend> {
    backend: B,
    credentials_path: PathBuf,
    store: TokenStore,
    session: Option<Session<B::Client>>,
}

impl<B: Backend> Authenticator<B> {
    /// Creates an authenticator reading the client registration from
    /// `credentials_path` and caching tokens at `token_path`.
    #[must_use]
    pub fn new(
        backend: B,
        credentials_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            credentials_path: credentials_path.into(),
            store: TokenStore::new(token_path),
            session: None,
        }
    }

    /// Client registration file.
    #[must_use]
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Current session, if authorized.
    #[must_use]
    pub const fn session(&self) -> Option<&Session<B::Client>> {
        self.session.as_ref()
    }

    /// API client of the current session.
    #[must_use]
    pub fn client(&self) -> Option<&B::Client> {
        self.session.as_ref().map(|s| &s.client)
    }

    /// Profile of the current session.
    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.session.as_ref().map(|s| &s.profile)
    }

    /// Authorizes and caches a session.
    ///
    /// A cached valid token is reused; an expired one is refreshed, falling
    /// back to an interactive login when the refresh fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] without a client registration
    /// file, [`Error::AuthorizationIncomplete`] if the user abandons the
    /// login, or the underlying failure otherwise.
    pub async fn start(&mut self) -> Result<Profile> {
        let secrets = match ClientSecrets::from_file(&self.credentials_path).await {
            Ok(secrets) => secrets,
            Err(maillist_oauth::Error::SecretsNotFound(path)) => {
                return Err(Error::ConfigurationMissing(path));
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.obtain_token(&secrets).await?;
        self.store.save(&token).await?;

        let client = self.backend.connect(&token)?;
        let profile = client.get_profile().await?;
        info!("Authorized as {}", profile.email_address);

        self.session = Some(Session {
            client,
            profile: profile.clone(),
        });
        Ok(profile)
    }

    async fn obtain_token(&self, secrets: &ClientSecrets) -> Result<Token> {
        match self.store.load().await? {
            Some(token) if token.is_valid() => {
                debug!("Using cached token");
                Ok(token)
            }
            Some(token) if token.refresh_token.is_some() => {
                match self.backend.refresh(secrets, &token).await {
                    Ok(token) => Ok(token),
                    Err(e) => {
                        warn!("Token refresh failed, logging in again: {e}");
                        self.backend.authorize(secrets).await
                    }
                }
            }
            _ => self.backend.authorize(secrets).await,
        }
    }

    /// Forgets the session and moves the token file aside.
    ///
    /// Returns where the old token went; a missing token file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file exists but cannot be moved.
    pub async fn remove(&mut self) -> Result<Option<PathBuf>> {
        self.forget();
        Ok(self.store.invalidate().await?)
    }

    /// Drops the cached session, leaving the token file alone.
    pub fn forget(&mut self) {
        self.session = None;
    }

    /// [`remove`](Self::remove) followed by [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// See [`Authenticator::start`].
    pub async fn restart(&mut self) -> Result<Profile> {
        self.remove().await?;
        self.start().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compose::RawMessage;
    use crate::gmail::{ApiError, Receipt};
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct StubClient;

    impl MailApi for StubClient {
        async fn get_profile(&self) -> std::result::Result<Profile, ApiError> {
            Ok(Profile {
                email_address: "me@x.com".into(),
                messages_total: 0,
                threads_total: 0,
                history_id: "1".into(),
            })
        }

        async fn send(&self, _: &str, _: &RawMessage) -> std::result::Result<Receipt, ApiError> {
            Err(ApiError::Transport("unused".into()))
        }
    }

    #[derive(Debug, Clone, Default)]
    struct StubBackend {
        logins: Arc<AtomicUsize>,
        refreshes: Arc<AtomicUsize>,
        refresh_fails: bool,
        deny: bool,
    }

    impl Backend for StubBackend {
        type Client = StubClient;

        async fn authorize(&self, _: &ClientSecrets) -> Result<Token> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if self.deny {
                return Err(Error::AuthorizationIncomplete("denied".into()));
            }
            Ok(Token::new("fresh", "Bearer")
                .with_refresh_token("r")
                .with_expires_at(Utc::now() + ChronoDuration::hours(1)))
        }

        async fn refresh(&self, _: &ClientSecrets, _: &Token) -> Result<Token> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.refresh_fails {
                return Err(maillist_oauth::Error::oauth_error("invalid_grant", "revoked").into());
            }
            Ok(Token::new("refreshed", "Bearer"))
        }

        fn connect(&self, _: &Token) -> Result<StubClient> {
            Ok(StubClient)
        }
    }

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "maillist-auth-{name}-{}",
                std::process::id()
            ));
            let _ = std::fs::remove_dir_all(&dir);
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn with_credentials(name: &str) -> Self {
            let scratch = Self::new(name);
            std::fs::write(
                scratch.credentials(),
                r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#,
            )
            .unwrap();
            scratch
        }

        fn credentials(&self) -> PathBuf {
            self.0.join("credentials.json")
        }

        fn token(&self) -> PathBuf {
            self.0.join("token.json")
        }

        fn authenticator(&self, backend: StubBackend) -> Authenticator<StubBackend> {
            Authenticator::new(backend, self.credentials(), self.token())
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    async fn cached_token(scratch: &Scratch) -> Token {
        TokenStore::new(scratch.token()).load().await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let scratch = Scratch::new("missing");
        let mut auth = scratch.authenticator(StubBackend::default());

        let result = auth.start().await;
        assert!(matches!(result, Err(Error::ConfigurationMissing(p)) if p == scratch.credentials()));
        assert!(auth.session().is_none());
    }

    #[tokio::test]
    async fn test_first_login_saves_token() {
        let scratch = Scratch::with_credentials("first");
        let backend = StubBackend::default();
        let mut auth = scratch.authenticator(backend.clone());

        let profile = auth.start().await.unwrap();
        assert_eq!(profile.email_address, "me@x.com");
        assert_eq!(auth.profile(), Some(&profile));
        assert!(auth.client().is_some());
        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
        assert_eq!(cached_token(&scratch).await.access_token, "fresh");

        // A valid cached token skips the login
        auth.start().await.unwrap();
        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let scratch = Scratch::with_credentials("refresh");
        let expired = Token::new("old", "Bearer")
            .with_refresh_token("r")
            .with_expires_at(Utc::now() - ChronoDuration::hours(1));
        TokenStore::new(scratch.token()).save(&expired).await.unwrap();

        let backend = StubBackend::default();
        scratch.authenticator(backend.clone()).start().await.unwrap();

        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(backend.logins.load(Ordering::SeqCst), 0);
        assert_eq!(cached_token(&scratch).await.access_token, "refreshed");
    }

    #[tokio::test]
    async fn test_rejected_refresh_falls_back_to_login() {
        let scratch = Scratch::with_credentials("revoked");
        let expired = Token::new("old", "Bearer")
            .with_refresh_token("r")
            .with_expires_at(Utc::now() - ChronoDuration::hours(1));
        TokenStore::new(scratch.token()).save(&expired).await.unwrap();

        let backend = StubBackend {
            refresh_fails: true,
            ..StubBackend::default()
        };
        scratch.authenticator(backend.clone()).start().await.unwrap();

        assert_eq!(backend.logins.load(Ordering::SeqCst), 1);
        assert_eq!(cached_token(&scratch).await.access_token, "fresh");
    }

    #[tokio::test]
    async fn test_abandoned_login() {
        let scratch = Scratch::with_credentials("denied");
        let backend = StubBackend {
            deny: true,
            ..StubBackend::default()
        };
        let mut auth = scratch.authenticator(backend);

        assert!(matches!(auth.start().await, Err(Error::AuthorizationIncomplete(_))));
        assert!(!scratch.token().exists());
    }

    #[tokio::test]
    async fn test_remove_without_token_is_ok() {
        let scratch = Scratch::with_credentials("remove-none");
        let mut auth = scratch.authenticator(StubBackend::default());
        assert_eq!(auth.remove().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restart_forces_new_login() {
        let scratch = Scratch::with_credentials("restart");
        let backend = StubBackend::default();
        let mut auth = scratch.authenticator(backend.clone());

        auth.start().await.unwrap();
        auth.restart().await.unwrap();

        assert_eq!(backend.logins.load(Ordering::SeqCst), 2);
        assert!(scratch.0.join("token-old.json").exists());
        assert!(auth.session().is_some());
    }
}
