//! Session state and single-flight login coordination.

use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tracing::{debug, info, instrument, warn};

use zabbix_core::{ApiTransport, AuthError, Credentials, Result};

type LoginFuture = Shared<BoxFuture<'static, std::result::Result<String, AuthError>>>;

/// Session for one configured datasource connection.
///
/// Owns the current API token and coalesces concurrent logins: any number
/// of callers hitting [`Session::login_once`] while a login is outstanding
/// attach to the same in-flight call and resolve with the same token. A
/// burst of expired-session failures therefore produces exactly one
/// `user.login` on the wire.
pub struct Session<T> {
    inner: Arc<SessionInner<T>>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<T> {
    transport: Arc<T>,
    credentials: Credentials,
    state: Mutex<SessionState>,
}

/// Shared mutable session state. Only ever locked for short non-awaiting
/// sections; the login itself runs outside the lock.
#[derive(Default)]
struct SessionState {
    /// Current token; `None` while anonymous.
    token: Option<String>,
    /// The in-flight login, if any. Cleared when it settles, on success
    /// and on failure alike, so a failed login never wedges the session.
    pending: Option<LoginFuture>,
}

impl<T: ApiTransport + 'static> Session<T> {
    /// Create an anonymous session.
    pub fn new(transport: Arc<T>, credentials: Credentials) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                credentials,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    /// Snapshot of the current token, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.inner.state.lock().unwrap().token.clone()
    }

    /// Log in, coalescing concurrent callers onto one in-flight attempt.
    ///
    /// If no login is outstanding, starts one; otherwise returns a handle
    /// to the pending attempt. All callers resolve with the same token or
    /// the same [`AuthError::LoginFailed`].
    pub async fn login_once(&self) -> Result<String> {
        let login = {
            let mut state = self.inner.state.lock().unwrap();
            match &state.pending {
                Some(pending) => {
                    debug!("login already in flight, attaching");
                    pending.clone()
                }
                None => {
                    let login = self.start_login();
                    state.pending = Some(login.clone());
                    login
                }
            }
        };

        Ok(login.await?)
    }

    /// Issue an uncoordinated login. Does not touch the pending slot;
    /// use [`Session::login_once`] unless a fresh token is required
    /// unconditionally.
    #[instrument(skip(self))]
    pub async fn login(&self) -> std::result::Result<String, AuthError> {
        info!("logging in to the Zabbix API");
        self.inner
            .transport
            .login(
                self.inner.credentials.username(),
                self.inner.credentials.password(),
            )
            .await
            .map_err(|err| AuthError::LoginFailed {
                message: err.to_string(),
            })
    }

    fn start_login(&self) -> LoginFuture {
        let session = self.clone();
        async move {
            let outcome = session.login().await;

            // Publish the token and clear the in-flight slot under one
            // lock acquisition: a reader must never observe the slot
            // empty while the token is still unset.
            let mut state = session.inner.state.lock().unwrap();
            state.pending = None;
            match outcome {
                Ok(token) => {
                    debug!("login succeeded");
                    state.token = Some(token.clone());
                    Ok(token)
                }
                Err(err) => {
                    warn!(%err, "login failed");
                    Err(err)
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().unwrap();
        f.debug_struct("Session")
            .field("authenticated", &state.token.is_some())
            .field("login_pending", &state.pending.is_some())
            .finish()
    }
}
