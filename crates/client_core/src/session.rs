use std::sync::Arc;

use serde_json::json;
use shared::protocol::{Credentials, Identity, MeResponse, ProfileUpdate};
use tokio::sync::{broadcast, RwLock};
use tracing::info;

use crate::error::{ClientError, ADMIN_REQUIRED, AUTH_REQUIRED};
use crate::gateway::Gateway;
use crate::{ClientEvent, ConfirmationPrompt};

/// Two-state session machine. Encoding the identity inside the
/// `Authenticated` variant makes `authenticated == identity present`
/// impossible to violate.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl Session {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

/// Sole owner of session truth. Local state is never updated optimistically:
/// every mutating auth action is followed by a [`SessionController::refresh`]
/// that replaces the state wholesale with what the server reports.
pub struct SessionController {
    gateway: Arc<Gateway>,
    state: RwLock<Session>,
    events: broadcast::Sender<ClientEvent>,
}

impl SessionController {
    pub(crate) fn new(gateway: Arc<Gateway>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            gateway,
            state: RwLock::new(Session::Anonymous),
            events,
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// True only for an authenticated identity carrying the admin flag.
    /// Consulted fresh on every privileged call; the flag is never cached
    /// outside the session state.
    pub async fn is_admin(&self) -> bool {
        matches!(&*self.state.read().await, Session::Authenticated(identity) if identity.is_admin)
    }

    /// Fetches the current identity and replaces local state with the
    /// result. Presence of a `user` object is the sole discriminant; any
    /// failure leaves the session Anonymous before the error propagates.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let result = self.gateway.get("/api/auth/me").await;
        let next = match &result {
            Ok(value) => serde_json::from_value::<MeResponse>(value.clone())
                .ok()
                .and_then(|response| response.user)
                .map(Session::Authenticated)
                .unwrap_or_default(),
            Err(_) => Session::Anonymous,
        };
        self.replace(next).await;
        result.map(|_| ())
    }

    /// Authenticates on the server without touching local state; the caller
    /// is responsible for the follow-up `refresh()`.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.gateway
            .post("/api/auth/login", credentials)
            .await
            .map(|_| ())
    }

    /// Creates an account; same refresh obligation as [`Self::login`].
    pub async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.gateway
            .post("/api/auth/register", credentials)
            .await
            .map(|_| ())
    }

    /// Ends the session. Local state clears to Anonymous unconditionally,
    /// even when the server call fails; logout is idempotent from the
    /// client's point of view.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.gateway.post_empty("/api/auth/logout").await;
        self.replace(Session::Anonymous).await;
        result.map(|_| ())
    }

    /// Deletes the own account after the destructive-action gate. Declining
    /// produces [`ClientError::Cancelled`] and issues no request.
    pub async fn delete_self(
        &self,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<(), ClientError> {
        self.ensure_authenticated().await?;
        if !prompt.confirm("Точно удалить аккаунт?") {
            return Err(ClientError::Cancelled);
        }
        self.gateway.delete("/api/me").await?;
        self.replace(Session::Anonymous).await;
        Ok(())
    }

    /// Saves the own service-provider profile. The caller refreshes
    /// afterwards; the identity is never patched locally.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ClientError> {
        self.ensure_authenticated().await?;
        self.gateway
            .put("/api/me/profile", update)
            .await
            .map(|_| ())
    }

    /// Toggles own listing visibility in the public search.
    pub async fn set_hidden(&self, is_hidden: bool) -> Result<(), ClientError> {
        self.ensure_authenticated().await?;
        self.gateway
            .patch("/api/me/hide", &json!({ "is_hidden": is_hidden }))
            .await
            .map(|_| ())
    }

    pub(crate) async fn ensure_authenticated(&self) -> Result<(), ClientError> {
        if self.is_authenticated().await {
            Ok(())
        } else {
            Err(ClientError::AuthorizationRequired {
                message: AUTH_REQUIRED,
            })
        }
    }

    pub(crate) async fn ensure_admin(&self) -> Result<(), ClientError> {
        if self.is_admin().await {
            Ok(())
        } else {
            Err(ClientError::AuthorizationRequired {
                message: ADMIN_REQUIRED,
            })
        }
    }

    async fn replace(&self, next: Session) {
        let mut state = self.state.write().await;
        match (&*state, &next) {
            (Session::Anonymous, Session::Authenticated(identity)) => {
                info!(login = %identity.login, "session authenticated");
            }
            (Session::Authenticated(_), Session::Anonymous) => {
                info!("session cleared");
            }
            _ => {}
        }
        *state = next;
        drop(state);
        let _ = self.events.send(ClientEvent::SessionChanged);
    }
}
