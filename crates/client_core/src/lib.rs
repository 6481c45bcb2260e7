use std::sync::Arc;

use shared::domain::UserId;
use shared::protocol::{
    AdminUserRow, AdminUserUpdate, Credentials, Page, ProfileSummary, ProfileUpdate,
};
use tokio::sync::broadcast;
use tracing::info;

pub mod admin;
pub mod dialog;
pub mod error;
pub mod gateway;
mod listing;
pub mod search;
pub mod session;

pub use admin::{AdminController, AdminEditForm};
pub use dialog::{DialogId, DialogManager};
pub use error::ClientError;
pub use gateway::Gateway;
pub use search::{SearchController, SearchForm};
pub use session::{Session, SessionController};

/// Synchronous gate for destructive actions. The frontend decides how the
/// question is asked; returning false declines the action before any request
/// is issued.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Declines everything; the safe default for frontends without a prompt.
pub struct DeclineAll;

impl ConfirmationPrompt for DeclineAll {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Confirms everything; for non-interactive frontends and tests.
pub struct ConfirmAll;

impl ConfirmationPrompt for ConfirmAll {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Profile,
    Admin,
}

/// View intents published by the core. Rendering them (regions, toasts,
/// navigation) is entirely the frontend's business.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    SessionChanged,
    SearchPage(Page<ProfileSummary>),
    AdminPage(Page<AdminUserRow>),
    Toast(String),
    Navigate(Route),
}

/// Facade over the controllers: the Rust counterpart of the original
/// frontend's top-level UI event handlers, and the single place where a
/// failure becomes a user-visible notification. Controller state is left
/// untouched by failed handlers.
pub struct MarketClient {
    pub session: Arc<SessionController>,
    pub search: Arc<SearchController>,
    pub admin: Arc<AdminController>,
    pub dialogs: Arc<DialogManager>,
    confirm: Arc<dyn ConfirmationPrompt>,
    events: broadcast::Sender<ClientEvent>,
}

impl MarketClient {
    pub fn new(
        base_url: impl Into<String>,
        confirm: Arc<dyn ConfirmationPrompt>,
    ) -> Result<Self, ClientError> {
        let gateway = Arc::new(Gateway::new(base_url)?);
        let (events, _) = broadcast::channel(64);
        let session = Arc::new(SessionController::new(gateway.clone(), events.clone()));
        let dialogs = Arc::new(DialogManager::default());
        let search = Arc::new(SearchController::new(gateway.clone(), events.clone()));
        let admin = Arc::new(AdminController::new(
            gateway,
            session.clone(),
            dialogs.clone(),
            events.clone(),
        ));
        Ok(Self {
            session,
            search,
            admin,
            dialogs,
            confirm,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Application boot: materialize the session (absence tolerated), then
    /// load the first page of the public listing.
    pub async fn start(&self) {
        if let Err(err) = self.session.refresh().await {
            info!(%err, "no session at startup");
        }
        if let Err(err) = self.search.load(1).await {
            self.report(err);
        }
    }

    pub async fn submit_login(&self, credentials: &Credentials) {
        let result = async {
            self.session.login(credentials).await?;
            self.dialogs.close(DialogId::Login);
            self.session.refresh().await?;
            Ok::<_, ClientError>(())
        }
        .await;
        match result {
            Ok(()) => self.toast("Вход выполнен"),
            Err(err) => self.report(err),
        }
    }

    pub async fn submit_register(&self, credentials: &Credentials) {
        let result = async {
            self.session.register(credentials).await?;
            self.dialogs.close(DialogId::Register);
            self.session.refresh().await?;
            Ok::<_, ClientError>(())
        }
        .await;
        match result {
            Ok(()) => {
                self.toast("Аккаунт создан. Заполни анкету в профиле.");
                self.navigate(Route::Profile);
            }
            Err(err) => self.report(err),
        }
    }

    pub async fn submit_search(&self, form: SearchForm) {
        if let Err(err) = self.search.submit(form).await {
            self.report(err);
        }
    }

    pub async fn reset_search(&self) {
        if let Err(err) = self.search.reset().await {
            self.report(err);
        }
    }

    pub async fn next_page(&self) {
        if let Err(err) = self.search.next_page().await {
            self.report(err);
        }
    }

    pub async fn prev_page(&self) {
        if let Err(err) = self.search.prev_page().await {
            self.report(err);
        }
    }

    pub async fn save_profile(&self, update: &ProfileUpdate) {
        let result = async {
            self.session.update_profile(update).await?;
            self.session.refresh().await
        }
        .await;
        match result {
            Ok(()) => self.toast("Сохранено"),
            Err(err) => self.report(err),
        }
    }

    pub async fn set_hidden(&self, is_hidden: bool) {
        let result = async {
            self.session.set_hidden(is_hidden).await?;
            self.session.refresh().await
        }
        .await;
        match result {
            Ok(()) => self.toast(if is_hidden {
                "Анкета скрыта"
            } else {
                "Анкета видна в поиске"
            }),
            Err(err) => self.report(err),
        }
    }

    pub async fn logout(&self) {
        match self.session.logout().await {
            Ok(()) => {
                self.toast("Вы вышли");
                self.navigate(Route::Index);
            }
            Err(err) => self.report(err),
        }
    }

    pub async fn delete_account(&self) {
        match self.session.delete_self(self.confirm.as_ref()).await {
            Ok(()) => {
                self.toast("Аккаунт удалён");
                self.navigate(Route::Index);
            }
            Err(err) => self.report(err),
        }
    }

    /// Entering the admin view: non-admins are turned away with a toast and
    /// a redirect to the public listing, without any request being issued.
    pub async fn open_admin(&self) {
        if !self.session.is_admin().await {
            self.toast(error::ADMIN_REQUIRED);
            self.navigate(Route::Index);
            return;
        }
        if let Err(err) = self.admin.list_page(1).await {
            self.report(err);
        }
    }

    pub async fn admin_next_page(&self) {
        if let Err(err) = self.admin.next_page().await {
            self.report(err);
        }
    }

    pub async fn admin_prev_page(&self) {
        if let Err(err) = self.admin.prev_page().await {
            self.report(err);
        }
    }

    pub async fn admin_open_editor(&self, user_id: UserId) -> Option<AdminEditForm> {
        match self.admin.open_editor(user_id).await {
            Ok(form) => form,
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    pub async fn admin_save_edit(&self, user_id: UserId, update: &AdminUserUpdate) {
        match self.admin.save_edit(user_id, update).await {
            Ok(()) => self.toast("Сохранено"),
            Err(err) => self.report(err),
        }
    }

    pub async fn admin_delete_user(&self, user_id: UserId) {
        match self.admin.delete_user(user_id, self.confirm.as_ref()).await {
            Ok(()) => self.toast("Удалено"),
            Err(err) => self.report(err),
        }
    }

    fn toast(&self, message: impl Into<String>) {
        let _ = self.events.send(ClientEvent::Toast(message.into()));
    }

    fn navigate(&self, route: Route) {
        let _ = self.events.send(ClientEvent::Navigate(route));
    }

    /// Single conversion point from a failure to a notification. A declined
    /// confirmation is not an error the user needs to hear about.
    fn report(&self, err: ClientError) {
        if !err.is_cancelled() {
            self.toast(err.to_string());
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod gateway_tests;

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod session_tests;

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod search_tests;

#[cfg(test)]
#[path = "tests/admin_tests.rs"]
mod admin_tests;

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod client_tests;
