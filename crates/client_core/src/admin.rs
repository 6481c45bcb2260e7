use std::sync::Arc;

use shared::domain::{SERVICE_TYPES, UserId};
use shared::protocol::{AdminUserRow, AdminUserUpdate, Page};
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use crate::dialog::{DialogId, DialogManager};
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::listing::ListingState;
use crate::session::SessionController;
use crate::{ClientEvent, ConfirmationPrompt};

/// Prefilled editor form for one admin row, with the same fallbacks the
/// original frontend applies to unfilled profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminEditForm {
    pub id: UserId,
    pub name: String,
    pub service_type: String,
    pub experience_years: i64,
    pub price: i64,
    pub about: String,
    pub is_hidden: bool,
}

impl AdminEditForm {
    fn from_row(row: &AdminUserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone().unwrap_or_default(),
            service_type: row
                .service_type
                .clone()
                .unwrap_or_else(|| SERVICE_TYPES[0].to_string()),
            experience_years: row.experience_years.unwrap_or(0),
            price: row.price.unwrap_or(1000),
            about: row.about.clone().unwrap_or_default(),
            is_hidden: row.is_hidden,
        }
    }
}

/// Paginated administration of all user profiles. Strictly
/// re-fetch-for-consistency: a mutation is never merged into local state,
/// the affected page is always repainted from a reload, so server-derived
/// fields cannot diverge from what the client shows.
pub struct AdminController {
    gateway: Arc<Gateway>,
    session: Arc<SessionController>,
    dialogs: Arc<DialogManager>,
    listing: Mutex<ListingState<AdminUserRow>>,
    events: broadcast::Sender<ClientEvent>,
}

impl AdminController {
    pub(crate) fn new(
        gateway: Arc<Gateway>,
        session: Arc<SessionController>,
        dialogs: Arc<DialogManager>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Self {
        Self {
            gateway,
            session,
            dialogs,
            listing: Mutex::new(ListingState::default()),
            events,
        }
    }

    /// Loads one page of the admin listing. Refuses with
    /// `AuthorizationRequired` before any network I/O when the session is
    /// not an admin.
    pub async fn list_page(&self, page: u32) -> Result<(), ClientError> {
        self.session.ensure_admin().await?;
        let seq = self.listing.lock().await.begin();
        let value = self
            .gateway
            .get_query("/api/admin/users", &[("page", page.max(1).to_string())])
            .await?;
        let page: Page<AdminUserRow> = serde_json::from_value(value)?;
        let mut listing = self.listing.lock().await;
        if listing.apply(seq, page.clone()) {
            let _ = self.events.send(ClientEvent::AdminPage(page));
        } else {
            warn!(seq, "discarding stale admin listing response");
        }
        Ok(())
    }

    pub async fn next_page(&self) -> Result<(), ClientError> {
        let page = {
            let listing = self.listing.lock().await;
            if !listing.has_next() {
                return Ok(());
            }
            listing.cursor() + 1
        };
        self.list_page(page).await
    }

    pub async fn prev_page(&self) -> Result<(), ClientError> {
        let page = {
            let listing = self.listing.lock().await;
            if !listing.has_prev() {
                return Ok(());
            }
            listing.cursor().saturating_sub(1)
        };
        self.list_page(page).await
    }

    /// Prefills the editor for a row of the currently loaded page and opens
    /// the editor dialog. Editing is scoped to visible rows: an id that is
    /// not on the current page is a defined no-op returning `None`.
    pub async fn open_editor(
        &self,
        user_id: UserId,
    ) -> Result<Option<AdminEditForm>, ClientError> {
        self.session.ensure_admin().await?;
        let form = {
            let listing = self.listing.lock().await;
            listing
                .current()
                .and_then(|page| page.items.iter().find(|row| row.id == user_id))
                .map(AdminEditForm::from_row)
        };
        let Some(form) = form else {
            return Ok(None);
        };
        self.dialogs.open(DialogId::EditUser);
        Ok(Some(form))
    }

    /// Saves the full editable field set, closes the editor, and reloads the
    /// same page number so the table is repainted from server truth.
    pub async fn save_edit(
        &self,
        user_id: UserId,
        update: &AdminUserUpdate,
    ) -> Result<(), ClientError> {
        self.session.ensure_admin().await?;
        self.gateway
            .put(&format!("/api/admin/users/{}", user_id.0), update)
            .await?;
        self.dialogs.close(DialogId::EditUser);
        let page = self.listing.lock().await.cursor();
        self.list_page(page).await
    }

    /// Deletes a user after the destructive-action gate and reloads the same
    /// page number. Whatever page boundaries result (including an emptied
    /// last page) come entirely from the server's response.
    pub async fn delete_user(
        &self,
        user_id: UserId,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<(), ClientError> {
        self.session.ensure_admin().await?;
        if !prompt.confirm("Удалить пользователя?") {
            return Err(ClientError::Cancelled);
        }
        self.gateway
            .delete(&format!("/api/admin/users/{}", user_id.0))
            .await?;
        let page = self.listing.lock().await.cursor();
        self.list_page(page).await
    }

    pub async fn current(&self) -> Option<Page<AdminUserRow>> {
        self.listing.lock().await.current().cloned()
    }

    pub async fn cursor(&self) -> u32 {
        self.listing.lock().await.cursor()
    }
}
