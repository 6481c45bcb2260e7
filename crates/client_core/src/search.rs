use std::sync::Arc;

use shared::protocol::{Page, ProfileSummary};
use tokio::sync::{broadcast, Mutex};
use tracing::warn;

use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::listing::ListingState;
use crate::ClientEvent;

/// Raw search form fields, exactly as the user typed them. Numeric filters
/// stay opaque strings; the server does the numeric interpretation, which
/// keeps search permissive on the client side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchForm {
    pub name: String,
    pub service_type: String,
    pub exp_min: String,
    pub exp_max: String,
    pub price_min: String,
    pub price_max: String,
}

/// Builds the query pairs for one listing request: a filter key is included
/// only if its trimmed value is non-empty, and `page` is always present and
/// at least 1.
pub fn build_query(form: &SearchForm, page: u32) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    for (key, raw) in [
        ("name", &form.name),
        ("service_type", &form.service_type),
        ("exp_min", &form.exp_min),
        ("exp_max", &form.exp_max),
        ("price_min", &form.price_min),
        ("price_max", &form.price_max),
    ] {
        let value = raw.trim();
        if !value.is_empty() {
            query.push((key, value.to_string()));
        }
    }
    query.push(("page", page.max(1).to_string()));
    query
}

/// Drives the public profile listing: owns the submitted form, the page
/// cursor, and the current [`Page`] snapshot.
pub struct SearchController {
    gateway: Arc<Gateway>,
    form: Mutex<SearchForm>,
    listing: Mutex<ListingState<ProfileSummary>>,
    events: broadcast::Sender<ClientEvent>,
}

impl SearchController {
    pub(crate) fn new(gateway: Arc<Gateway>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            gateway,
            form: Mutex::new(SearchForm::default()),
            listing: Mutex::new(ListingState::default()),
            events,
        }
    }

    /// Replaces the active form and loads the first page.
    pub async fn submit(&self, form: SearchForm) -> Result<(), ClientError> {
        *self.form.lock().await = form;
        self.load(1).await
    }

    /// Clears all filters and reissues the first page.
    pub async fn reset(&self) -> Result<(), ClientError> {
        self.submit(SearchForm::default()).await
    }

    /// Navigation is expressed purely through the server's flags: when the
    /// current snapshot says there is no next page, nothing is issued.
    pub async fn next_page(&self) -> Result<(), ClientError> {
        let page = {
            let listing = self.listing.lock().await;
            if !listing.has_next() {
                return Ok(());
            }
            listing.cursor() + 1
        };
        self.load(page).await
    }

    pub async fn prev_page(&self) -> Result<(), ClientError> {
        let page = {
            let listing = self.listing.lock().await;
            if !listing.has_prev() {
                return Ok(());
            }
            listing.cursor().saturating_sub(1)
        };
        self.load(page).await
    }

    /// Issues a listing request for `page`. Out-of-range pages are not
    /// rejected locally; the server's (possibly empty) response is
    /// authoritative. On success the cursor follows the server-reported
    /// page and the snapshot is republished to the view.
    pub async fn load(&self, page: u32) -> Result<(), ClientError> {
        let query = build_query(&*self.form.lock().await, page);
        let seq = self.listing.lock().await.begin();
        let value = self.gateway.get_query("/api/profiles", &query).await?;
        let page: Page<ProfileSummary> = serde_json::from_value(value)?;
        let mut listing = self.listing.lock().await;
        if listing.apply(seq, page.clone()) {
            let _ = self.events.send(ClientEvent::SearchPage(page));
        } else {
            warn!(seq, "discarding stale search response");
        }
        Ok(())
    }

    pub async fn current(&self) -> Option<Page<ProfileSummary>> {
        self.listing.lock().await.current().cloned()
    }

    pub async fn cursor(&self) -> u32 {
        self.listing.lock().await.cursor()
    }
}
