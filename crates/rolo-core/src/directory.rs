// ── Directory facade ────────────────────────────────────────────────
//
// The one object an outer surface (CLI, GUI) holds. Routes every read
// through the query cache, every mutation through the invalidation rules,
// and every authenticated call through the session guard.
//
// Invalidation rules: create and delete stale every listing and search
// page; update additionally stales the contact's detail entry; import
// stales listings and searches. Mutations that fail invalidate nothing.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use rolo_api::{
    ChangePasswordRequest, Contact, ContactRequest, DirectoryClient, PageResponse,
    RegisterRequest, TransferFormat, TransportConfig, User,
};

use crate::cache::{QueryCache, QueryKey, QueryValue};
use crate::config::DirectoryConfig;
use crate::error::CoreError;
use crate::search::SearchController;
use crate::session::SessionStore;
use crate::transfer::{self, ExportPayload, ImportFile};

/// Client-side contact directory: API client, session, query cache, and
/// search state under one roof.
pub struct Directory {
    client: DirectoryClient,
    session: Arc<SessionStore>,
    cache: QueryCache,
    search: SearchController,
}

impl Directory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, CoreError> {
        let session = Arc::new(SessionStore::open(config.resolve_state_dir()));
        let transport = TransportConfig {
            timeout: config.timeout,
        };
        let client = DirectoryClient::new(
            config.base_url.clone(),
            Arc::clone(&session) as Arc<dyn rolo_api::TokenSource>,
            &transport,
        )?;
        Ok(Self {
            client,
            session,
            cache: QueryCache::new(),
            search: SearchController::new(config.page_size, config.debounce),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Log in and establish a session. A rejected credential pair maps to
    /// [`CoreError::InvalidCredentials`]; the session is untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, CoreError> {
        let auth = self
            .client
            .login(&rolo_api::LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .await
            .map_err(|e| match e {
                rolo_api::Error::Authorization { message, .. } => {
                    CoreError::InvalidCredentials { message }
                }
                other => CoreError::Api(other),
            })?;

        self.session
            .establish(SecretString::from(auth.token), auth.user.clone())?;
        // Anything cached belongs to whoever was logged in before.
        self.cache.clear();
        info!(user = auth.user.id, "logged in");
        Ok(auth.user)
    }

    /// Register a new account. On success the returned session is
    /// established immediately, like a login.
    pub async fn register(&self, profile: RegisterRequest) -> Result<User, CoreError> {
        let auth = self.client.register(&profile).await?;
        self.session
            .establish(SecretString::from(auth.token), auth.user.clone())?;
        self.cache.clear();
        info!(user = auth.user.id, "registered");
        Ok(auth.user)
    }

    /// Drop the session and everything derived from it.
    pub fn logout(&self) {
        self.session.clear();
        self.cache.clear();
        self.search.clear();
        info!("logged out");
    }

    /// The server's view of the authenticated account.
    pub async fn me(&self) -> Result<User, CoreError> {
        self.ensure_authenticated()?;
        self.client.me().await.map_err(|e| self.map_api(e))
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CoreError> {
        self.ensure_authenticated()?;
        self.client
            .change_password(&ChangePasswordRequest {
                current_password: current_password.to_owned(),
                new_password: new_password.to_owned(),
            })
            .await
            .map_err(|e| self.map_api(e))
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The page the active view should show: the directory listing, or
    /// search results when a query is committed. Cached per key.
    pub async fn active_page(&self) -> Result<PageResponse<Contact>, CoreError> {
        self.ensure_authenticated()?;
        let key = self.search.active_key();
        match self.resolve(key).await? {
            QueryValue::Page(page) => Ok(page),
            QueryValue::Contact(_) => Err(unexpected_value("page")),
        }
    }

    /// One contact by id, through the detail cache.
    pub async fn contact(&self, id: u64) -> Result<Contact, CoreError> {
        self.ensure_authenticated()?;
        match self.resolve(QueryKey::Detail(id)).await? {
            QueryValue::Contact(contact) => Ok(contact),
            QueryValue::Page(_) => Err(unexpected_value("contact")),
        }
    }

    async fn resolve(&self, key: QueryKey) -> Result<QueryValue, CoreError> {
        self.cache
            .resolve(key.clone(), || self.fetch(key.clone()))
            .await
            .map_err(unshare)
    }

    async fn fetch(&self, key: QueryKey) -> Result<QueryValue, CoreError> {
        let result = match key {
            QueryKey::Listing(page) => self
                .client
                .list_contacts(&page)
                .await
                .map(QueryValue::Page),
            QueryKey::Search { query, page } => self
                .client
                .search_contacts(&query, &page)
                .await
                .map(QueryValue::Page),
            QueryKey::Detail(id) => self.client.get_contact(id).await.map(QueryValue::Contact),
        };
        result.map_err(|e| self.map_api(e))
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create_contact(&self, request: ContactRequest) -> Result<Contact, CoreError> {
        self.ensure_authenticated()?;
        transfer::validate_contact(&request)?;

        let contact = self
            .client
            .create_contact(&request)
            .await
            .map_err(|e| self.map_api(e))?;
        self.cache.invalidate_listings();
        debug!(id = contact.id, "contact created");
        Ok(contact)
    }

    pub async fn update_contact(
        &self,
        id: u64,
        request: ContactRequest,
    ) -> Result<Contact, CoreError> {
        self.ensure_authenticated()?;
        transfer::validate_contact(&request)?;

        let contact = self
            .client
            .update_contact(id, &request)
            .await
            .map_err(|e| self.map_api(e))?;
        self.cache.invalidate_listings();
        self.cache.invalidate_detail(id);
        debug!(id, "contact updated");
        Ok(contact)
    }

    pub async fn delete_contact(&self, id: u64) -> Result<(), CoreError> {
        self.ensure_authenticated()?;
        self.client
            .delete_contact(id)
            .await
            .map_err(|e| self.map_api(e))?;
        self.cache.invalidate_listings();
        self.cache.evict(&QueryKey::Detail(id));
        debug!(id, "contact deleted");
        Ok(())
    }

    // ── Import / export ──────────────────────────────────────────────

    /// Validate an import file locally, upload it, and return the created
    /// contacts. A malformed batch never reaches the network.
    pub async fn import(&self, file: &ImportFile) -> Result<Vec<Contact>, CoreError> {
        self.ensure_authenticated()?;
        let parsed = transfer::parse_import(file)?;
        debug!(file = %file.name, count = parsed.len(), "uploading import batch");

        let created = self
            .client
            .import_contacts(file.format, &file.name, file.bytes.clone())
            .await
            .map_err(|e| self.map_api(e))?;
        self.cache.invalidate_listings();
        info!(count = created.len(), "import complete");
        Ok(created)
    }

    /// Download the full contact set in the server's rendering.
    pub async fn export(&self, format: TransferFormat) -> Result<ExportPayload, CoreError> {
        self.ensure_authenticated()?;
        let bytes = self
            .client
            .export_contacts(format)
            .await
            .map_err(|e| self.map_api(e))?;
        Ok(ExportPayload { format, bytes })
    }

    // ── Session guard ────────────────────────────────────────────────

    /// Fail fast while logged out; no request goes out.
    fn ensure_authenticated(&self) -> Result<(), CoreError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CoreError::NotAuthenticated)
        }
    }

    /// A 401/403 on an authenticated call means the token is dead: drop
    /// the session so nothing retries with it. Cached pages stay readable
    /// until logout clears them.
    fn map_api(&self, error: rolo_api::Error) -> CoreError {
        if error.is_authorization() {
            warn!("bearer token rejected, clearing session");
            self.session.clear();
            CoreError::SessionExpired
        } else {
            CoreError::Api(error)
        }
    }
}

/// Collapse a shared fetch error back to an owned one when this caller
/// was the only holder.
fn unshare(error: Arc<CoreError>) -> CoreError {
    Arc::try_unwrap(error).unwrap_or_else(CoreError::Shared)
}

fn unexpected_value(wanted: &str) -> CoreError {
    CoreError::Api(rolo_api::Error::Api {
        message: format!("cache returned the wrong value shape (wanted a {wanted})"),
    })
}
