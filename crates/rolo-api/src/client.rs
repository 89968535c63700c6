// Directory API HTTP client
//
// Wraps `reqwest::Client` with envelope unwrapping, bearer-token
// injection, and status-code classification. Endpoint groups (auth,
// contacts, transfer) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::model::{Envelope, ErrorBody};
use crate::transport::TransportConfig;

/// Source of the current bearer token, read at send time.
///
/// The session layer implements this; returning `None` sends the request
/// unauthenticated. Reading at send time (rather than caching at client
/// construction) means a token cleared by a concurrent 401 is never
/// attached to later requests.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed token, for tests and one-off scripts.
impl TokenSource for SecretString {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.clone())
    }
}

/// No authentication.
impl TokenSource for () {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

/// Typed client for the directory REST API.
///
/// Stateless apart from the connection pool: all session state lives
/// behind the [`TokenSource`]. Every method returns the unwrapped `data`
/// payload -- the `{ success, message, data }` envelope is stripped before
/// the caller sees it.
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenSource>,
}

impl DirectoryClient {
    /// Create a client from a base URL and transport config.
    ///
    /// `base_url` is the API root, e.g. `https://host/api`.
    pub fn new(
        base_url: Url,
        token: Arc<dyn TokenSource>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, token: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"contacts/7"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    /// Attach the current bearer token, if one is available.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.bearer_token() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        self.unwrap_envelope(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url))
            .query(params)
            .send()
            .await?;
        self.unwrap_envelope(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url)).json(body).send().await?;
        self.unwrap_envelope(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url)).json(body).send().await?;
        self.unwrap_envelope(resp).await
    }

    pub(crate) async fn put_no_data<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url)).json(body).send().await?;
        self.unwrap_empty(resp).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        self.unwrap_empty(resp).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart)");

        let resp = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;
        self.unwrap_envelope(resp).await
    }

    /// GET a raw body with no envelope (export blobs).
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, Error> {
        let url = self.url(path)?;
        debug!("GET {url} (blob)");

        let resp = self.authorize(self.http.get(url)).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?.to_vec())
        } else {
            Err(Self::classify_failure(status, resp).await)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    /// Parse the `{ success, message, data }` envelope, returning `data`.
    async fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::classify_failure(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if !envelope.success {
            return Err(Error::Api {
                message: envelope.message,
            });
        }

        envelope.data.ok_or(Error::Deserialization {
            message: "envelope reported success but carried no data".into(),
            body,
        })
    }

    /// Like [`Self::unwrap_envelope`] for endpoints whose `data` is null.
    async fn unwrap_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::classify_failure(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        if envelope.success {
            Ok(())
        } else {
            Err(Error::Api {
                message: envelope.message,
            })
        }
    }

    /// Map a non-2xx response onto the error taxonomy.
    async fn classify_failure(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let parsed: ErrorBody = serde_json::from_str(&raw).unwrap_or(ErrorBody {
            message: None,
            errors: None,
        });
        let message = parsed
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_owned());

        match status.as_u16() {
            401 | 403 => Error::Authorization {
                status: status.as_u16(),
                message,
            },
            404 => Error::NotFound { message },
            s if (400..500).contains(&s) => Error::Validation {
                status: s,
                message,
                errors: parsed.errors.unwrap_or_default(),
            },
            s => Error::Server { status: s, message },
        }
    }
}
