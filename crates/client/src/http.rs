//! `reqwest`-backed SDK mirroring what the Supabase JS `createClient` sets up:
//! service endpoints derived from the project URL and an HTTP client that
//! authenticates every request with the publishable key.

use std::{fmt, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION},
    Client, Url,
};
use thiserror::Error;

use crate::sdk::SupabaseSdk;

const CLIENT_INFO: &str = concat!("supabase-bootstrap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("supabase url is required")]
    MissingUrl,
    #[error("supabase key is required")]
    MissingKey,
    #[error("invalid supabase url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported url scheme `{scheme}`, expected http or https")]
    UnsupportedScheme { scheme: String },
    #[error("supabase key is not a valid header value: {0}")]
    InvalidKey(#[from] InvalidHeaderValue),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Default)]
pub struct HttpSdk {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpSdk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Derives the service endpoints and prepares the HTTP client. No request
    /// is sent.
    pub fn build(&self, url: &str, key: &str) -> Result<SupabaseClient, ClientBuildError> {
        if url.is_empty() {
            return Err(ClientBuildError::MissingUrl);
        }
        if key.is_empty() {
            return Err(ClientBuildError::MissingKey);
        }

        let base_url = parse_base_url(url)?;
        let realtime_scheme = if base_url.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let mut realtime_url = join(&base_url, "realtime/v1")?;
        realtime_url
            .set_scheme(realtime_scheme)
            .map_err(|_| ClientBuildError::UnsupportedScheme {
                scheme: realtime_scheme.to_string(),
            })?;

        let mut builder = Client::builder().default_headers(auth_headers(key)?);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(SupabaseClient {
            rest_url: join(&base_url, "rest/v1")?,
            auth_url: join(&base_url, "auth/v1")?,
            storage_url: join(&base_url, "storage/v1")?,
            functions_url: join(&base_url, "functions/v1")?,
            realtime_url,
            base_url,
            key: key.to_string(),
            http: builder.build()?,
        })
    }
}

impl SupabaseSdk for HttpSdk {
    type Client = Result<SupabaseClient, ClientBuildError>;

    fn create_client(&self, url: &str, key: &str) -> Self::Client {
        self.build(url, key)
    }
}

/// Handle produced by [`HttpSdk`]. Cloning shares the underlying connection
/// pool.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: Url,
    key: String,
    rest_url: Url,
    auth_url: Url,
    storage_url: Url,
    functions_url: Url,
    realtime_url: Url,
    http: Client,
}

impl SupabaseClient {
    /// Project URL, always ending in `/`.
    pub fn url(&self) -> &Url {
        &self.base_url
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    pub fn storage_url(&self) -> &Url {
        &self.storage_url
    }

    pub fn functions_url(&self) -> &Url {
        &self.functions_url
    }

    pub fn realtime_url(&self) -> &Url {
        &self.realtime_url
    }

    /// Client carrying the `apikey`, `Authorization` and `X-Client-Info`
    /// default headers.
    pub fn http(&self) -> &Client {
        &self.http
    }
}

impl fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("url", &self.base_url.as_str())
            .field("key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn parse_base_url(url: &str) -> Result<Url, ClientBuildError> {
    let mut base = Url::parse(url).map_err(|err| ClientBuildError::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;

    match base.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ClientBuildError::UnsupportedScheme {
                scheme: other.to_string(),
            })
        }
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    Ok(base)
}

fn join(base: &Url, segment: &str) -> Result<Url, ClientBuildError> {
    base.join(segment)
        .map_err(|err| ClientBuildError::InvalidUrl {
            url: base.to_string(),
            reason: err.to_string(),
        })
}

fn auth_headers(key: &str) -> Result<HeaderMap, ClientBuildError> {
    let mut api_key = HeaderValue::from_str(key)?;
    api_key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", api_key);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert("x-client-info", HeaderValue::from_static(CLIENT_INFO));
    Ok(headers)
}
