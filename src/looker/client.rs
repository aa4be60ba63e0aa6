//! `reqwest` implementation of [`LookerApi`].

use super::models::AccessTokenResponse;
use super::{
    ApiSettings, LookerApi, LookerError, Method, ModelSet, Permission, PermissionSet,
    QueryParams, Role, WriteModelSet, WritePermissionSet, WriteRole,
};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Refresh service tokens this long before Looker says they expire.
/// Capped at half the token lifetime.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

enum Auth {
    /// Caller-supplied token, used as-is.
    Bearer(String),
    /// Service identity: client credentials exchanged lazily for a session token.
    Service(RwLock<Option<SessionToken>>),
    /// No identity of its own; only usable through `with_bearer_token`.
    Anonymous,
}

struct SessionToken {
    value: String,
    /// When to stop reusing the token, refresh margin already applied.
    refresh_at: Option<Instant>,
}

impl SessionToken {
    fn new(value: String, expires_in: Option<u64>) -> Self {
        let refresh_at = expires_in.map(|secs| {
            let lifetime = Duration::from_secs(secs);
            Instant::now() + lifetime - TOKEN_REFRESH_MARGIN.min(lifetime / 2)
        });
        Self { value, refresh_at }
    }

    fn is_fresh(&self) -> bool {
        self.refresh_at.map_or(true, |at| Instant::now() < at)
    }
}

/// Looker API client over HTTPS.
///
/// Cloning is cheap and clones share the connection pool and session token.
#[derive(Clone)]
pub struct HttpLookerClient {
    http: reqwest::Client,
    settings: Arc<ApiSettings>,
    auth: Arc<Auth>,
}

impl fmt::Debug for HttpLookerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match *self.auth {
            Auth::Bearer(_) => "bearer",
            Auth::Service(_) => "service",
            Auth::Anonymous => "anonymous",
        };
        f.debug_struct("HttpLookerClient")
            .field("base_url", &self.settings.base_url)
            .field("auth", &mode)
            .finish_non_exhaustive()
    }
}

impl HttpLookerClient {
    /// Client authenticating with the settings' client id/secret.
    pub fn service(settings: ApiSettings) -> Result<Self, LookerError> {
        if !settings.has_client_credentials() {
            return Err(LookerError::Login(
                "client_id and client_secret are required for service credentials".to_string(),
            ));
        }
        let http = build_http(&settings)?;
        Ok(Self {
            http,
            settings: Arc::new(settings),
            auth: Arc::new(Auth::Service(RwLock::new(None))),
        })
    }

    /// Client authenticating every request with a caller-supplied token.
    pub fn bearer(settings: ApiSettings, token: impl Into<String>) -> Result<Self, LookerError> {
        let http = build_http(&settings)?;
        Ok(Self {
            http,
            settings: Arc::new(settings),
            auth: Arc::new(Auth::Bearer(token.into())),
        })
    }

    /// Client without credentials, used as the template for caller-token clients.
    pub fn without_credentials(settings: ApiSettings) -> Result<Self, LookerError> {
        let http = build_http(&settings)?;
        Ok(Self {
            http,
            settings: Arc::new(settings),
            auth: Arc::new(Auth::Anonymous),
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn url(&self, api_version: &str, path: &str, query: &QueryParams) -> Result<Url, LookerError> {
        let endpoint = self.settings.endpoint(api_version, path);
        let parsed = if query.is_empty() {
            Url::parse(&endpoint)
        } else {
            Url::parse_with_params(&endpoint, query.iter())
        };
        parsed.map_err(|e| LookerError::InvalidUrl(format!("{}: {}", endpoint, e)))
    }

    async fn access_token(&self) -> Result<String, LookerError> {
        let cache = match &*self.auth {
            Auth::Bearer(token) => return Ok(token.clone()),
            Auth::Service(cache) => cache,
            Auth::Anonymous => {
                return Err(LookerError::Login(
                    "client has no credentials; a caller access token is required".to_string(),
                ))
            }
        };

        if let Some(token) = cache.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let mut guard = cache.write().await;
        // Another task may have logged in while we waited for the lock.
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }
        let token = self.login().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn login(&self) -> Result<SessionToken, LookerError> {
        let url = self.url(&self.settings.api_version, "/login", &QueryParams::new())?;
        let form = [
            ("client_id", self.settings.client_id.as_deref().unwrap_or_default()),
            ("client_secret", self.settings.client_secret.as_deref().unwrap_or_default()),
        ];

        debug!(base_url = %self.settings.base_url, "logging in to looker with client credentials");
        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookerError::Login(format!("status {}: {}", status.as_u16(), body)));
        }
        let token: AccessTokenResponse = response.json().await.map_err(reqwest::Error::without_url)?;
        Ok(SessionToken::new(token.access_token, token.expires_in))
    }

    async fn send<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, LookerError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.access_token().await?;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, LookerError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let url = self.url(&self.settings.api_version, path, &QueryParams::new())?;
        self.send(Method::POST, url, Some(body)).await
    }
}

fn build_http(settings: &ApiSettings) -> Result<reqwest::Client, LookerError> {
    Ok(reqwest::Client::builder()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.clone())
        .danger_accept_invalid_certs(!settings.verify_ssl)
        .build()?)
}

#[async_trait]
impl LookerApi for HttpLookerClient {
    async fn create_model_set(&self, body: &WriteModelSet) -> Result<ModelSet, LookerError> {
        self.post("/model_sets", body).await
    }

    async fn create_permission_set(
        &self,
        body: &WritePermissionSet,
    ) -> Result<PermissionSet, LookerError> {
        self.post("/permission_sets", body).await
    }

    async fn create_role(&self, body: &WriteRole) -> Result<Role, LookerError> {
        self.post("/roles", body).await
    }

    async fn all_permissions(&self) -> Result<Vec<Permission>, LookerError> {
        let url = self.url(&self.settings.api_version, "/permissions", &QueryParams::new())?;
        self.send::<_, ()>(Method::GET, url, None).await
    }

    async fn call(
        &self,
        method: Method,
        api_version: &str,
        path: &str,
        query: &QueryParams,
    ) -> Result<serde_json::Value, LookerError> {
        let url = self.url(api_version, path, query)?;
        self.send::<_, ()>(method, url, None).await
    }

    fn with_bearer_token(&self, token: &str) -> Arc<dyn LookerApi> {
        Arc::new(Self {
            http: self.http.clone(),
            settings: Arc::clone(&self.settings),
            auth: Arc::new(Auth::Bearer(token.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_requires_credentials() {
        let err = HttpLookerClient::service(ApiSettings::new("https://example.looker.com"))
            .unwrap_err();
        assert!(matches!(err, LookerError::Login(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let client =
            HttpLookerClient::bearer(ApiSettings::new("https://example.looker.com"), "s3cr3t")
                .unwrap();
        let rendered = format!("{:?}", client);
        assert!(rendered.contains("bearer"));
        assert!(!rendered.contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_anonymous_client_refuses_requests() {
        let client =
            HttpLookerClient::without_credentials(ApiSettings::new("https://example.looker.com"))
                .unwrap();
        let err = client.all_permissions().await.unwrap_err();
        assert!(matches!(err, LookerError::Login(_)));
    }

    #[test]
    fn test_url_carries_query() {
        let client =
            HttpLookerClient::bearer(ApiSettings::new("https://example.looker.com"), "t").unwrap();
        let mut query = QueryParams::new();
        query.insert("fields".into(), "id,name".into());
        query.insert("limit".into(), "100".into());
        let url = client.url("4.0", "/roles/search", &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.looker.com/api/4.0/roles/search?fields=id%2Cname&limit=100"
        );
    }

    #[test]
    fn test_token_freshness() {
        let stale = SessionToken {
            value: "a".into(),
            refresh_at: Some(Instant::now() - Duration::from_secs(1)),
        };
        let fresh = SessionToken::new("b".into(), Some(3600));
        let forever = SessionToken::new("c".into(), None);
        assert!(!stale.is_fresh());
        assert!(fresh.is_fresh());
        assert!(forever.is_fresh());
    }

    #[test]
    fn test_short_lived_token_is_reused() {
        let token = SessionToken::new("short".into(), Some(30));
        assert!(token.is_fresh());

        let at = token.refresh_at.unwrap();
        assert!(at > Instant::now() + Duration::from_secs(10));
        assert!(at <= Instant::now() + Duration::from_secs(15));
    }

    #[test]
    fn test_long_lived_token_refreshes_a_minute_early() {
        let token = SessionToken::new("long".into(), Some(3600));
        let at = token.refresh_at.unwrap();
        assert!(at <= Instant::now() + Duration::from_secs(3540));
        assert!(at > Instant::now() + Duration::from_secs(3500));
    }
}
