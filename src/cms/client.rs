use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::cms::error::CmsError;
use crate::cms::urls;
use crate::config::SiteConfig;

/// How requests reach the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    /// Straight to the CMS origin; the bearer token is attached when configured.
    Direct,
    /// Through the development proxy, which injects the token itself.
    Proxied,
}

/// `{ data: [...], meta? }` list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// `{ data: {...} }` single-entry envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleEnvelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Per-request overrides merged on top of the client defaults.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    mode: ClientMode,
    files_base: String,
}

impl CmsClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self::build(base_url, token, ClientMode::Direct)
    }

    pub fn proxied(proxy_base: &str) -> Self {
        Self::build(proxy_base, None, ClientMode::Proxied)
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        let base = config.api_url.as_deref().unwrap_or_default();
        Self::new(base, config.api_token.clone()).with_files_base(config.files_base())
    }

    fn build(base_url: &str, token: Option<String>, mode: ClientMode) -> Self {
        let token = token
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            token,
            mode,
            files_base: String::new(),
        }
    }

    #[must_use]
    pub fn with_files_base(mut self, files_base: impl Into<String>) -> Self {
        self.files_base = files_base.into();
        self
    }

    pub fn mode(&self) -> ClientMode {
        self.mode
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn files_base(&self) -> &str {
        &self.files_base
    }

    /// Absolutizes a media path against the configured files base.
    pub fn media_url(&self, path: &str) -> String {
        urls::with_base_url(&self.files_base, path)
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CmsError> {
        self.fetch_json(path, FetchOptions::default()).await
    }

    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, CmsError> {
        let envelope: ListEnvelope<T> = self.get_json(path).await?;
        Ok(envelope.data)
    }

    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: FetchOptions,
    ) -> Result<T, CmsError> {
        let url = self.url_for(path);
        let parsed = url::Url::parse(&url).map_err(|err| CmsError::InvalidUrl {
            url: url.clone(),
            reason: err.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);
        if self.mode == ClientMode::Direct
            && let Some(token) = self.token.as_deref()
        {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|err| {
                CmsError::InvalidUrl {
                    url: url.clone(),
                    reason: format!("bearer token is not a valid header value: {err}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut request = self.http.request(options.method, parsed).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body.to_string());
        }

        tracing::debug!(url = %url, "cms request");
        let response = request.send().await.map_err(|source| CmsError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| CmsError::Request {
            url: url.clone(),
            source,
        })?;
        if !status.is_success() {
            let body = if text.is_empty() {
                status.canonical_reason().unwrap_or_default().to_owned()
            } else {
                text
            };
            return Err(CmsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&text).map_err(|source| CmsError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    struct Seen {
        url: String,
        authorization: Option<String>,
        content_type: Option<String>,
    }

    fn spawn_cms(
        status: u16,
        body: &'static str,
    ) -> (String, mpsc::Receiver<Seen>, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
        let base_url = format!("http://{}/api", server.server_addr());
        let (seen_tx, seen_rx) = mpsc::channel::<Seen>();

        let handle = thread::spawn(move || {
            let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(5)) else {
                return;
            };
            let header = |name: &str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.to_string().eq_ignore_ascii_case(name))
                    .map(|h| h.value.to_string())
            };
            let _ = seen_tx.send(Seen {
                url: request.url().to_owned(),
                authorization: header("Authorization"),
                content_type: header("Content-Type"),
            });
            let _ = request
                .respond(tiny_http::Response::from_string(body).with_status_code(status));
        });

        (base_url, seen_rx, handle)
    }

    #[test]
    fn url_for_joins_relative_and_absolute_paths() {
        let client = CmsClient::new("https://cms.example.com/api/", None);
        assert_eq!(
            client.url_for("/novedades?populate=*"),
            "https://cms.example.com/api/novedades?populate=*"
        );
        assert_eq!(
            client.url_for("novedades"),
            "https://cms.example.com/api/novedades"
        );
    }

    #[tokio::test]
    async fn direct_client_sends_bearer_token_and_json_content_type() {
        let (base_url, seen_rx, handle) = spawn_cms(200, r#"{"data":[{"a":1}]}"#);
        let client = CmsClient::new(&base_url, Some("secret".to_owned()));

        let data: Vec<serde_json::Value> = client.get_list("/novedades?populate=*").await.unwrap();
        assert_eq!(data.len(), 1);

        let seen = seen_rx.recv().unwrap();
        assert_eq!(seen.url, "/api/novedades?populate=*");
        assert_eq!(seen.authorization.as_deref(), Some("Bearer secret"));
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
        let _ = handle.join();
    }

    #[tokio::test]
    async fn proxied_client_never_sends_a_token() {
        let (base_url, seen_rx, handle) = spawn_cms(200, r#"{"data":[]}"#);
        let client = CmsClient::proxied(&base_url);

        let data: Vec<serde_json::Value> = client.get_list("menu-ppls").await.unwrap();
        assert!(data.is_empty());

        let seen = seen_rx.recv().unwrap();
        assert_eq!(seen.authorization, None);
        let _ = handle.join();
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let (base_url, _seen_rx, handle) = spawn_cms(403, "Forbidden by policy");
        let client = CmsClient::new(&base_url, None);

        let err = client
            .get_json::<serde_json::Value>("/novedades")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "CMS error 403: Forbidden by policy");
        let _ = handle.join();
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_reason_phrase() {
        let (base_url, _seen_rx, handle) = spawn_cms(404, "");
        let client = CmsClient::new(&base_url, None);

        let err = client
            .get_json::<serde_json::Value>("/novedades/99")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "CMS error 404: Not Found");
        let _ = handle.join();
    }

    #[tokio::test]
    async fn missing_base_url_is_rejected_before_any_request() {
        let client = CmsClient::new("", None);
        let err = client
            .get_json::<serde_json::Value>("/novedades")
            .await
            .unwrap_err();
        assert!(matches!(err, CmsError::InvalidUrl { .. }));
    }
}
