//! Client for the `/admin` REST surface. A 401 anywhere but login resets
//! the session before the error is returned.

pub mod auth;
pub mod stats;
pub mod tasks;
pub mod transactions;
pub mod users;

use std::collections::BTreeMap;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::session::SessionStore;

/// Rejected credentials come back as 401 here; that is not an expired session.
pub(crate) const LOGIN_PATH: &str = "/auth/login";

/// Response body of mutations whose content the console does not use.
pub type Ack = serde_json::Value;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, AppError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(ApiClient {
            http: builder.build()?,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn with_base_url(base_url: Url, session: SessionStore) -> Result<Self, AppError> {
        Ok(ApiClient {
            http: Client::builder().build()?,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/admin{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.endpoint(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<R, AppError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "request failed");
            AppError::Transport(e)
        })?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response");

        if status == StatusCode::UNAUTHORIZED && path != LOGIN_PATH {
            tracing::warn!(%method, path, "unauthorized, clearing session");
            if let Err(e) = self.session.reset() {
                tracing::error!(error = %e, "failed to persist session reset");
            }
            return Err(AppError::Unauthorized);
        }

        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(AppError::backend(status, error_message(status, &body)));
        }

        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body
        };
        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "undecodable response");
            AppError::Decode(format!("{method} {path}: {e}"))
        })
    }

    pub(crate) async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<R, AppError> {
        let builder = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, builder).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let builder = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, builder).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let builder = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, builder).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, AppError> {
        let builder = self.request(Method::PATCH, path).json(body);
        self.send(Method::PATCH, path, builder).await
    }

    pub(crate) async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, AppError> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}

/// Resource-specific list filters, ordered so they can be part of a cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, Some(value));
        self
    }

    /// Set or clear one filter. Blank values clear it.
    pub fn set(&mut self, key: &str, value: Option<impl ToString>) {
        match value.map(|v| v.to_string()).filter(|v| !v.trim().is_empty()) {
            Some(v) => {
                self.0.insert(key.to_string(), v);
            }
            None => {
                self.0.remove(key);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query string pairs for a list call; `page` and `limit` always win.
    pub fn to_query(&self, page: u32, limit: u32) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .0
            .iter()
            .filter(|(k, _)| k.as_str() != "page" && k.as_str() != "limit")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.push(("page".into(), page.to_string()));
        pairs.push(("limit".into(), limit.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let mut filters = Filters::new().with("role", "admin");
        filters.set("status", Some("  "));
        filters.set("role", None::<String>);
        assert!(filters.is_empty());
    }

    #[test]
    fn page_and_limit_cannot_be_overridden() {
        let filters = Filters::new().with("type", "bet").with("page", 99);
        assert_eq!(
            filters.to_query(2, 5),
            vec![
                ("type".to_string(), "bet".to_string()),
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn backend_error_text_is_extracted() {
        let status = StatusCode::CONFLICT;
        assert_eq!(error_message(status, br#"{"error":"Username taken"}"#), "Username taken");
        assert_eq!(error_message(status, br#"{"message":"nope"}"#), "nope");
        assert_eq!(error_message(status, b"<html>"), "Conflict");
    }
}
