//! HTTP context for the users resource

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::error::{HarnessError, HarnessResult};
use crate::fixture::User;
use crate::profile::Profile;

/// Default headers for every request: JSON in and out, with any
/// profile-declared headers layered on top (overriding on collision).
fn header_map(extra: Option<&BTreeMap<String, String>>) -> HarnessResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    for (name, value) in extra.into_iter().flatten() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| HarnessError::Config(format!("bad header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| HarnessError::Config(format!("bad value for header '{name}': {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// A JSON client bound to the users service, one per test case.
///
/// Every call carries `Content-Type: application/json` and
/// `Accept: application/json`, plus whatever headers the execution
/// profile declares.
#[derive(Clone)]
pub struct ApiContext {
    client: Client,
    base_url: String,
}

impl ApiContext {
    pub fn new(base_url: impl Into<String>) -> HarnessResult<Self> {
        Self::with_headers(base_url, None)
    }

    /// A context carrying the profile's extra headers on every request.
    pub fn for_profile(profile: &Profile, base_url: impl Into<String>) -> HarnessResult<Self> {
        Self::with_headers(base_url, profile.headers.as_ref())
    }

    fn with_headers(
        base_url: impl Into<String>,
        extra: Option<&BTreeMap<String, String>>,
    ) -> HarnessResult<Self> {
        let client = Client::builder().default_headers(header_map(extra)?).build()?;
        Ok(Self { client, base_url: base_url.into() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /users with any JSON body (full fixture, partial, or empty).
    pub async fn create<T: Serialize + ?Sized>(&self, body: &T) -> HarnessResult<Response> {
        Ok(self.client.post(self.url("/users")).json(body).send().await?)
    }

    /// GET /users
    pub async fn list(&self) -> HarnessResult<Response> {
        Ok(self.client.get(self.url("/users")).send().await?)
    }

    /// GET /users/:id
    pub async fn get(&self, id: &str) -> HarnessResult<Response> {
        Ok(self.client.get(self.url(&format!("/users/{id}"))).send().await?)
    }

    /// PUT /users/:id
    pub async fn update(&self, id: &str, body: &User) -> HarnessResult<Response> {
        Ok(self.client.put(self.url(&format!("/users/{id}"))).json(body).send().await?)
    }

    /// DELETE /users/:id
    pub async fn delete(&self, id: &str) -> HarnessResult<Response> {
        Ok(self.client.delete(self.url(&format!("/users/{id}"))).send().await?)
    }

    /// Best-effort reset of the remote collection before a case runs.
    ///
    /// Failures are logged and swallowed; a dirty collection surfaces in the
    /// case's own assertions instead.
    pub async fn purge_all(&self) {
        let users = match self.list().await {
            Ok(resp) => match resp.json::<Vec<User>>().await {
                Ok(users) => users,
                Err(e) => {
                    warn!("cleanup: could not decode user list: {e}");
                    return;
                }
            },
            Err(e) => {
                warn!("cleanup: could not list users: {e}");
                return;
            }
        };

        for user in users {
            if let Err(e) = self.delete(&user.id).await {
                warn!("cleanup: failed to delete user {}: {e}", user.id);
            }
        }
    }
}

/// The service signals a missing resource with either 404 or 204; treat
/// both as "not found".
pub fn is_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_accepts_both_ambiguous_statuses() {
        assert!(is_not_found(StatusCode::NOT_FOUND));
        assert!(is_not_found(StatusCode::NO_CONTENT));
        assert!(!is_not_found(StatusCode::OK));
        assert!(!is_not_found(StatusCode::BAD_REQUEST));
        assert!(!is_not_found(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn default_headers_are_json() {
        let headers = header_map(None).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[test]
    fn profile_headers_are_merged_over_the_defaults() {
        let extra = BTreeMap::from([
            ("X-Api-Key".to_string(), "sk-123".to_string()),
            ("Accept".to_string(), "application/vnd.shopcheck+json".to_string()),
        ]);
        let headers = header_map(Some(&extra)).unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "sk-123");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/vnd.shopcheck+json");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn bad_profile_header_is_a_config_error() {
        let extra = BTreeMap::from([("not a header".to_string(), "v".to_string())]);
        assert!(matches!(header_map(Some(&extra)), Err(HarnessError::Config(_))));
    }

    #[test]
    fn profile_context_builds_from_declared_headers() {
        let set = crate::profile::ProfileSet::from_yaml(
            r#"
profiles:
  - name: api
    test_match: '.*'
    headers:
      X-Api-Key: sk-123
"#,
        )
        .unwrap();
        let ctx = ApiContext::for_profile(set.get("api").unwrap(), "http://localhost:3000");
        assert!(ctx.is_ok());
    }

    #[test]
    fn urls_are_joined_against_the_base() {
        let ctx = ApiContext::new("http://localhost:3000").unwrap();
        assert_eq!(ctx.url("/users"), "http://localhost:3000/users");
        assert_eq!(ctx.url("/users/abc"), "http://localhost:3000/users/abc");
    }
}
