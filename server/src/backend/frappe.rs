//! Frappe REST client
//!
//! Talks to `/api/resource/{Doctype}` with token authentication. Payloads are
//! wrapped in a top-level `data` member on the way back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use url::Url;

use super::{Backend, BackendError, Fields, ListQuery};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

pub struct FrappeClient {
    http: Client,
    base_url: Url,
    authorization: Option<String>,
}

impl FrappeClient {
    pub fn new(base_url: &str, api_token: Option<&str>) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url,
            authorization: api_token.map(authorization_header),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/api/resource/{doctype}[/{id}]`, each segment percent-encoded
    /// (`Custom Event` becomes `Custom%20Event`).
    fn resource_url(&self, doctype: &str, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // The base was checked to be hierarchical in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "resource", doctype])
                .extend(id);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        match &self.authorization {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        doctype: &str,
        id: Option<&str>,
    ) -> Result<Response, BackendError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(doctype, status = status.as_u16(), "Backend request failed");

        let message = extract_server_message(&body).unwrap_or_else(|| preview(&body));
        Err(match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => BackendError::NotFound {
                doctype: doctype.to_string(),
                id: id.to_string(),
            },
            // Frappe answers validation hook failures with 417.
            (StatusCode::EXPECTATION_FAILED, _) => BackendError::Rejected(message),
            _ => BackendError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn data(response: Response) -> Result<Value, BackendError> {
        let mut body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        match body.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(BackendError::Decode("response has no `data` member".to_string())),
        }
    }
}

#[async_trait]
impl Backend for FrappeClient {
    async fn list(&self, doctype: &str, query: &ListQuery) -> Result<Vec<Value>, BackendError> {
        let url = self.resource_url(doctype, None);
        let builder = self.request(Method::GET, url).query(&list_params(query));
        let response = self.send(builder, doctype, None).await?;

        match Self::data(response).await? {
            Value::Array(rows) => Ok(rows),
            other => Err(BackendError::Decode(format!(
                "expected a list of {doctype} rows, got {other}"
            ))),
        }
    }

    async fn get(&self, doctype: &str, id: &str) -> Result<Value, BackendError> {
        let url = self.resource_url(doctype, Some(id));
        let response = self
            .send(self.request(Method::GET, url), doctype, Some(id))
            .await?;
        Self::data(response).await
    }

    async fn create(&self, doctype: &str, fields: Fields) -> Result<Value, BackendError> {
        let url = self.resource_url(doctype, None);
        let builder = self.request(Method::POST, url).json(&fields);
        let response = self.send(builder, doctype, None).await?;
        Self::data(response).await
    }

    async fn update(&self, doctype: &str, id: &str, fields: Fields) -> Result<Value, BackendError> {
        let url = self.resource_url(doctype, Some(id));
        let builder = self.request(Method::PUT, url).json(&fields);
        let response = self.send(builder, doctype, Some(id)).await?;
        Self::data(response).await
    }

    async fn delete(&self, doctype: &str, id: &str) -> Result<(), BackendError> {
        let url = self.resource_url(doctype, Some(id));
        self.send(self.request(Method::DELETE, url), doctype, Some(id))
            .await?;
        Ok(())
    }
}

/// A bare `key:secret` gets the `token` scheme; a value that already carries
/// it is used unchanged.
pub fn authorization_header(token: &str) -> String {
    let token = token.trim();
    if token.to_lowercase().starts_with("token ") {
        token.to_string()
    } else {
        format!("token {token}")
    }
}

/// Query parameters in the shape `frappe.client.get_list` expects.
pub fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("limit_page_length", query.limit.to_string())];

    if !query.fields.is_empty() {
        params.push(("fields", Value::from(query.fields.clone()).to_string()));
    }
    if let Some(order) = &query.order_by {
        params.push(("order_by", format!("{} {}", order.field, order.order.as_str())));
    }
    if !query.filters.is_empty() {
        let filters: Vec<Value> = query
            .filters
            .iter()
            .map(|(field, value)| Value::Array(vec![field.as_str().into(), "=".into(), value.clone()]))
            .collect();
        params.push(("filters", Value::Array(filters).to_string()));
    }

    params
}

/// Pulls the user-facing message out of a Frappe error body.
///
/// `_server_messages` is a JSON-encoded list of JSON-encoded objects; failing
/// that, `exception` reads `module.ExceptionType: message`.
pub fn extract_server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    let from_server_messages = json
        .get("_server_messages")
        .and_then(Value::as_str)
        .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
        .and_then(|messages| messages.into_iter().next())
        .and_then(|first| {
            serde_json::from_str::<Value>(&first)
                .ok()
                .and_then(|m| m.get("message").and_then(Value::as_str).map(str::to_string))
                .or(Some(first))
        });

    from_server_messages.or_else(|| {
        json.get("exception").and_then(Value::as_str).map(|exception| {
            exception
                .split_once(": ")
                .map(|(_, message)| message)
                .unwrap_or(exception)
                .to_string()
        })
    })
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect()
}
