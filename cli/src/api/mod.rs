//! HTTP Client Module
//!
//! This module provides the HTTP client implementation for the remote catalog
//! store and its auth endpoints. It includes:
//!
//! - `HttpStore`: the `CatalogStore` backed by `/category`, `/subcategory`
//!   and `/product`
//! - `AuthClient`: login and registration against `/auth`
//! - Mapping of HTTP failures onto the catalog error taxonomy
//!
//! Responses are JSON envelopes `{ "data": ... }`. Creates and updates go as
//! multipart forms when an image is attached and as JSON otherwise.

use crate::catalog::{CatalogError, CatalogStore, EntityId, EntityKind, FormPayload};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Clone)]
pub struct HttpStore {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%method, %url, "catalog request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, token.as_str()),
            None => builder,
        }
    }

    fn list_request(&self, kind: EntityKind, parent: Option<&EntityId>) -> RequestBuilder {
        let builder = self.request(Method::GET, kind.path());
        match parent {
            Some(parent) => builder.query(&[("categoryId", parent.as_str())]),
            None => builder,
        }
    }

    fn create_request(
        &self,
        kind: EntityKind,
        form: &FormPayload,
    ) -> Result<RequestBuilder, CatalogError> {
        Self::with_form(self.request(Method::POST, kind.path()), form)
    }

    fn update_request(
        &self,
        kind: EntityKind,
        id: &EntityId,
        form: &FormPayload,
    ) -> Result<RequestBuilder, CatalogError> {
        let path = format!("{}/{}", kind.path(), id);
        Self::with_form(self.request(Method::PATCH, &path), form)
    }

    fn delete_request(&self, kind: EntityKind, id: &EntityId) -> RequestBuilder {
        let path = format!("{}/{}", kind.path(), id);
        self.request(Method::DELETE, &path)
    }

    fn with_form(builder: RequestBuilder, form: &FormPayload) -> Result<RequestBuilder, CatalogError> {
        let Some(image) = form.image() else {
            return Ok(builder.json(&form.to_json()));
        };

        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime_type())
            .map_err(CatalogError::transport)?;
        let multipart = form
            .fields()
            .iter()
            .fold(Form::new(), |acc, (key, value)| {
                acc.text(key.clone(), value.clone())
            })
            .part("image", part);
        Ok(builder.multipart(multipart))
    }

    async fn send(
        builder: RequestBuilder,
        kind: EntityKind,
        id: Option<&EntityId>,
    ) -> Result<Response, CatalogError> {
        let response = builder.send().await.map_err(CatalogError::transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(status, kind, id, &body))
    }
}

/// Map a non-success response onto the catalog error taxonomy.
pub fn classify_failure(
    status: StatusCode,
    kind: EntityKind,
    id: Option<&EntityId>,
    body: &str,
) -> CatalogError {
    let message = failure_message(body);
    match (status, id) {
        (StatusCode::NOT_FOUND, Some(id)) => CatalogError::NotFound {
            kind,
            id: id.clone(),
        },
        (StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            let message = if message.is_empty() {
                format!("{} was rejected by the store", kind)
            } else {
                message
            };
            CatalogError::validation("form", message)
        }
        _ => CatalogError::Transport(if message.is_empty() {
            format!("store answered {}", status)
        } else {
            format!("store answered {}: {}", status, message)
        }),
    }
}

/// Pull a human-readable message out of an error body.
fn failure_message(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    body.trim().chars().take(200).collect()
}

#[async_trait]
impl CatalogStore for HttpStore {
    async fn list(
        &self,
        kind: EntityKind,
        parent: Option<&EntityId>,
    ) -> Result<Vec<Value>, CatalogError> {
        let response = Self::send(self.list_request(kind, parent), kind, None).await?;
        let envelope: Envelope<Vec<Value>> =
            response.json().await.map_err(CatalogError::transport)?;
        Ok(envelope.data)
    }

    async fn create(&self, kind: EntityKind, form: &FormPayload) -> Result<(), CatalogError> {
        Self::send(self.create_request(kind, form)?, kind, None).await?;
        Ok(())
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        form: &FormPayload,
    ) -> Result<(), CatalogError> {
        Self::send(self.update_request(kind, id, form)?, kind, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), CatalogError> {
        Self::send(self.delete_request(kind, id), kind, Some(id)).await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&Credentials { username, password })
            .send()
            .await
            .context("Failed to reach login endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("login rejected ({}): {}", status, failure_message(&body)));
        }
        let body: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;
        Ok(body.token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&Credentials { username, password })
            .send()
            .await
            .context("Failed to reach register endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "registration rejected ({}): {}",
                status,
                failure_message(&body)
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ImageUpload;
    use reqwest::header::{HeaderName, CONTENT_TYPE};
    use reqwest::Request;

    fn store(token: Option<&str>) -> HttpStore {
        HttpStore::new("http://localhost:3000/", token.map(str::to_string)).unwrap()
    }

    fn header(request: &Request, name: HeaderName) -> Option<&str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn token_is_sent_raw_without_bearer_prefix() {
        let request = store(Some("abc123"))
            .list_request(EntityKind::Category, None)
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().as_str(), "http://localhost:3000/category");
        assert_eq!(header(&request, AUTHORIZATION), Some("abc123"));
    }

    #[test]
    fn anonymous_store_sends_no_authorization() {
        let request = store(None)
            .delete_request(EntityKind::Product, &EntityId::new("42"))
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().as_str(), "http://localhost:3000/product/42");
        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn subcategory_listing_filters_by_category_id() {
        let request = store(Some("t"))
            .list_request(EntityKind::Subcategory, Some(&EntityId::new("mem-1")))
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://localhost:3000/subcategory?categoryId=mem-1"
        );
    }

    #[test]
    fn create_without_image_posts_json() {
        let form = FormPayload::new().field("name", "Shoes").field("status", "active");
        let request = store(Some("t"))
            .create_request(EntityKind::Category, &form)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:3000/category");
        assert_eq!(header(&request, CONTENT_TYPE), Some("application/json"));

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Shoes", "status": "active" }));
    }

    #[test]
    fn update_with_image_patches_multipart() {
        let form = FormPayload::new()
            .field("name", "Boots")
            .with_image(ImageUpload {
                file_name: "boots.png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            });
        let request = store(Some("t"))
            .update_request(EntityKind::Product, &EntityId::new("42"), &form)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().as_str(), "http://localhost:3000/product/42");
        let content_type = header(&request, CONTENT_TYPE).unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(header(&request, AUTHORIZATION), Some("t"));
    }

    #[test]
    fn missing_target_maps_to_not_found() {
        let id = EntityId::new("42");
        let err = classify_failure(StatusCode::NOT_FOUND, EntityKind::Product, Some(&id), "");
        assert_eq!(
            err,
            CatalogError::NotFound {
                kind: EntityKind::Product,
                id
            }
        );
    }

    #[test]
    fn rejection_carries_store_message() {
        let err = classify_failure(
            StatusCode::CONFLICT,
            EntityKind::Category,
            None,
            r#"{"message":"Category already exists"}"#,
        );
        assert_eq!(
            err,
            CatalogError::validation("form", "Category already exists")
        );
    }

    #[test]
    fn auth_and_server_failures_are_transport() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, EntityKind::Category, None, "nope");
        assert!(matches!(err, CatalogError::Transport(ref m) if m.contains("401")));

        let err = classify_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            EntityKind::Category,
            None,
            "",
        );
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[test]
    fn list_404_without_target_is_transport() {
        let err = classify_failure(StatusCode::NOT_FOUND, EntityKind::Category, None, "");
        assert!(matches!(err, CatalogError::Transport(_)));
    }

    #[test]
    fn failure_message_prefers_json_fields() {
        assert_eq!(failure_message(r#"{"error":"bad"}"#), "bad");
        assert_eq!(failure_message("  plain text  "), "plain text");
    }

    #[test]
    fn envelope_unwraps_data() {
        let envelope: Envelope<Vec<Value>> =
            serde_json::from_str(r#"{"data":[{"_id":"1","name":"Shoes"}]}"#).unwrap();
        assert_eq!(envelope.data.len(), 1);
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let store = HttpStore::new("http://localhost:3000/", None).unwrap();
        assert_eq!(store.base_url, "http://localhost:3000");
    }
}
