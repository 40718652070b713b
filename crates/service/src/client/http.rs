use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument, warn};

use models::{Record, RecordInput, User, UserInput};

use super::{ClientError, RecordsApi, UsersApi};

/// HTTP client for the REST resource store.
///
/// Every request carries `Content-Type: application/json`; any non-2xx
/// answer becomes [`ClientError::Status`]. No retries.
#[derive(Clone, Debug)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ResourceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, ClientError> {
        debug!(%method, %url, "resource request");
        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.body(body);
        }
        let resp = req.send().await.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            warn!(%method, %url, status = status.as_u16(), "resource request failed");
            return Err(ClientError::Status { status: status.as_u16(), status_text });
        }
        Ok(resp)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, ClientError> {
        let resp = self.call(method, url, body).await?;
        resp.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn parse(&self, path: &str) -> Result<Url, ClientError> {
        Url::parse(&self.url(path)).map_err(|e| ClientError::Network(e.to_string()))
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(body).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl RecordsApi for ResourceClient {
    #[instrument(skip(self))]
    async fn list_records(&self) -> Result<Vec<Record>, ClientError> {
        self.fetch(Method::GET, self.parse("/records")?, None).await
    }

    #[instrument(skip(self))]
    async fn get_record(&self, id: &str) -> Result<Record, ClientError> {
        self.fetch(Method::GET, self.parse(&format!("/records/{id}"))?, None).await
    }

    #[instrument(skip(self, input), fields(plate = %input.car_plate))]
    async fn create_record(&self, input: &RecordInput) -> Result<Record, ClientError> {
        self.fetch(Method::POST, self.parse("/records")?, Some(encode(input)?)).await
    }

    #[instrument(skip(self, input))]
    async fn update_record(&self, id: &str, input: &RecordInput) -> Result<Record, ClientError> {
        self.fetch(Method::PUT, self.parse(&format!("/records/{id}"))?, Some(encode(input)?)).await
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: &str) -> Result<(), ClientError> {
        self.call(Method::DELETE, self.parse(&format!("/records/{id}"))?, None).await?;
        Ok(())
    }
}

#[async_trait]
impl UsersApi for ResourceClient {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.fetch(Method::GET, self.parse("/users")?, None).await
    }

    #[instrument(skip(self))]
    async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, ClientError> {
        let url = Url::parse_with_params(&self.url("/users"), &[("email", email)])
            .map_err(|e| ClientError::Network(e.to_string()))?;
        self.fetch(Method::GET, url, None).await
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn create_user(&self, input: &UserInput) -> Result<User, ClientError> {
        self.fetch(Method::POST, self.parse("/users")?, Some(encode(input)?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = ResourceClient::with_client(reqwest::Client::new(), "http://localhost:3001/");
        assert_eq!(c.base_url(), "http://localhost:3001");
        assert_eq!(c.url("/records/7"), "http://localhost:3001/records/7");
    }

    #[tokio::test]
    async fn unreachable_store_is_network_error() {
        let c = ResourceClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = c.list_records().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(err.status(), None);
    }
}
