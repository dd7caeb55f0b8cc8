use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{ApiError, PetApi};
use crate::models::{CareEvent, NewCare, NewPet, Pet};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the pet-care service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if a response is successful, turning non-2xx into an
    /// `ApiError` built from the body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response_body(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response).await?;
        debug!(url = %url, "GET ok");
        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check(response).await?;
        debug!(url = %url, "POST ok");
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        debug!(url = %url, "DELETE ok");
        Ok(())
    }
}

impl PetApi for ApiClient {
    async fn list_pets(&self, limit: u32, offset: u32) -> Result<Vec<Pet>, ApiError> {
        self.get_json(&format!("/mascotas?limit={}&offset={}", limit, offset))
            .await
    }

    async fn create_pet(&self, pet: &NewPet) -> Result<Pet, ApiError> {
        self.post_json("/mascotas", pet).await
    }

    async fn delete_pet(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/mascotas/{}", id)).await
    }

    async fn list_cares(&self, pet_id: i64) -> Result<Vec<CareEvent>, ApiError> {
        self.get_json(&format!("/mascotas/{}/cuidados", pet_id)).await
    }

    async fn create_care(&self, pet_id: i64, care: &NewCare) -> Result<CareEvent, ApiError> {
        self.post_json(&format!("/mascotas/{}/cuidados", pet_id), care)
            .await
    }

    async fn delete_care(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/cuidados/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/").expect("Failed to build client");
        assert_eq!(client.url("/mascotas"), "http://localhost:8080/mascotas");

        let client = ApiClient::new("http://localhost:8080").expect("Failed to build client");
        assert_eq!(client.url("/cuidados/3"), "http://localhost:8080/cuidados/3");
    }
}
