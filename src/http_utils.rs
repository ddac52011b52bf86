use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use thiserror::Error;

use crate::cli_utils;

/// A non-success response from the garden API.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    /// Builds an error from a response body, preferring the `{"error": {...}}` envelope.
    fn from_body(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                let error = value.get("error")?;
                let code = error.get("code")?.as_str()?;
                let message = error.get("message")?.as_str()?;
                Some(format!("{} ({})", message, code))
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    "No error details".to_string()
                } else {
                    body.to_string()
                }
            });
        Self { status, message }
    }
}

pub struct GardenClient {
    client: Client,
    base_url: String,
}

impl GardenClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Constructs a full API URL from a path
    pub fn api_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// Makes a GET request and handles the response
    pub async fn get<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// Makes a POST request with JSON body and handles the response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Makes a POST request without body and handles the response
    pub async fn post_empty<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.post(&url).send().await?;
        self.handle_response(response).await
    }

    /// Makes a PUT request with JSON body and handles the response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.put(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    /// Makes a DELETE request with no response body expected
    pub async fn delete(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let url = self.api_url(path);
        let response = self.client.delete(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Box::new(HttpError::from_body(status, &body)))
        }
    }

    /// Makes a DELETE request whose response carries a JSON body
    pub async fn delete_with_body<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let url = self.api_url(path);
        let response = self.client.delete(&url).send().await?;
        self.handle_response(response).await
    }

    /// Handles HTTP response, deserializing success or returning error
    async fn handle_response<T>(&self, response: Response) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Box::new(HttpError::from_body(status, &body)))
        }
    }
}

/// Execute an HTTP operation and exit on error with formatted message
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, Box<dyn Error>>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_paths() {
        let client = GardenClient::new("http://localhost:8080/".to_string());
        assert_eq!(
            client.api_url("/plants/3"),
            "http://localhost:8080/api/v1/plants/3"
        );
        assert_eq!(
            client.api_url("plants"),
            "http://localhost:8080/api/v1/plants"
        );
    }

    #[test]
    fn error_envelope_is_unwrapped() {
        let body = r#"{"error":{"code":"OUT_OF_RANGE","message":"latitude must be between -90 and 90 degrees, got 91"}}"#;
        let err = HttpError::from_body(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.message,
            "latitude must be between -90 and 90 degrees, got 91 (OUT_OF_RANGE)"
        );
        let err = HttpError::from_body(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.message, "No error details");
        assert!(err.to_string().starts_with("502"));
    }
}
