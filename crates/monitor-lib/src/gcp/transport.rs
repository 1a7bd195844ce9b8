//! Authenticated JSON transport shared by the service clients

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{CloudError, ErrorKind, MonitorError};

/// Google API error envelope: `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// A list response that may continue on another page
pub trait Page: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

/// HTTP transport carrying the bearer token
#[derive(Clone)]
pub struct RestTransport {
    client: Client,
    access_token: String,
}

impl RestTransport {
    /// Create a new transport. Without a timeout requests wait indefinitely.
    pub fn new(access_token: &str, timeout: Option<Duration>) -> Result<Self, MonitorError> {
        if access_token.trim().is_empty() {
            return Err(MonitorError::ClientInit(
                "access token is empty".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| MonitorError::ClientInit(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            access_token: access_token.trim().to_string(),
        })
    }

    /// Parse a service base URL so relative paths append to it
    pub fn base_url(raw: &str) -> Result<Url, MonitorError> {
        let mut normalized = raw.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        Url::parse(&normalized)
            .map_err(|e| MonitorError::ClientInit(format!("invalid endpoint {}: {}", raw, e)))
    }

    fn request(&self, method: Method, base: &Url, path: &str) -> Result<RequestBuilder, CloudError> {
        let url = base
            .join(path)
            .map_err(|e| CloudError::new(ErrorKind::InvalidArgument, format!("invalid path {}: {}", path, e)))?;
        debug!(method = %method, url = %url, "Sending request");
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.access_token))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CloudError> {
        let response = self.request(Method::GET, base, path)?.query(query).send().await?;
        decode(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        base: &Url,
        path: &str,
        body: &B,
    ) -> Result<T, CloudError> {
        let response = self.request(Method::POST, base, path)?.json(body).send().await?;
        decode(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        base: &Url,
        path: &str,
        body: &B,
    ) -> Result<T, CloudError> {
        let response = self.request(Method::PUT, base, path)?.json(body).send().await?;
        decode(response).await
    }

    /// GET every page of a list endpoint
    pub async fn get_all<P: Page>(
        &self,
        base: &Url,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<P::Item>, CloudError> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = query.to_vec();
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }

            let page: P = self.get(base, path, &params).await?;
            let (mut batch, next) = page.into_parts();
            items.append(&mut batch);

            match next.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CloudError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_body(status.as_u16(), &body));
    }

    response
        .json()
        .await
        .map_err(|e| CloudError::new(ErrorKind::Decode, format!("failed to parse response: {}", e)))
}

pub(crate) fn error_from_body(http_code: u16, body: &str) -> CloudError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let kind = ErrorKind::classify(
                envelope.error.status.as_deref(),
                Some(http_code),
                &envelope.error.message,
            );
            let message = if envelope.error.message.is_empty() {
                format!("API error ({})", http_code)
            } else {
                envelope.error.message
            };
            CloudError::new(kind, message)
        }
        Err(_) => {
            let message = format!("API error ({}): {}", http_code, body.trim());
            CloudError::new(ErrorKind::classify(None, Some(http_code), body), message)
        }
    }
}
