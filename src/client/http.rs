use crate::api::schemas::messaging::{Conversation, ErrorBody, Message, SendMessage, UnreadCount};
use crate::client::{ClientConfig, ClientError};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Typed wrapper over the messaging REST endpoints for one signed-in session.
#[derive(Clone, Debug)]
pub struct MessagingClient {
    http: reqwest::Client,
    base_url: String,
}

impl MessagingClient {
    /// Builds a client that sends `token` as the session cookie on every request.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidInput` if the token cannot be used in a header,
    /// or `ClientError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, token: &str) -> Result<Self, ClientError> {
        let mut cookie = HeaderValue::from_str(&format!("{}={token}", config.cookie_name))
            .map_err(|_| ClientError::InvalidInput("session token is not a valid cookie value".to_string()))?;
        cookie.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, cookie);

        let http = reqwest::Client::builder().default_headers(headers).timeout(config.request_timeout).build()?;

        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    /// `POST /messages`
    ///
    /// # Errors
    /// Returns `ClientError::Api` with the server's message on a non-success status.
    #[tracing::instrument(level = "debug", skip(self, content), err)]
    pub async fn send_message(&self, recipient_id: Uuid, content: &str) -> Result<Message, ClientError> {
        let response =
            self.http.post(self.url("/messages")).json(&SendMessage::new(recipient_id, content)).send().await?;
        decode(response).await
    }

    /// `GET /messages/conversations`
    ///
    /// # Errors
    /// Returns `ClientError::Api` with the server's message on a non-success status.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let response = self.http.get(self.url("/messages/conversations")).send().await?;
        decode(response).await
    }

    /// `GET /messages/{userId}`
    ///
    /// # Errors
    /// Returns `ClientError::Api` with the server's message on a non-success status.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn list_thread(&self, user_id: Uuid) -> Result<Vec<Message>, ClientError> {
        let response = self.http.get(self.url(&format!("/messages/{user_id}"))).send().await?;
        decode(response).await
    }

    /// `GET /messages/unread/count`
    ///
    /// # Errors
    /// Returns `ClientError::Api` with the server's message on a non-success status.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        let response = self.http.get(self.url("/messages/unread/count")).send().await?;
        let UnreadCount { count } = decode(response).await?;
        Ok(count)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
    };
    Err(ClientError::Api { status: status.as_u16(), message })
}
