//! HTTPS client for the Gmail REST API.

use super::{ApiError, MailApi, Profile, Receipt};
use crate::compose::RawMessage;
use maillist_oauth::Token;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Gmail API client authorized with a bearer token.
#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
    authorization: String,
}

impl GmailClient {
    /// Production endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Creates a client that authenticates with `token`.
    #[must_use]
    pub fn new(token: &Token) -> Self {
        Self {
            http: Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            authorization: token.authorization_header(),
        }
    }

    /// Points the client at another API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status.as_u16(), &body));
        }
        Ok(response.json().await?)
    }
}

impl MailApi for GmailClient {
    async fn get_profile(&self) -> Result<Profile, ApiError> {
        let url = format!("{}/users/me/profile", self.base_url);
        debug!("GET {url}");
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn send(&self, user_id: &str, message: &RawMessage) -> Result<Receipt, ApiError> {
        let url = format!("{}/users/{user_id}/messages/send", self.base_url);
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .json(message)
            .send()
            .await?;
        Self::parse(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Captured request: request line, headers and body.
    struct Captured {
        request_line: String,
        headers: Vec<String>,
        body: String,
    }

    /// Serves one canned response and returns what the client sent.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/gmail/v1", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(stream);

            let mut request_line = String::new();
            reader.read_line(&mut request_line).await.unwrap();

            let mut headers = Vec::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).await.unwrap();
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap();
                }
                headers.push(line);
            }

            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).await.unwrap();

            let mut stream = reader.into_inner();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            Captured {
                request_line,
                headers,
                body: String::from_utf8(request_body).unwrap(),
            }
        });

        (base_url, server)
    }

    fn client(base_url: String) -> GmailClient {
        GmailClient::new(&Token::new("secret-token", "Bearer")).with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_get_profile() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"emailAddress": "me@x.com", "messagesTotal": 3, "threadsTotal": 2, "historyId": "1"}"#,
        )
        .await;

        let profile = client(base_url).get_profile().await.unwrap();
        assert_eq!(profile.email_address, "me@x.com");

        let captured = server.await.unwrap();
        assert!(captured.request_line.starts_with("GET /gmail/v1/users/me/profile "));
        assert!(
            captured
                .headers
                .iter()
                .any(|h| h.eq_ignore_ascii_case("authorization: Bearer secret-token"))
        );
    }

    #[tokio::test]
    async fn test_send_posts_raw_payload() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"id": "m1", "threadId": "t1", "labelIds": ["SENT"]}"#).await;

        let raw = RawMessage {
            raw: "VG86IGFAeC5jb20=".to_string(),
        };
        let receipt = client(base_url).send("me", &raw).await.unwrap();
        assert_eq!(receipt.id, "m1");

        let captured = server.await.unwrap();
        assert!(captured.request_line.starts_with("POST /gmail/v1/users/me/messages/send "));
        let body: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
        assert_eq!(body["raw"], "VG86IGFAeC5jb20=");
    }

    #[tokio::test]
    async fn test_service_error() {
        let (base_url, server) = serve_once(
            "400 Bad Request",
            r#"{"error": {"code": 400, "message": "Invalid To header", "status": "INVALID_ARGUMENT"}}"#,
        )
        .await;

        let raw = RawMessage { raw: String::new() };
        let error = client(base_url).send("me", &raw).await.unwrap_err();
        assert_eq!(
            error,
            ApiError::Service {
                status: 400,
                message: "Invalid To header".to_string()
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = client(format!("http://{addr}")).get_profile().await.unwrap_err();
        assert!(matches!(error, ApiError::Transport(_)));
    }
}
