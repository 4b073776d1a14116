//! Installed-application login over a loopback redirect.
//!
//! The browser is sent to the consent screen with a `redirect_uri` pointing at
//! an ephemeral listener on `127.0.0.1`. The first request carrying `code` or
//! `error` completes the login.

use super::pkce::random_urlsafe;
use super::{AuthorizationCodeFlow, OAuthClient};
use crate::error::{Error, Result};
use crate::token::Token;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

const SUCCESS_PAGE: &str = "<html><body><h3>Authorization complete.</h3>\
    <p>You can close this window and return to the application.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h3>Authorization failed.</h3>\
    <p>Return to the application for details.</p></body></html>";

/// Browser-based login that receives the authorization code on localhost.
#[derive(Debug)]
pub struct LoopbackLogin {
    client: OAuthClient,
    timeout: Duration,
}

impl LoopbackLogin {
    /// Creates a login for the given client, giving up after `timeout`.
    ///
    /// The provider's default scopes are requested.
    #[must_use]
    pub const fn new(client: OAuthClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Runs the login.
    ///
    /// `open` receives the consent URL; it is expected to hand it to a
    /// browser. The call resolves once the redirect arrives and the code has
    /// been exchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no redirect arrives in time,
    /// [`Error::AccessDenied`] if the user declines, or the token endpoint's
    /// error if the exchange fails.
    pub async fn authorize<F>(self, open: F) -> Result<Token>
    where
        F: FnOnce(&Url),
    {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let port = listener.local_addr()?.port();
        let client = self
            .client
            .with_redirect_uri(format!("http://{}:{port}", Ipv4Addr::LOCALHOST));

        let flow = AuthorizationCodeFlow::new(client).with_pkce();
        let state = random_urlsafe(24);
        let url = flow.authorization_url(None, Some(&state))?;

        info!(port, "Waiting for authorization redirect");
        open(&url);

        let code = tokio::time::timeout(self.timeout, receive_code(&listener, &state))
            .await
            .map_err(|_| Error::Timeout(self.timeout.as_secs()))??;

        debug!("Received authorization code, exchanging for token");
        flow.exchange_code(&code).await
    }
}

/// How long one connection may take to deliver its request head.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Accepts connections on `listener` until one carries an authorization
/// response, and returns its code.
///
/// Each connection is read on its own task, so an idle socket (a browser
/// preconnect, for instance) cannot hold up the redirect. Requests without
/// `code` or `error` get a 404; connections that stall or send garbage are
/// dropped.
///
/// # Errors
///
/// Returns [`Error::AccessDenied`] for `error=access_denied`, an
/// [`Error::OAuth`] for other provider errors and [`Error::StateMismatch`] if
/// `state` differs from `expected_state`.
pub async fn receive_code(listener: &TcpListener, expected_state: &str) -> Result<String> {
    let (tx, mut rx) = mpsc::channel::<Result<String>>(1);

    loop {
        tokio::select! {
            biased;

            Some(outcome) = rx.recv() => return outcome,
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        debug!("Loopback accept failed: {e}");
                        continue;
                    }
                };
                debug!(%peer, "Loopback connection");

                let tx = tx.clone();
                let expected_state = expected_state.to_string();
                tokio::spawn(async move {
                    let answered =
                        tokio::time::timeout(REQUEST_TIMEOUT, answer(stream, &expected_state));
                    match answered.await {
                        Ok(Ok(Some(outcome))) => {
                            let _ = tx.send(outcome).await;
                        }
                        Ok(Ok(None)) => {}
                        Ok(Err(e)) => debug!(%peer, "Dropping loopback connection: {e}"),
                        Err(_) => debug!(%peer, "Dropping idle loopback connection"),
                    }
                });
            }
        }
    }
}

/// Answers one request. `None` means it was not an authorization response.
async fn answer(
    stream: TcpStream,
    expected_state: &str,
) -> std::io::Result<Option<Result<String>>> {
    let (mut stream, target) = read_request_target(stream).await?;
    let params = target.as_deref().and_then(query_params).unwrap_or_default();

    if let Some(error) = params.get("error") {
        respond(&mut stream, "200 OK", FAILURE_PAGE).await;
        return Ok(Some(Err(if error == "access_denied" {
            Error::AccessDenied
        } else {
            Error::oauth_error(
                error.clone(),
                params.get("error_description").cloned().unwrap_or_default(),
            )
        })));
    }

    let Some(code) = params.get("code") else {
        respond(&mut stream, "404 Not Found", "").await;
        return Ok(None);
    };

    if params.get("state").map(String::as_str) != Some(expected_state) {
        respond(&mut stream, "400 Bad Request", FAILURE_PAGE).await;
        return Ok(Some(Err(Error::StateMismatch)));
    }

    respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
    Ok(Some(Ok(code.clone())))
}

/// Reads the request line and drains the headers.
async fn read_request_target(stream: TcpStream) -> std::io::Result<(TcpStream, Option<String>)> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut header = String::new();
    loop {
        header.clear();
        let n = reader.read_line(&mut header).await?;
        if n == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let target = request_line.split_whitespace().nth(1).map(str::to_string);
    Ok((reader.into_inner(), target))
}

fn query_params(target: &str) -> Option<HashMap<String, String>> {
    let url = Url::parse(&format!("http://{}{target}", Ipv4Addr::LOCALHOST)).ok()?;
    Some(url.query_pairs().into_owned().collect())
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        warn!("Failed to answer loopback request: {e}");
        return;
    }
    let _ = stream.shutdown().await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn request(addr: std::net::SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").as_bytes())
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    async fn listener() -> (TcpListener, std::net::SocketAddr) {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        (listener, addr)
    }

    #[tokio::test]
    async fn test_receives_code() {
        let (listener, addr) = listener().await;
        let browser = tokio::spawn(async move {
            request(addr, "/?state=xyz&code=4%2Fabc&scope=gmail.send").await
        });

        let code = receive_code(&listener, "xyz").await.unwrap();
        assert_eq!(code, "4/abc");

        let page = browser.await.unwrap();
        assert!(page.starts_with("HTTP/1.1 200 OK"));
        assert!(page.contains("Authorization complete"));
    }

    #[tokio::test]
    async fn test_ignores_unrelated_requests() {
        let (listener, addr) = listener().await;
        let browser = tokio::spawn(async move {
            let first = request(addr, "/favicon.ico").await;
            let second = request(addr, "/?code=c0de&state=s").await;
            (first, second)
        });

        let code = receive_code(&listener, "s").await.unwrap();
        assert_eq!(code, "c0de");

        let (first, _) = browser.await.unwrap();
        assert!(first.starts_with("HTTP/1.1 404"));
    }

    #[tokio::test]
    async fn test_access_denied() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move { request(addr, "/?error=access_denied&state=s").await });

        let result = receive_code(&listener, "s").await;
        assert!(matches!(result, Err(Error::AccessDenied)));
    }

    #[tokio::test]
    async fn test_provider_error() {
        let (listener, addr) = listener().await;
        tokio::spawn(async move {
            request(addr, "/?error=invalid_scope&error_description=bad+scope").await
        });

        match receive_code(&listener, "s").await {
            Err(Error::OAuth { error, description }) => {
                assert_eq!(error, "invalid_scope");
                assert_eq!(description, "bad scope");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_state_mismatch() {
        let (listener, addr) = listener().await;
        let browser = tokio::spawn(async move { request(addr, "/?code=c&state=forged").await });

        let result = receive_code(&listener, "expected").await;
        assert!(matches!(result, Err(Error::StateMismatch)));
        assert!(browser.await.unwrap().starts_with("HTTP/1.1 400"));
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        let (listener, addr) = listener().await;
        let _preconnect = TcpStream::connect(addr).await.unwrap();
        let browser = tokio::spawn(async move { request(addr, "/?state=xyz&code=abc").await });

        let code = tokio::time::timeout(Duration::from_secs(3), receive_code(&listener, "xyz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code, "abc");
        assert!(browser.await.unwrap().starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn test_garbage_connection_is_skipped() {
        let (listener, addr) = listener().await;
        let browser = tokio::spawn(async move {
            let mut junk = TcpStream::connect(addr).await.unwrap();
            junk.write_all(&[0xff, 0xfe, b'\n']).await.unwrap();
            drop(junk);
            request(addr, "/?state=s&code=ok").await
        });

        let code = tokio::time::timeout(Duration::from_secs(3), receive_code(&listener, "s"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(code, "ok");
        assert!(browser.await.unwrap().starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_times_out() {
        let client = OAuthClient::new("id", crate::Provider::google().unwrap());
        let login = LoopbackLogin::new(client, Duration::from_secs(5));

        let mut opened = None;
        let result = login.authorize(|url| opened = Some(url.clone())).await;

        assert!(matches!(result, Err(Error::Timeout(5))));
        let url = opened.unwrap();
        assert!(url.as_str().contains("redirect_uri=http%3A%2F%2F127.0.0.1%3A"));
        assert!(url.as_str().contains("code_challenge_method=S256"));
    }
}
