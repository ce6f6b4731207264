//! WebSocket client for the collection server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{NewQuiz, QuizDocument, QuizSummary};
use crate::protocol::{StoreRequest, StoreResponse};

use super::{QuizStore, StoreError, validate_questions};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to a collection server. Connects lazily and reconnects on the next
/// request after any failure; requests are never retried.
pub struct RemoteStore {
    url: String,
    stream: Option<WsStream>,
    timeout: Duration,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("url", &self.url)
            .field("connected", &self.stream.is_some())
            .finish()
    }
}

impl RemoteStore {
    /// `addr` is either a `ws://` URL or a bare `host:port`.
    pub fn new(addr: &str) -> Self {
        let url = if addr.starts_with("ws://") || addr.starts_with("wss://") {
            addr.to_string()
        } else {
            format!("ws://{}", addr)
        };

        Self {
            url,
            stream: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, request: StoreRequest) -> Result<StoreResponse, StoreError> {
        let result = match time::timeout(self.timeout, self.exchange(&request)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Network("request timed out".to_string())),
        };

        if let Err(e) = &result {
            warn!(url = %self.url, error = %e, "store request failed");
            self.stream = None;
        }
        result
    }

    async fn exchange(&mut self, request: &StoreRequest) -> Result<StoreResponse, StoreError> {
        let json = serde_json::to_string(request)?;
        let stream = self.connection().await?;

        stream.send(Message::Text(json.into())).await?;

        while let Some(msg) = stream.next().await {
            match msg? {
                Message::Text(text) => {
                    let response: StoreResponse = serde_json::from_str(&text.to_string())?;
                    return Ok(response);
                }
                Message::Close(_) => break,
                _ => continue,
            }
        }

        Err(StoreError::Network("connection closed by server".to_string()))
    }

    async fn connection(&mut self) -> Result<&mut WsStream, StoreError> {
        if self.stream.is_none() {
            debug!(url = %self.url, "connecting to collection server");
            let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| StoreError::Network("not connected".to_string()))
    }
}

fn into_error(response: StoreResponse) -> StoreError {
    match response {
        StoreResponse::Error { status, message } => StoreError::Status { status, message },
        _ => StoreError::UnexpectedResponse,
    }
}

impl QuizStore for RemoteStore {
    async fn list(&mut self) -> Result<Vec<QuizSummary>, StoreError> {
        match self.request(StoreRequest::List).await? {
            StoreResponse::Summaries { quizzes } => Ok(quizzes),
            other => Err(into_error(other)),
        }
    }

    async fn get(&mut self, id: Uuid) -> Result<QuizDocument, StoreError> {
        match self.request(StoreRequest::Get { id }).await? {
            StoreResponse::Document { quiz } => {
                validate_questions(&quiz.questions)?;
                Ok(quiz)
            }
            StoreResponse::Error { status: 404, .. } => Err(StoreError::NotFound(id)),
            other => Err(into_error(other)),
        }
    }

    async fn create(&mut self, quiz: NewQuiz) -> Result<QuizDocument, StoreError> {
        match self.request(quiz.into()).await? {
            StoreResponse::Document { quiz } => Ok(quiz),
            StoreResponse::Error { status: 400, message } => Err(StoreError::Invalid(message)),
            other => Err(into_error(other)),
        }
    }

    async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        match self.request(StoreRequest::Delete { id }).await? {
            StoreResponse::Deleted { .. } => Ok(()),
            other => Err(into_error(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_normalization() {
        assert_eq!(RemoteStore::new("127.0.0.1:8713").url(), "ws://127.0.0.1:8713");
        assert_eq!(RemoteStore::new("ws://quiz.local:1").url(), "ws://quiz.local:1");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut store = RemoteStore::new(&addr.to_string()).with_timeout(Duration::from_secs(2));
        assert!(matches!(store.list().await, Err(StoreError::Network(_))));
    }
}
