//! WebSocket server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::models::NewQuiz;
use crate::protocol::{StoreRequest, StoreResponse, status};
use crate::store::{QuizCollection, StoreError};

/// Collection shared between connections.
pub type SharedCollection = Arc<Mutex<QuizCollection>>;

/// Run the collection server until Ctrl-C.
pub async fn run(port: u16, collection: QuizCollection) -> Result<(), Box<dyn std::error::Error>> {
    let collection = Arc::new(Mutex::new(collection));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "collection server listening");

    tokio::select! {
        _ = serve(listener, collection) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("shutting down");
        }
    }

    Ok(())
}

/// Accept connections on `listener` forever.
pub async fn serve(listener: TcpListener, collection: SharedCollection) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let collection = Arc::clone(&collection);
                tokio::spawn(handle_connection(stream, addr, collection));
            }
            Err(e) => {
                error!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, collection: SharedCollection) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%addr, error = %e, "WebSocket handshake failed");
            return;
        }
    };
    debug!(%addr, "client connected");

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                debug!(%addr, error = %e, "connection error");
                break;
            }
            _ => continue,
        };

        let response = match serde_json::from_str::<StoreRequest>(&text) {
            Ok(request) => apply(&collection, request).await,
            Err(e) => StoreResponse::error(status::BAD_REQUEST, format!("malformed request: {}", e)),
        };

        let json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to encode response");
                break;
            }
        };

        if ws_sender.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }

    debug!(%addr, "client disconnected");
}

/// Run a request on the blocking pool, since writes rewrite the backing file.
async fn apply(collection: &SharedCollection, request: StoreRequest) -> StoreResponse {
    let collection = Arc::clone(collection);
    let task = tokio::task::spawn_blocking(move || {
        let mut collection = collection.blocking_lock();
        handle_request(&mut collection, request)
    });

    match task.await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "request task failed");
            StoreResponse::error(status::INTERNAL_ERROR, "request failed")
        }
    }
}

/// Apply one request to the collection.
pub fn handle_request(collection: &mut QuizCollection, request: StoreRequest) -> StoreResponse {
    let result = match request {
        StoreRequest::List => Ok(StoreResponse::Summaries {
            quizzes: collection.summaries(),
        }),
        StoreRequest::Get { id } => match collection.find(id) {
            Some(quiz) => Ok(StoreResponse::Document { quiz: quiz.clone() }),
            None => Err(StoreError::NotFound(id)),
        },
        StoreRequest::Create {
            name,
            questions,
            count,
        } => {
            if count != questions.len() {
                warn!(count, actual = questions.len(), "create request count mismatch, recomputing");
            }
            collection
                .insert(NewQuiz::new(name, questions))
                .map(|quiz| StoreResponse::Document { quiz })
        }
        StoreRequest::Delete { id } => collection
            .remove(id)
            .map(|_| StoreResponse::Deleted { id }),
    };

    result.unwrap_or_else(|e| {
        if e.status() >= status::INTERNAL_ERROR {
            error!(error = %e, "request failed");
        }
        StoreResponse::error(e.status(), e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::models::Question;
    use crate::store::{QuizStore, RemoteStore};

    use super::*;

    fn questions() -> Vec<Question> {
        vec![Question::new(
            0,
            "2+2=?".into(),
            vec!["3".into(), "4".into()],
            1,
        )]
    }

    #[test]
    fn test_handle_request_errors() {
        let mut collection = QuizCollection::in_memory();

        let response = handle_request(&mut collection, StoreRequest::Get { id: Uuid::new_v4() });
        assert!(matches!(response, StoreResponse::Error { status: 404, .. }));

        let response = handle_request(
            &mut collection,
            StoreRequest::Create {
                name: String::new(),
                questions: questions(),
                count: 1,
            },
        );
        assert!(matches!(response, StoreResponse::Error { status: 400, .. }));

        let id = Uuid::new_v4();
        let response = handle_request(&mut collection, StoreRequest::Delete { id });
        assert_eq!(response, StoreResponse::Deleted { id });
    }

    #[test]
    fn test_create_recomputes_count() {
        let mut collection = QuizCollection::in_memory();
        let response = handle_request(
            &mut collection,
            StoreRequest::Create {
                name: "Set".into(),
                questions: questions(),
                count: 99,
            },
        );

        let StoreResponse::Document { quiz } = response else {
            panic!("expected a document");
        };
        assert_eq!(quiz.count, 1);
    }

    #[tokio::test]
    async fn test_round_trip_over_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let collection = Arc::new(Mutex::new(QuizCollection::in_memory()));
        tokio::spawn(serve(listener, Arc::clone(&collection)));

        let mut store = RemoteStore::new(&addr.to_string());

        assert!(store.list().await.unwrap().is_empty());

        let created = store.create(NewQuiz::new("Đề 1", questions())).await.unwrap();
        assert_eq!(created.count, 1);

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, created.id);

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched.questions, questions());

        store.delete(created.id).await.unwrap();
        store.delete(created.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.get(created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(collection.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_persists_without_blocking_the_runtime() {
        let path = std::env::temp_dir().join(format!("smart-quiz-{}.json", Uuid::new_v4()));
        let collection = Arc::new(Mutex::new(QuizCollection::open(&path).unwrap()));

        let response = apply(
            &collection,
            StoreRequest::Create {
                name: "Saved".into(),
                questions: questions(),
                count: 1,
            },
        )
        .await;
        assert!(matches!(response, StoreResponse::Document { .. }));

        let reopened = QuizCollection::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }
}
