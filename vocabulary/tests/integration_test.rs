//! Integration tests for vocabulary
//!
//! These tests verify end-to-end functionality including:
//! - Sync against a live HTTP server
//! - Store contents across syncs and delete-all
//! - Settings and view state persistence

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vocabulary::app::AppState;
use vocabulary::config::{AppConfig, DEFAULT_LAST_UPDATED};
use vocabulary::database::{create_pool, ForeignLanguage, Vocabulary, VocabularyRepository};
use vocabulary::services::{SearchType, Settings, SyncKind, ViewState, VocabularyList};

const PAYLOAD: &str = r#"{
    "recently_added_count": 3,
    "Hokkien": [
        {"english_word": "cat", "foreign_word": "niau"},
        {"english_word": "beat / hit / strike", "foreign_word": "phah"}
    ],
    "Japanese": [{"english_word": "cat", "foreign_word": "neko"}],
    "Mandarin": []
}"#;

const NOTHING_NEW: &str =
    r#"{"recently_added_count": 0, "Hokkien": [], "Japanese": [], "Mandarin": []}"#;

/// Answers `bodies.len()` requests in order, returning each request head
async fn serve(bodies: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();

        for (status_line, body) in bodies {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            requests.push(String::from_utf8_lossy(&request).to_string());
        }

        requests
    });

    (host, handle)
}

async fn create_test_state() -> (AppState, TempDir) {
    let temp = TempDir::new().unwrap();
    let state = AppState::initialize(AppConfig::with_data_dir(temp.path().to_path_buf()))
        .await
        .unwrap();

    (state, temp)
}

fn settings_for(host: &str) -> Settings {
    Settings {
        server_url: host.to_string(),
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_full_sync_workflow() {
    let (state, _temp) = create_test_state().await;
    let (host, server) = serve(vec![("200 OK", PAYLOAD), ("200 OK", NOTHING_NEW)]).await;
    let settings = settings_for(&host);

    // First sync fills an empty store
    let outcome = state.sync(&settings).await.unwrap();
    assert_eq!(outcome.kind, SyncKind::Applied { added: 3 });
    assert_eq!(outcome.message, "3 new vocabularies added.");
    assert_eq!(
        outcome.vocabularies,
        vec![
            Vocabulary::new("cat", "niau", ForeignLanguage::Hokkien),
            Vocabulary::new("beat / hit / strike", "phah", ForeignLanguage::Hokkien),
        ]
    );

    let counts = state.counts().await.unwrap();
    assert_eq!(counts[&ForeignLanguage::Hokkien], 2);
    assert_eq!(counts[&ForeignLanguage::Japanese], 1);
    assert_eq!(counts[&ForeignLanguage::Mandarin], 0);

    // Second sync finds nothing new and keeps the cache
    let outcome = state.sync(&settings).await.unwrap();
    assert_eq!(outcome.kind, SyncKind::NoNewVocabularies);
    assert_eq!(outcome.message, "No new vocabularies available.");
    assert_eq!(outcome.vocabularies.len(), 2);

    let requests = server.await.unwrap();
    assert!(requests[0].contains("last_updated=1950-01-01+00%3A00%3A00"));
    assert!(!requests[1].contains("last_updated=1950-01-01"));
    assert!(requests[1].starts_with("GET /Vocabulary/vocabularies?last_updated="));
}

#[tokio::test]
async fn test_server_error_keeps_cache() {
    let (state, _temp) = create_test_state().await;
    let (host, server) = serve(vec![("200 OK", PAYLOAD), ("500 Internal Server Error", "")]).await;
    let settings = settings_for(&host);

    state.sync(&settings).await.unwrap();
    let outcome = state.sync(&settings).await.unwrap();

    assert_eq!(outcome.kind, SyncKind::Rejected { status_code: 500 });
    assert_eq!(outcome.message, "500. Internal Server Error");
    assert_eq!(outcome.vocabularies.len(), 2);
    assert_eq!(state.repository().count_all().await.unwrap(), 3);
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_server() {
    let (state, _temp) = create_test_state().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    drop(listener);

    let outcome = state.sync(&settings_for(&host)).await.unwrap();

    assert_eq!(outcome.kind, SyncKind::Rejected { status_code: 500 });
    assert!(outcome.message.starts_with("500. "));
    assert!(outcome.vocabularies.is_empty());
}

#[tokio::test]
async fn test_background_sync_delivers_outcome() {
    let (state, _temp) = create_test_state().await;
    let (host, server) = serve(vec![("200 OK", PAYLOAD)]).await;

    let (handle, receiver) = state.start_sync(settings_for(&host)).unwrap();
    let outcome = receiver.await.unwrap();
    handle.join().await;

    assert_eq!(outcome.kind, SyncKind::Applied { added: 3 });
    assert!(!state.is_updating());
    server.await.unwrap();
}

#[tokio::test]
async fn test_delete_all_resets_last_updated() {
    let (state, _temp) = create_test_state().await;
    let (host, server) = serve(vec![("200 OK", PAYLOAD)]).await;

    state.sync(&settings_for(&host)).await.unwrap();
    assert_ne!(state.about().await.unwrap().last_updated, DEFAULT_LAST_UPDATED);

    let deleted = state.delete_all().await.unwrap();

    assert_eq!(deleted, 3);
    let about = state.about().await.unwrap();
    assert!(about.counts.values().all(|count| *count == 0));
    assert_eq!(about.last_updated, DEFAULT_LAST_UPDATED);
    server.await.unwrap();
}

#[tokio::test]
async fn test_store_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let (host, server) = serve(vec![("200 OK", PAYLOAD)]).await;

    {
        let state = AppState::initialize(AppConfig::with_data_dir(temp.path().to_path_buf()))
            .await
            .unwrap();
        state.sync(&settings_for(&host)).await.unwrap();
        state.close().await;
    }

    let pool = create_pool(&temp.path().join("vocabulary.db")).await.unwrap();
    let repo = VocabularyRepository::new(pool);

    assert_eq!(
        repo.query_by_language(ForeignLanguage::Japanese).await.unwrap(),
        vec![Vocabulary::new("cat", "neko", ForeignLanguage::Japanese)]
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_view_state_and_search_after_sync() {
    let (state, temp) = create_test_state().await;
    let (host, server) = serve(vec![("200 OK", PAYLOAD)]).await;
    let settings = settings_for(&host);

    let outcome = state.sync(&settings).await.unwrap();
    let mut list = VocabularyList::default();
    list.update(Some(outcome.vocabularies));
    list.filter("hi", SearchType::English);
    assert_eq!(list.items().len(), 1);

    let view_state = ViewState {
        settings,
        current_list: list.all().to_vec(),
    };
    state.save_view_state(&view_state).await.unwrap();
    assert!(temp.path().join("view_state.json").exists());

    let restored = state.restore_view_state().await.unwrap();
    assert_eq!(restored, view_state);
    server.await.unwrap();
}
