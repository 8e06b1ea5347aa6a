//! Viewer request handling: initial log, search and malformed frames

mod common;

use common::TestBoard;
use rollcall_server::{ClientMessage, ServerMessage, viewer};

async fn seeded_board() -> TestBoard {
    let board = TestBoard::new().await;
    for (badge, activity) in [("A1", "gate1"), ("B2", "gate1"), ("A1", "workshop")] {
        board.check_in(badge, activity).await;
    }
    board
}

fn search_frame(query: &str) -> String {
    serde_json::json!({ "event": "search_log", "data": { "query": query } }).to_string()
}

#[tokio::test]
async fn test_initial_log_request_returns_full_log() {
    let board = seeded_board().await;

    let reply = viewer::answer(
        &board.state,
        ClientMessage::parse(r#"{"event":"request_initial_log"}"#),
    )
    .await;

    match reply {
        Some(ServerMessage::UpdateLog(snapshot)) => {
            assert_eq!(snapshot.total_users(), 3);
            assert_eq!(snapshot.log()[0].activity, "workshop");
        }
        other => panic!("expected update_log, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_matches_name_or_badge() {
    let board = seeded_board().await;

    let by_name = viewer::answer(&board.state, ClientMessage::parse(&search_frame("ALI"))).await;
    match by_name {
        Some(ServerMessage::SearchResults(results)) => {
            assert_eq!(results.total_users(), 2);
            assert!(results.log().iter().all(|e| e.display_name == "Alice"));
        }
        other => panic!("expected search_results, got {other:?}"),
    }

    let by_badge = viewer::answer(&board.state, ClientMessage::parse(&search_frame("b2"))).await;
    match by_badge {
        Some(ServerMessage::SearchResults(results)) => {
            assert_eq!(results.total_users(), 1);
            assert_eq!(results.log()[0].display_name, "Bob");
        }
        other => panic!("expected search_results, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_search_returns_everything() {
    let board = seeded_board().await;

    let reply = viewer::answer(&board.state, ClientMessage::parse(&search_frame(""))).await;
    match reply {
        Some(ServerMessage::SearchResults(results)) => assert_eq!(results.total_users(), 3),
        other => panic!("expected search_results, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_does_not_touch_the_log_or_other_viewers() {
    let board = seeded_board().await;
    let mut other_viewer = board.viewer();
    let before = board.state.store.snapshot().await;

    viewer::answer(&board.state, ClientMessage::parse(&search_frame("carol"))).await;

    assert_eq!(board.state.store.snapshot().await, before);
    assert!(common::drain(&mut other_viewer).is_empty());
}

#[tokio::test]
async fn test_malformed_search_gets_empty_results() {
    let board = seeded_board().await;

    let reply = viewer::answer(
        &board.state,
        ClientMessage::parse(r#"{"event":"search_log","data":{"query":42}}"#),
    )
    .await;

    match reply {
        Some(ServerMessage::SearchResults(results)) => {
            assert_eq!(results.total_users(), 0);
            assert!(results.log().is_empty());
        }
        other => panic!("expected empty search_results, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_and_garbled_frames_are_ignored() {
    let board = seeded_board().await;

    let unknown = viewer::answer(&board.state, ClientMessage::parse(r#"{"event":"shout"}"#)).await;
    assert!(unknown.is_none());

    let garbled = viewer::answer(&board.state, ClientMessage::parse("not a frame")).await;
    assert!(garbled.is_none());
}

#[tokio::test]
async fn test_update_log_wire_shape() {
    let board = seeded_board().await;
    let json = viewer::current_log(&board.state).await.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["event"], "update_log");
    assert_eq!(value["data"]["total_users"], 3);
    let first = &value["data"]["log"][0];
    assert_eq!(first["badge_id"], "A1");
    assert_eq!(first["display_name"], "Alice");
    assert_eq!(first["activity"], "workshop");
    assert_eq!(first["timestamp"], "09:30");
}
