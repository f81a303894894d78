//! Integration tests for `OutletApi` against a local `wiremock` backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outlet_map::api::{ChatQuery, OutletApi};
use outlet_map::chat::{ChatSession, Completion, FALLBACK_ANSWER};
use outlet_map::error::ApiError;
use outlet_map::geo::GeoPoint;
use outlet_map::selection::SelectionController;

fn test_client(server: &MockServer) -> OutletApi {
    OutletApi::new(&server.uri(), Duration::from_secs(5)).expect("failed to build test client")
}

// ---------------------------------------------------------------------------
// GET /outlets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_outlets_decodes_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outlets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outlets": [
                {
                    "id": 1,
                    "name": "Subway KLCC",
                    "address": "Suria KLCC, Kuala Lumpur",
                    "latitude": 3.1579,
                    "longitude": "101.7123",
                    "operating_hours": "Mon-Sun 8am-10pm",
                    "google_maps_link": "https://maps.example/klcc",
                    "waze_link": null
                },
                {
                    "id": 2,
                    "name": "Subway Bangsar",
                    "address": "Jalan Telawi",
                    "latitude": null,
                    "longitude": null,
                    "operating_hours": null
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outlets = test_client(&server)
        .fetch_outlets()
        .await
        .expect("listing should decode");

    assert_eq!(outlets.len(), 2);
    assert_eq!(outlets[0].position(), Some(GeoPoint::new(3.1579, 101.7123)));
    assert_eq!(
        outlets[0].google_maps_link.as_deref(),
        Some("https://maps.example/klcc")
    );
    assert!(outlets[1].position().is_none());
    assert_eq!(outlets[1].operating_hours, "");
}

#[tokio::test]
async fn fetch_outlets_without_array_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outlets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "outlets": "nope" })))
        .mount(&server)
        .await;

    let outlets = test_client(&server)
        .fetch_outlets()
        .await
        .expect("non-array outlets is an empty listing");
    assert!(outlets.is_empty());
}

#[tokio::test]
async fn fetch_outlets_skips_records_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outlets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "outlets": [
                { "name": "No id" },
                { "id": 5, "name": "Subway Cheras", "latitude": 3.09, "longitude": 101.74 }
            ]
        })))
        .mount(&server)
        .await;

    let outlets = test_client(&server)
        .fetch_outlets()
        .await
        .expect("good records survive");
    assert_eq!(outlets.len(), 1);
    assert_eq!(outlets[0].id, 5);
}

#[tokio::test]
async fn fetch_outlets_reports_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outlets"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .fetch_outlets()
        .await
        .expect_err("503 should fail");
    assert!(matches!(
        error,
        ApiError::UnexpectedStatus { status: 503, .. }
    ));
}

#[tokio::test]
async fn fetch_outlets_reports_invalid_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outlets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .fetch_outlets()
        .await
        .expect_err("HTML is not a listing");
    assert!(matches!(error, ApiError::Deserialize { .. }));
}

// ---------------------------------------------------------------------------
// POST /chatbot/query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_sends_coordinates_when_known() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot/query"))
        .and(body_json(json!({ "query": "closest outlet", "lat": 3.1, "lon": 101.6 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Subway KLCC is closest.",
            "related_ids": [1],
            "center": [3.1579, 101.7123]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .query_chatbot(&ChatQuery::new(
            "closest outlet",
            Some(GeoPoint::new(3.1, 101.6)),
        ))
        .await
        .expect("query should succeed");

    assert_eq!(response.answer, "Subway KLCC is closest.");
    assert_eq!(response.related_ids, vec![1]);
    assert_eq!(response.center, Some(GeoPoint::new(3.1579, 101.7123)));
}

#[tokio::test]
async fn query_omits_coordinates_when_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot/query"))
        .and(body_json(json!({ "query": "outlets in bangsar" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "No outlets found.",
            "related_ids": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server)
        .query_chatbot(&ChatQuery::new("outlets in bangsar", None))
        .await
        .expect("query should succeed");
    assert!(response.related_ids.is_empty());
}

// ---------------------------------------------------------------------------
// ChatSession::send end to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_send_forwards_ids_to_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Found 2 outlets.",
            "related_ids": [4, 7]
        })))
        .mount(&server)
        .await;

    let api = test_client(&server);
    let mut chat = ChatSession::new();
    let mut selection = SelectionController::new();

    let completion = chat.send("  outlets in pj ", &api, &mut selection).await;

    assert_eq!(completion, Some(Completion::Answered));
    assert_eq!(selection.selected().as_slice(), &[4, 7]);
    let contents = chat
        .messages()
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();
    assert_eq!(contents[1..], ["outlets in pj", "Found 2 outlets."]);
}

#[tokio::test]
async fn session_send_falls_back_on_missing_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "related_ids": [1] })))
        .mount(&server)
        .await;

    let api = test_client(&server);
    let mut chat = ChatSession::new();
    let mut selection = SelectionController::new();
    selection.apply_chat_result(&[9]);

    let completion = chat.send("anything", &api, &mut selection).await;

    assert_eq!(completion, Some(Completion::Failed));
    assert_eq!(
        chat.messages().last().map(|m| m.content.as_str()),
        Some(FALLBACK_ANSWER)
    );
    assert_eq!(selection.selected().as_slice(), &[9]);
}

#[tokio::test]
async fn session_send_ignores_blank_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot/query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = test_client(&server);
    let mut chat = ChatSession::new();
    let mut selection = SelectionController::new();

    assert_eq!(chat.send("   ", &api, &mut selection).await, None);
    assert_eq!(chat.messages().len(), 1);
}
