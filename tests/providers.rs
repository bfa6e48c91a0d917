use std::time::Duration;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use medassist::domains::medical::{Coordinates, Lookup};
use medassist::error::MedAssistError;
use medassist::interfaces::services::{
    ChatCompletionService, HospitalLocatorService, MedicineInfoService,
};
use medassist::providers::fda::FdaMedicineService;
use medassist::providers::openai::OpenAiChatService;
use medassist::providers::overpass::{directions_url, OverpassHospitalLocator};

fn fda(server: &MockServer) -> FdaMedicineService {
    FdaMedicineService::new(Some(server.base_url()), Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn fda_label_fields_take_the_first_paragraph() {
    let server = MockServer::start_async().await;
    let label_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drug/label.json")
                .query_param("search", "aspirin");
            then.status(200).json_body(json!({
                "results": [{
                    "description": ["Aspirin 325 mg tablets", "ignored"],
                    "purpose": ["Pain reliever/fever reducer"],
                    "dosage_and_administration": ["Take 1 tablet every 4 hours"]
                }]
            }));
        })
        .await;

    let info = fda(&server).lookup(" aspirin ").await.unwrap().found().unwrap();
    assert_eq!(info.medicine_name, "aspirin");
    assert_eq!(info.description, "Aspirin 325 mg tablets");
    assert_eq!(info.purpose, "Pain reliever/fever reducer");
    assert_eq!(info.dosage, "Take 1 tablet every 4 hours");
    assert_eq!(info.precautions, "No precautions available.");
    label_mock.assert_calls(1);
}

#[tokio::test]
async fn fda_not_found_and_empty_results_read_the_same() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drug/label.json")
                .query_param("search", "unobtainium");
            then.status(404).json_body(json!({"error": {"code": "NOT_FOUND"}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/drug/label.json")
                .query_param("search", "placebo");
            then.status(200).json_body(json!({"results": []}));
        })
        .await;

    let service = fda(&server);
    assert_eq!(
        service.lookup("unobtainium").await.unwrap(),
        Lookup::NotFound("No information found for medicine: unobtainium".to_string())
    );
    assert_eq!(
        service.lookup("placebo").await.unwrap(),
        Lookup::NotFound("No information found for medicine: placebo".to_string())
    );
}

#[tokio::test]
async fn fda_server_error_is_an_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/drug/label.json");
            then.status(500).body("boom");
        })
        .await;

    let err = fda(&server).lookup("aspirin").await.unwrap_err();
    assert!(matches!(err, MedAssistError::Http(_)));
}

#[tokio::test]
async fn overpass_elements_become_hospitals_with_directions() {
    let server = MockServer::start_async().await;
    let overpass_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/interpreter");
            then.status(200).json_body(json!({
                "elements": [
                    {"type": "node", "lat": 28.56, "lon": 77.21, "tags": {"name": "AIIMS"}},
                    {"type": "way", "center": {"lat": 28.57, "lon": 77.2}, "tags": {}},
                    {"type": "relation", "tags": {"name": "Nowhere"}}
                ]
            }));
        })
        .await;

    let locator = OverpassHospitalLocator::new(
        Some(server.url("/api/interpreter")),
        None,
        Some(Duration::from_secs(5)),
    )
    .unwrap();
    let hospitals = locator
        .lookup(Coordinates::new(28.61, 77.21))
        .await
        .unwrap();

    assert_eq!(hospitals.len(), 2);
    assert_eq!(hospitals[0].name, "AIIMS");
    assert_eq!(hospitals[0].maps_url, directions_url(28.56, 77.21));
    assert_eq!(hospitals[1].name, "Unnamed Hospital");
    overpass_mock.assert_calls(1);
}

#[tokio::test]
async fn overpass_failure_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/interpreter");
            then.status(504).body("gateway timeout");
        })
        .await;

    let locator =
        OverpassHospitalLocator::new(Some(server.url("/api/interpreter")), None, None).unwrap();
    assert!(locator
        .lookup(Coordinates::new(28.61, 77.21))
        .await
        .is_err());
}

#[tokio::test]
async fn chat_completion_returns_the_first_choice() {
    let server = MockServer::start_async().await;
    let chat_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer key");
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 0,
                "model": "gpt-4.1-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "  Rest and hydrate.  "},
                    "finish_reason": "stop"
                }]
            }));
        })
        .await;

    let service = OpenAiChatService::new("key".to_string(), None, Some(server.base_url()));
    assert_eq!(
        service.ask("I have a cold").await.unwrap(),
        "Rest and hydrate."
    );
    chat_mock.assert_calls(1);
}

#[tokio::test]
async fn chat_completion_retries_server_errors() {
    let server = MockServer::start_async().await;
    let chat_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("overloaded");
        })
        .await;

    let service = OpenAiChatService::new("key".to_string(), None, Some(server.base_url()));
    let err = service.ask("hello").await.unwrap_err();
    assert!(matches!(err, MedAssistError::Http(_)));
    chat_mock.assert_calls(3);
}

#[tokio::test]
async fn chat_completion_without_text_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        })
        .await;

    let service = OpenAiChatService::new("key".to_string(), None, Some(server.base_url()));
    let err = service.ask("hello").await.unwrap_err();
    assert!(matches!(err, MedAssistError::Serialization(_)));
}
