//! Integration tests for the persona catalog routes.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_personas_list_in_catalog_order() {
    let app = common::build_test_app(common::Harness::default());

    let (status, json) = common::get_json_anonymous(app, "/api/v1/personas").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["shiggy", "kathleen", "catherine", "theresa"]);
}

#[tokio::test]
async fn test_persona_by_id_includes_voice_and_specialties() {
    let app = common::build_test_app(common::Harness::default());

    let (status, json) = common::get_json_anonymous(app, "/api/v1/personas/shiggy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "The Psychic Matriarch");
    assert!(json["voice"]["ritual_style"].as_str().is_some());
    assert!(!json["specialties"].as_array().unwrap().is_empty());
    assert!(!json["sample_prompts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_persona_returns_404() {
    let app = common::build_test_app(common::Harness::default());

    let (status, json) = common::get_json_anonymous(app, "/api/v1/personas/morgana").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "persona_not_found");
}
