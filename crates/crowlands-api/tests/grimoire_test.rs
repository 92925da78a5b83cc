//! Integration tests for the grimoire routes.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

fn spell_body() -> serde_json::Value {
    serde_json::json!({
        "artifact": {
            "kind": "ritual",
            "title": "A Charm of Quiet Courage",
            "materials": ["a white candle"],
            "steps": [{"instruction": "Light the candle at dusk."}],
            "invocation": "I call the quiet hour.",
            "incantation": "Small acts, gathered, become courage.",
            "closing": "The candle rests; the work is done."
        },
        "persona": {
            "id": "shiggy",
            "name": "Sheila \"Shiggy\" Tayler",
            "title": "The Psychic Matriarch"
        }
    })
}

#[tokio::test]
async fn test_saved_spell_appears_in_the_owners_grimoire() {
    // Arrange
    let app = common::build_test_app(common::Harness::default());
    let user = Uuid::new_v4();

    // Act
    let (status, json) =
        common::post_json(app.clone(), "/api/v1/grimoire", user, &spell_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    let spell_id = json["spell_id"].as_str().unwrap().to_owned();

    let (status, json) = common::get_json(app, "/api/v1/grimoire", user).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let spells = json["spells"].as_array().unwrap();
    assert_eq!(spells.len(), 1);
    assert_eq!(spells[0]["id"], spell_id);
    assert_eq!(spells[0]["artifact"]["kind"], "ritual");
    assert_eq!(spells[0]["persona"]["id"], "shiggy");
    assert_eq!(spells[0]["saved_at"], "2026-01-15T10:00:00Z");
}

#[tokio::test]
async fn test_grimoires_are_isolated_per_user() {
    // Arrange
    let app = common::build_test_app(common::Harness::default());
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    common::post_json(app.clone(), "/api/v1/grimoire", owner, &spell_body()).await;

    // Act
    let (_, json) = common::get_json(app, "/api/v1/grimoire", stranger).await;

    // Assert
    assert!(json["spells"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_a_spell_removes_it_once() {
    // Arrange
    let app = common::build_test_app(common::Harness::default());
    let user = Uuid::new_v4();
    let (_, json) = common::post_json(app.clone(), "/api/v1/grimoire", user, &spell_body()).await;
    let spell_id = json["spell_id"].as_str().unwrap().to_owned();
    let uri = format!("/api/v1/grimoire/{spell_id}");

    // Act
    let first = common::delete_request(app.clone(), &uri, user).await;
    let second = common::delete_request(app.clone(), &uri, user).await;

    // Assert
    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NOT_FOUND);
    let (_, json) = common::get_json(app, "/api/v1/grimoire", user).await;
    assert!(json["spells"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_only_the_owner_can_delete_a_spell() {
    // Arrange
    let app = common::build_test_app(common::Harness::default());
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let (_, json) = common::post_json(app.clone(), "/api/v1/grimoire", owner, &spell_body()).await;
    let spell_id = json["spell_id"].as_str().unwrap().to_owned();
    let uri = format!("/api/v1/grimoire/{spell_id}");

    // Act
    let as_stranger = common::delete_request(app.clone(), &uri, stranger).await;

    // Assert — not revealed, and still present for the owner.
    assert_eq!(as_stranger, StatusCode::NOT_FOUND);
    let (_, json) = common::get_json(app, "/api/v1/grimoire", owner).await;
    assert_eq!(json["spells"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unparsed_artifacts_can_be_saved_too() {
    // Arrange
    let app = common::build_test_app(common::Harness::default());
    let user = Uuid::new_v4();
    let body = serde_json::json!({
        "artifact": { "kind": "unparsed", "raw_text": "light a candle and breathe" }
    });

    // Act
    let (status, _) = common::post_json(app.clone(), "/api/v1/grimoire", user, &body).await;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    let (_, json) = common::get_json(app, "/api/v1/grimoire", user).await;
    let spells = json["spells"].as_array().unwrap();
    assert_eq!(spells[0]["artifact"]["kind"], "unparsed");
    assert!(spells[0].get("persona").is_none());
}

#[tokio::test]
async fn test_grimoire_requires_a_user_identity() {
    let app = common::build_test_app(common::Harness::default());

    let (status, json) =
        common::post_json_anonymous(app, "/api/v1/grimoire", &spell_body()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthenticated");
}
