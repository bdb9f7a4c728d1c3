//! Integration tests for the quiz service.
//!
//! These tests run the service against a real SQLite database on disk and a
//! mock HTTP item generator.

use std::io::Write;

use quizmatch_core::items::{Difficulty, GeneratorConfig, HttpItemGenerator, InMemoryItemBank};
use quizmatch_core::service::item_key;
use quizmatch_core::{
    Database, ItemSource, KvStore, MatchType, MatcherConfig, McqItem, QuizService, ServiceError,
    SqliteKvStore, TopicMatcher,
};
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Service = QuizService<InMemoryItemBank, HttpItemGenerator, SqliteKvStore>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn mcq(id: &str, topic: &str, difficulty: &str) -> serde_json::Value {
    json!({
        "id": id,
        "topic": topic,
        "difficulty": difficulty,
        "stem": format!("Question {id}?"),
        "choices": ["A", "B", "C"],
        "answer_index": 2,
        "explanation": "C is right."
    })
}

fn bank_file() -> NamedTempFile {
    let items = json!([
        mcq("closures-1", "js-closures", "easy"),
        mcq("closures-2", "js-closures", "hard"),
        mcq("hooks-1", "react-hooks", "medium"),
        mcq("prob-1", "math-probability", "easy"),
    ]);
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "{items}").expect("Failed to write bank");
    file
}

/// Helper to build a service over an on-disk database and a mock generator.
async fn setup_service(server: &MockServer) -> (Service, TempDir) {
    init_tracing();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Database::new(&temp_dir.path().join("quiz.db"))
        .await
        .expect("Failed to create database");

    let bank = InMemoryItemBank::from_file(bank_file().path()).expect("Failed to load bank");
    let generator = HttpItemGenerator::new(GeneratorConfig::new(format!("{}/generate", server.uri())))
        .expect("Failed to build generator");

    let service = QuizService::new(
        TopicMatcher::new(MatcherConfig::default()),
        bank,
        generator,
        SqliteKvStore::new(db),
    );
    (service, temp_dir)
}

// ==================== Routing ====================

#[tokio::test]
async fn test_confident_match_serves_bank_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let (service, _temp_dir) = setup_service(&server).await;

    let response = service
        .next_question("JavaScript Closures", Difficulty::Hard)
        .await
        .expect("Failed to get question");

    assert_eq!(response.source, ItemSource::Bank);
    assert_eq!(response.item.id, "closures-2");
    assert_eq!(response.report.match_type, MatchType::Fuzzy);
    assert!(response.report.has_items);
    assert!(response.report.will_use_item_bank);
}

#[tokio::test]
async fn test_low_confidence_match_generates_for_matched_topic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({ "topic": "math-probability" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mcq(
            "gen-prob",
            "math-probability",
            "medium",
        )))
        .expect(1)
        .mount(&server)
        .await;
    let (service, _temp_dir) = setup_service(&server).await;

    let response = service
        .next_question("probability and dice games", Difficulty::Medium)
        .await
        .expect("Failed to get question");

    assert_eq!(response.source, ItemSource::Generated);
    assert_eq!(response.report.matched_topic.as_deref(), Some("math-probability"));
    assert!(response.report.has_items);
    assert!(!response.report.will_use_item_bank);
}

#[tokio::test]
async fn test_unmatched_objective_generates_from_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_partial_json(json!({
            "topic": "xyzzy nonsense quantum",
            "difficulty": "easy"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mcq(
            "gen-1",
            "xyzzy nonsense quantum",
            "easy",
        )))
        .expect(1)
        .mount(&server)
        .await;
    let (service, _temp_dir) = setup_service(&server).await;

    let response = service
        .next_question("xyzzy nonsense quantum", Difficulty::Easy)
        .await
        .expect("Failed to get question");

    assert_eq!(response.source, ItemSource::Generated);
    assert_eq!(response.report.match_type, MatchType::None);
    assert!(response.report.matched_topic.is_none());
    assert!(!response.report.has_items);

    let stored = service
        .tracker()
        .store()
        .read(&item_key("gen-1"))
        .await
        .expect("Failed to read store")
        .expect("Generated item was not stored");
    let stored: McqItem = serde_json::from_value(stored).expect("Stored item is not an item");
    assert_eq!(stored, response.item);
}

#[tokio::test]
async fn test_generator_outage_surfaces_as_item_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let (service, _temp_dir) = setup_service(&server).await;

    let err = service
        .next_question("xyzzy", Difficulty::Easy)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Item(_)));
    assert!(err.to_string().contains("xyzzy"));
}

// ==================== Grading ====================

#[tokio::test]
async fn test_log_response_tracks_mastery_across_items() {
    let server = MockServer::start().await;
    let (service, _temp_dir) = setup_service(&server).await;

    let first = service
        .log_response("ada", "closures-1", 2)
        .await
        .expect("Failed to log response");
    assert!(first.correct);
    assert_eq!(first.explanation.as_deref(), Some("C is right."));

    let second = service
        .log_response("ada", "closures-2", 0)
        .await
        .expect("Failed to log response");
    assert!(!second.correct);
    assert_eq!(second.answer_index, 2);
    assert_eq!(second.mastery.attempts, 2);
    assert_eq!(second.mastery.correct, 1);

    let other_learner = service
        .tracker()
        .mastery("grace", "js-closures")
        .await
        .expect("Failed to read mastery");
    assert_eq!(other_learner.attempts, 0);
}

#[tokio::test]
async fn test_log_response_grades_generated_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mcq("gen-7", "css-grid", "easy")))
        .mount(&server)
        .await;
    let (service, _temp_dir) = setup_service(&server).await;

    service
        .next_question("css grid areas", Difficulty::Easy)
        .await
        .expect("Failed to get question");

    let graded = service
        .log_response("ada", "gen-7", 2)
        .await
        .expect("Failed to log response");
    assert!(graded.correct);
    assert_eq!(graded.mastery.topic, "css-grid");

    let last = service
        .tracker()
        .last_response("ada", "gen-7")
        .await
        .expect("Failed to read response")
        .expect("Response was not stored");
    assert_eq!(last.chosen_index, 2);
}

#[tokio::test]
async fn test_log_response_rejects_unknown_item_and_bad_choice() {
    let server = MockServer::start().await;
    let (service, _temp_dir) = setup_service(&server).await;

    let unknown = service.log_response("ada", "nope", 0).await.unwrap_err();
    assert!(matches!(unknown, ServiceError::UnknownItem(_)));

    let bad_choice = service.log_response("ada", "hooks-1", 3).await.unwrap_err();
    assert!(matches!(
        bad_choice,
        ServiceError::InvalidChoice {
            index: 3,
            choices: 3,
            ..
        }
    ));

    let mastery = service
        .tracker()
        .mastery("ada", "react-hooks")
        .await
        .expect("Failed to read mastery");
    assert_eq!(mastery.attempts, 0);
}

#[tokio::test]
async fn test_mastery_survives_reopening_database() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("quiz.db");

    {
        let store = SqliteKvStore::new(Database::new(&db_path).await.unwrap());
        store
            .upsert("mastery:ada:react-hooks", &json!({
                "learner_id": "ada",
                "topic": "react-hooks",
                "attempts": 4,
                "correct": 3,
                "mastery": 0.75
            }))
            .await
            .unwrap();
    }

    let bank = InMemoryItemBank::from_file(bank_file().path()).unwrap();
    let generator =
        HttpItemGenerator::new(GeneratorConfig::new(format!("{}/generate", server.uri()))).unwrap();
    let service = QuizService::new(
        TopicMatcher::default(),
        bank,
        generator,
        SqliteKvStore::new(Database::new(&db_path).await.unwrap()),
    );

    let graded = service.log_response("ada", "hooks-1", 2).await.unwrap();
    assert_eq!(graded.mastery.attempts, 5);
    assert_eq!(graded.mastery.correct, 4);
    assert!((graded.mastery.mastery - 0.8).abs() < 1e-9);
}
