// tests/api_tests.rs

use std::sync::Arc;

use flashcards_backend::{
    analytics::TimeZoneChoice, config::Config, routes, state::AppState, store::JsonFileStore,
};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. Fresh results file per test
    let results_db_path = std::env::temp_dir()
        .join(format!("flashcards-api-{}", uuid::Uuid::new_v4()))
        .join("resultsdb.json");
    let store = JsonFileStore::open(&results_db_path)
        .await
        .expect("Failed to open results store");

    // 2. Create test configuration and state
    let config = Config {
        results_db_path,
        host: "127.0.0.1".to_string(),
        port: 0,
        rust_log: "error".to_string(),
        analytics_timezone: TimeZoneChoice::Utc,
        cors_origins: vec!["http://localhost:4200".to_string()],
    };

    let state = AppState {
        store: Arc::new(store),
        config,
    };

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn sample_result(username: &str, title: &str, taken_at: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "testTitle": title,
        "takenAt": taken_at,
        "answers": [
            { "question": { "text": "2 + 2", "answer": "4" }, "correct": true },
            { "question": { "text": "3 * 3", "answer": "9" }, "correct": false }
        ]
    })
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn save_result_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/results/save", address))
        .json(&sample_result("alice", "Math", "2024-01-15T10:00:00Z"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Result saved successfully");
    assert_eq!(body["result"]["testTitle"], "Math");
    assert_eq!(body["result"]["answers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn save_result_rejects_missing_fields() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: no takenAt
    let response = client
        .post(&format!("{}/api/results/save", address))
        .json(&serde_json::json!({
            "username": "alice",
            "testTitle": "Math",
            "answers": []
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid result data");
}

#[tokio::test]
async fn save_result_fails_validation() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: username longer than 50 chars
    let response = client
        .post(&format!("{}/api/results/save", address))
        .json(&sample_result(&"x".repeat(51), "Math", "2024-01-15"))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn get_by_user_requires_username() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/results/getByUser", address))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Username required");
}

#[tokio::test]
async fn test_save_and_list_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // 1. Save results for two users
    for (user, title) in [("alice", "Math"), ("bob", "Science"), ("alice", "History")] {
        let response = client
            .post(&format!("{}/api/results/save", address))
            .json(&sample_result(user, title, "2024-03-01T09:00:00Z"))
            .send()
            .await
            .expect("Save failed");
        assert_eq!(response.status().as_u16(), 201);
    }

    // 2. List alice's results
    let results: Vec<serde_json::Value> = client
        .post(&format!("{}/api/results/getByUser", address))
        .json(&serde_json::json!({ "username": "alice" }))
        .send()
        .await
        .expect("List failed")
        .json()
        .await
        .expect("Failed to parse results json");

    // Assert: only alice's, in insertion order
    let titles: Vec<&str> = results
        .iter()
        .map(|r| r["testTitle"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Math", "History"]);

    // 3. Unknown user gets an empty list
    let results: Vec<serde_json::Value> = client
        .post(&format!("{}/api/results/getByUser", address))
        .json(&serde_json::json!({ "username": "carol" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(results.is_empty());
}
