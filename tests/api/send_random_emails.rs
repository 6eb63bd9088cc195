use std::collections::HashSet;
use std::time::Duration;

use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{spawn_app, users};

fn email_body(request: &wiremock::Request) -> serde_json::Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn twelve_users_are_narrowed_down_to_five_emails() {
    // Arrange
    let app = spawn_app().await;
    app.provider_returns_users(12).await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(5)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "success": true,
            "message": "Emails queued successfully for 5 random users!"
        })
    );

    let requests = app.wait_for_emails(5).await;
    let mut recipients = HashSet::new();
    for request in &requests {
        let email = email_body(request);
        assert_eq!(email["Subject"], "Welcome to Our Service");

        let to = email["To"].as_str().unwrap().to_string();
        // `userN@example.com` was sent to `User N`
        let n = to
            .trim_start_matches("user")
            .trim_end_matches("@example.com");
        assert!(
            email["HtmlBody"]
                .as_str()
                .unwrap()
                .contains(&format!("User {n}"))
        );
        recipients.insert(to);
    }
    assert_eq!(recipients.len(), 5);
}

#[tokio::test]
async fn fewer_than_five_users_are_all_emailed() {
    // Arrange
    let app = spawn_app().await;
    app.provider_returns_users(3).await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Emails queued successfully for 3 random users!");

    let recipients: HashSet<_> = app
        .wait_for_emails(3)
        .await
        .iter()
        .map(|r| email_body(r)["To"].as_str().unwrap().to_string())
        .collect();
    let expected: HashSet<_> = (1..=3).map(|i| format!("user{i}@example.com")).collect();
    assert_eq!(recipients, expected);
}

#[tokio::test]
async fn an_empty_provider_response_returns_404_and_sends_nothing() {
    // Arrange
    let app = spawn_app().await;
    app.provider_returns_users(0).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "message": "No users found in API response"
        })
    );
    // Give a wrongly queued job the chance to show up before the mock verifies
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn a_null_provider_body_returns_404_and_sends_nothing() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
        .expect(1)
        .mount(&app.record_provider)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No users found in API response");
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn a_failing_provider_returns_500_and_sends_nothing() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/users"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.record_provider)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "success": false,
            "message": "Failed to fetch users from API"
        })
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
}

#[tokio::test]
async fn a_provider_timeout_returns_500_and_sends_nothing() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(users(12))
                .set_delay(Duration::from_secs(180)),
        )
        .mount(&app.record_provider)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Failed to fetch users from API");
}

#[tokio::test]
async fn a_malformed_provider_response_is_an_unexpected_error() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"users\": oops"))
        .mount(&app.record_provider)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "An error occurred while processing the request");
    // The test configuration runs with `debug` on
    assert!(body["error"].as_str().unwrap().contains("malformed"));
}

#[tokio::test]
async fn one_undeliverable_recipient_does_not_block_the_others() {
    // Arrange
    let app = spawn_app().await;
    app.provider_returns_users(3).await;

    Mock::given(path("/email"))
        .and(body_partial_json(
            serde_json::json!({ "To": "user2@example.com" }),
        ))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.get_send_random_emails().await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let requests = app.wait_for_emails(3).await;
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn triggering_twice_queues_two_independent_jobs() {
    // Arrange
    let app = spawn_app().await;
    app.provider_returns_users(2).await;

    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&app.email_server)
        .await;

    // Act
    let first = app.get_send_random_emails().await;
    let second = app.get_send_random_emails().await;

    // Assert
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
    let requests = app.wait_for_emails(4).await;
    let to: Vec<_> = requests
        .iter()
        .map(|r| email_body(r)["To"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(to.iter().filter(|t| *t == "user1@example.com").count(), 2);
    assert_eq!(to.iter().filter(|t| *t == "user2@example.com").count(), 2);
}
