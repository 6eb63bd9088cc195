use std::sync::LazyLock;
use std::time::Duration;

use random_mailer::{
    configuration::get_configuration,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use wiremock::{
    Mock, MockServer, Request, ResponseTemplate,
    matchers::{method, path},
};

// Ensure that the `tracing` stack is only initialised once
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub record_provider: MockServer,
    pub email_server: MockServer,
}

impl TestApp {
    pub async fn get_send_random_emails(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/send-random-emails", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Makes the record provider answer with `n` well-formed users.
    pub async fn provider_returns_users(&self, n: usize) {
        Mock::given(path("/users"))
            .and(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users(n)))
            .mount(&self.record_provider)
            .await;
    }

    /// Waits until the email server has seen at least `n` requests and returns
    /// them. Delivery happens in the background, so the trigger response alone
    /// tells us nothing about it.
    pub async fn wait_for_emails(&self, n: usize) -> Vec<Request> {
        for _ in 0..50 {
            let received = self.email_server.received_requests().await.unwrap();
            if received.len() >= n {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("the email server did not receive {n} requests in time");
    }
}

pub fn users(n: usize) -> serde_json::Value {
    (1..=n)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "name": format!("User {i}"),
                "username": format!("user{i}"),
                "email": format!("user{i}@example.com"),
            })
        })
        .collect()
}

pub async fn spawn_app() -> TestApp {
    LazyLock::force(&TRACING);

    // Stand-ins for the user directory and for the email API
    let record_provider = MockServer::start().await;
    let email_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.port = 0;
        c.application.debug = true;
        c.record_provider.base_url = format!("{}/users", record_provider.uri());
        c.record_provider.timeout_milliseconds = 500;
        c.email_client.base_url = email_server.uri();
        c
    };

    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let address = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        record_provider,
        email_server,
    }
}
