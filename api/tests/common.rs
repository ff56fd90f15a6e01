use eyre::{eyre, Result};
use futures::Future;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use temp_dir::TempDir;

pub use crate::client::*;

use project_board_api::Server;

pub const PASSWORD: &str = "Sunrise2024";

#[derive(Debug)]
pub struct TestUser {
    pub user_id: String,
    pub email: String,
    pub client: TestClient,
}

pub struct TestApp {
    /// A client set to the base url of the API, with no session.
    pub client: TestClient,
    /// The server root, for fetching stored files.
    pub address: String,
    pub base_url: String,
    _files: TempDir,
}

async fn start_app() -> Result<TestApp> {
    let files = TempDir::new()?;

    let config = project_board_api::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Bind to random port
        env: "test".to_string(),
        database_url: None,
        storage_provider: "local".to_string(),
        storage_location: Some(files.path().to_string_lossy().to_string()),
        s3_endpoint: None,
        s3_region: None,
        s3_access_key_id: None,
        s3_secret_key: None,
        s3_virtual_host_style: None,
        public_url_base: "/files".to_string(),
        store_timeout_ms: 10_000,
        session_days: 1,
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
    };
    Lazy::force(&project_board_test::TRACING);
    let Server { server, host, port } = project_board_api::create_server(config).await?;

    tokio::task::spawn(server);

    let address = format!("http://{}:{}", host, port);
    let base_url = format!("{address}/api");
    let client = TestClient {
        base: base_url.clone(),
        client: reqwest::ClientBuilder::new()
            .timeout(std::time::Duration::from_secs(30))
            .build()?,
        token: None,
    };

    Ok(TestApp {
        client,
        address,
        base_url,
        _files: files,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<()>>,
{
    let app = start_app().await.expect("Starting app");
    f(app).await.unwrap();
}

impl TestApp {
    /// Sign up a user with the given role and return a client signed in as them.
    pub async fn add_user(&self, email: &str, role: &str) -> Result<TestUser> {
        let response = self
            .client
            .post("auth/sign_up")
            .json(&json!({ "email": email, "password": PASSWORD, "role": role }))
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::CREATED {
            return Err(eyre!(
                "sign up failed with {}: {}",
                response.status(),
                response.text().await?
            ));
        }

        let signed_in: Value = self
            .client
            .post("auth/sign_in")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = signed_in["token"]
            .as_str()
            .ok_or_else(|| eyre!("no token in {signed_in}"))?;
        let user_id = signed_in["user"]["id"]
            .as_str()
            .ok_or_else(|| eyre!("no user id in {signed_in}"))?;

        Ok(TestUser {
            user_id: user_id.to_string(),
            email: email.to_string(),
            client: self.client.clone_with_token(token.to_string()),
        })
    }
}

impl TestUser {
    pub async fn create_project(&self, title: &str) -> Result<String> {
        let body: Value = self
            .client
            .post("projects")
            .json(&json!({ "title": title, "description": "Test project" }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        body["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| eyre!("no project id in {body}"))
    }

    pub async fn project_titles(&self) -> Result<Vec<String>> {
        let projects: Vec<Value> = self
            .client
            .get("projects")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut titles = projects
            .iter()
            .filter_map(|p| p["title"].as_str().map(String::from))
            .collect::<Vec<_>>();
        titles.sort();
        Ok(titles)
    }
}
