use reqwest::{Client, RequestBuilder};

/// A reqwest client rooted at the API base URL, optionally sending a bearer token.
#[derive(Clone, Debug)]
pub struct TestClient {
    pub base: String,
    pub client: Client,
    pub token: Option<String>,
}

impl TestClient {
    pub fn clone_with_token(&self, token: String) -> TestClient {
        TestClient {
            base: self.base.clone(),
            client: self.client.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.post(self.url(path)))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.put(self.url(path)))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.delete(self.url(path)))
    }
}
