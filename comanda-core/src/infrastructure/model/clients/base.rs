//! HTTP plumbing shared by the provider clients

use crate::infrastructure::model::types::ModelError;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    None,
    Bearer,
}

/// One chat endpoint: provider id, resolved URL and optional API key.
#[derive(Clone)]
pub struct HttpClientBase {
    pub id: String,
    pub url: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpClientBase {
    pub fn new(id: String, endpoint: &str, api_path: &str, api_key: Option<String>) -> Self {
        Self {
            id,
            url: join_url(endpoint, api_path),
            api_key,
            http: Client::new(),
        }
    }

    /// POST `body` as JSON and decode the JSON reply.
    ///
    /// Transport and HTTP status failures are network errors; a body that does
    /// not decode is an invalid response.
    pub async fn post_json<Req, Res>(&self, body: &Req, auth: Auth) -> Result<Res, ModelError>
    where
        Req: Serialize,
        Res: DeserializeOwned,
    {
        let mut request = self.http.post(&self.url).json(body);
        if auth == Auth::Bearer {
            request = request.bearer_auth(self.require_api_key()?);
        }

        let text = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| ModelError::http(&self.id, err))?
            .text()
            .await
            .map_err(|err| ModelError::http(&self.id, err))?;
        debug!(provider = %self.id, bytes = text.len(), "Provider replied");

        serde_json::from_str(&text)
            .map_err(|err| ModelError::malformed(&self.id, err.to_string()))
    }

    fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ModelError::credentials(&self.id))
    }
}

fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
