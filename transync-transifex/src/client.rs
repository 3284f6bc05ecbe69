//! Blocking HTTP client for the Transifex v2 API.
//!
//! Every request carries HTTP basic auth. Non-2xx answers become
//! [`ServiceError::Http`]; the only status given meaning is `404` from the
//! project lookup, which reads as "no such project".

use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::de::DeserializeOwned;

use transync_core::{slugify, RemoteResource, ResourceStats, ServiceError, TranslationService};

use crate::payload::{Content, NewResource, ResourceEntry, StatsPayload};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://www.transifex.com/api/2/";

const TIMEOUT: Duration = Duration::from_secs(60);

/// [`TranslationService`] backed by the Transifex REST API.
#[derive(Debug, Clone)]
pub struct TransifexClient {
    base_url: String,
    authorization: String,
    agent: ureq::Agent,
}

impl TransifexClient {
    pub fn new(username: &str, password: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_read(TIMEOUT)
            .timeout_write(TIMEOUT)
            .build();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            authorization: format!("Basic {}", BASE64.encode(format!("{username}:{password}"))),
            agent,
        }
    }

    /// Point the client at another API root, e.g. a staging server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.authorization)
            .call()
            .map_err(|e| map_ureq(e, &url))?;
        response
            .into_json()
            .map_err(|e| ServiceError::Decode(format!("{url}: {e}")))
    }

    fn send<B: serde::Serialize>(&self, method: &str, path: &str, body: &B) -> Result<(), ServiceError> {
        let url = self.url(path);
        tracing::debug!("{method} {url}");
        self.agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(|e| map_ureq(e, &url))?;
        Ok(())
    }
}

fn map_ureq(err: ureq::Error, url: &str) -> ServiceError {
    match err {
        ureq::Error::Status(status, _) => ServiceError::Http {
            status,
            url: url.to_string(),
        },
        ureq::Error::Transport(t) => ServiceError::Transport(t.to_string()),
    }
}

fn read_source(path: &Path) -> Result<String, ServiceError> {
    std::fs::read_to_string(path).map_err(|source| ServiceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl TranslationService for TransifexClient {
    fn project_exists(&self, project: &str) -> Result<bool, ServiceError> {
        match self.get::<serde_json::Value>(&format!("project/{project}/")) {
            Ok(_) => Ok(true),
            Err(ServiceError::Http { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn list_resources(&self, project: &str) -> Result<Vec<RemoteResource>, ServiceError> {
        let entries: Vec<ResourceEntry> = self.get(&format!("project/{project}/resources/"))?;
        Ok(entries.into_iter().map(RemoteResource::from).collect())
    }

    fn create_resource(
        &self,
        project: &str,
        path: &Path,
        name: &str,
        format: &str,
    ) -> Result<(), ServiceError> {
        let content = read_source(path)?;
        let slug = slugify(name);
        let body = NewResource {
            slug: &slug,
            name,
            i18n_type: format,
            content: &content,
        };
        self.send("POST", &format!("project/{project}/resources/"), &body)
    }

    fn update_resource_source(
        &self,
        project: &str,
        resource: &str,
        path: &Path,
        _format: &str,
    ) -> Result<(), ServiceError> {
        let content = read_source(path)?;
        self.send(
            "PUT",
            &format!("project/{project}/resource/{resource}/content/"),
            &Content { content },
        )
    }

    fn fetch_translation(
        &self,
        project: &str,
        resource: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), ServiceError> {
        let body: Content =
            self.get(&format!("project/{project}/resource/{resource}/translation/{language}/"))?;
        std::fs::write(dest, body.content).map_err(|source| ServiceError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }

    fn fetch_statistics(
        &self,
        project: &str,
        resource: &str,
        language: &str,
    ) -> Result<ResourceStats, ServiceError> {
        let payload: StatsPayload =
            self.get(&format!("project/{project}/resource/{resource}/stats/{language}/"))?;
        Ok(payload.into())
    }
}
