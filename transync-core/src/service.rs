//! Translation-service interface.
//!
//! The orchestrator only talks to the service through [`TranslationService`];
//! `transync-transifex` provides the HTTP implementation and tests provide
//! in-memory fakes. Every call is blocking and issued one at a time.

use std::path::Path;

use crate::error::ServiceError;

/// A resource that already exists in the remote project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResource {
    pub slug: String,
    /// Human-readable name; transync uses the English file's base name.
    pub name: String,
}

/// Completion statistics for one (resource, language) pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceStats {
    pub translated_words: u64,
    pub untranslated_words: u64,
    pub translated_entities: u64,
    pub untranslated_entities: u64,
    /// Completion as reported by the service, e.g. `"87%"`.
    pub completed: String,
    pub last_committer: String,
    pub last_update: String,
}

impl ResourceStats {
    pub fn total_words(&self) -> u64 {
        self.translated_words + self.untranslated_words
    }

    pub fn total_entities(&self) -> u64 {
        self.translated_entities + self.untranslated_entities
    }
}

/// Operations transync needs from a translation management service.
pub trait TranslationService {
    fn project_exists(&self, project: &str) -> Result<bool, ServiceError>;

    fn list_resources(&self, project: &str) -> Result<Vec<RemoteResource>, ServiceError>;

    /// Create a resource named `name` from the file at `path`.
    fn create_resource(
        &self,
        project: &str,
        path: &Path,
        name: &str,
        format: &str,
    ) -> Result<(), ServiceError>;

    /// Replace the source strings of `resource` with the file at `path`.
    fn update_resource_source(
        &self,
        project: &str,
        resource: &str,
        path: &Path,
        format: &str,
    ) -> Result<(), ServiceError>;

    /// Download the `language` translation of `resource` into `dest`.
    fn fetch_translation(
        &self,
        project: &str,
        resource: &str,
        language: &str,
        dest: &Path,
    ) -> Result<(), ServiceError>;

    fn fetch_statistics(
        &self,
        project: &str,
        resource: &str,
        language: &str,
    ) -> Result<ResourceStats, ServiceError>;
}
