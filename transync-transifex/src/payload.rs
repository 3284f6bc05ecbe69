//! Request and response bodies for the Transifex v2 API.

use serde::{Deserialize, Deserializer, Serialize};

use transync_core::{RemoteResource, ResourceStats};

/// One entry of `GET project/{p}/resources/`.
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceEntry {
    pub slug: String,
    pub name: String,
}

impl From<ResourceEntry> for RemoteResource {
    fn from(entry: ResourceEntry) -> Self {
        RemoteResource {
            slug: entry.slug,
            name: entry.name,
        }
    }
}

/// Body of `POST project/{p}/resources/`.
#[derive(Debug, Serialize)]
pub(crate) struct NewResource<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub i18n_type: &'a str,
    pub content: &'a str,
}

/// Body of `PUT .../content/` and response of `GET .../translation/{lang}/`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    pub content: String,
}

/// Response of `GET .../stats/{lang}/`.
///
/// Counts arrive as JSON numbers or numeric strings depending on the server.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatsPayload {
    #[serde(deserialize_with = "number_or_string")]
    pub translated_words: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub untranslated_words: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub translated_entities: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub untranslated_entities: u64,
    pub completed: String,
    #[serde(alias = "last_commiter")]
    pub last_committer: Option<String>,
    pub last_update: Option<String>,
}

impl From<StatsPayload> for ResourceStats {
    fn from(p: StatsPayload) -> Self {
        ResourceStats {
            translated_words: p.translated_words,
            untranslated_words: p.untranslated_words,
            translated_entities: p.translated_entities,
            untranslated_entities: p.untranslated_entities,
            completed: p.completed,
            last_committer: p.last_committer.unwrap_or_default(),
            last_update: p.last_update.unwrap_or_default(),
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        Raw::Null => Ok(0),
    }
}
