//! Catalog groups and their in-memory text cache

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::source::CatalogSource;
use crate::error::{ConfigError, FetchError};

/// Where a group's catalog text comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum GroupSource {
    /// Plain `GET url`
    Direct { url: String },
    /// Provider behind an authenticated session, reached through the relay
    Relay { url: String },
}

impl GroupSource {
    pub fn url(&self) -> &str {
        match self {
            GroupSource::Direct { url } | GroupSource::Relay { url } => url,
        }
    }
}

/// Catalog text captured by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCatalog {
    pub text: String,
    pub fetched_at: DateTime<Utc>,
}

/// A named catalog group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub title: String,
    pub source: GroupSource,
    #[serde(skip)]
    cache: Option<CachedCatalog>,
}

impl Group {
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: GroupSource) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source,
            cache: None,
        }
    }

    pub fn cache(&self) -> Option<&CachedCatalog> {
        self.cache.as_ref()
    }
}

/// Built-in groups: CelesTrak lists fetched directly, Space-Track debris via the relay
pub fn default_groups() -> Vec<Group> {
    vec![
        Group::new(
            "active",
            "All",
            GroupSource::Direct {
                url: "https://celestrak.org/NORAD/elements/gp.php?GROUP=active&FORMAT=tle".into(),
            },
        ),
        Group::new(
            "geostationary",
            "Geostationary",
            GroupSource::Direct {
                url: "https://celestrak.org/NORAD/elements/gp.php?GROUP=geo&FORMAT=tle".into(),
            },
        ),
        Group::new(
            "starlink",
            "Starlink",
            GroupSource::Direct {
                url: "https://celestrak.org/NORAD/elements/gp.php?GROUP=starlink&FORMAT=tle"
                    .into(),
            },
        ),
        Group::new(
            "debris",
            "Debris",
            GroupSource::Relay {
                url: "https://www.space-track.org/basicspacedata/query/class/gp/OBJECT_TYPE/%3C%3EPayload/DECAY_DATE/null-val/orderby/DECAY_DATE%20asc/format/3le/emptyresult/show".into(),
            },
        ),
    ]
}

/// Load group definitions from a JSON array
pub fn load_groups(path: impl AsRef<Path>) -> Result<Vec<Group>, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let groups: Vec<Group> = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Loaded {} catalog groups from {:?}", groups.len(), path);
    Ok(groups)
}

/// Owns every group and its cache. Entries are never evicted.
pub struct CatalogCacheManager {
    groups: HashMap<String, Group>,
    order: Vec<String>,
}

impl CatalogCacheManager {
    pub fn new(groups: Vec<Group>) -> Self {
        let order = groups.iter().map(|g| g.id.clone()).collect();
        let groups = groups.into_iter().map(|g| (g.id.clone(), g)).collect();
        Self { groups, order }
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Groups in definition order
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Cached text for a group, if it has been fetched
    pub fn cached(&self, id: &str) -> Option<&str> {
        self.groups
            .get(id)
            .and_then(|g| g.cache.as_ref())
            .map(|c| c.text.as_str())
    }

    /// Record fetched text. The first successful write wins; later writes
    /// return the text already cached.
    pub fn store(&mut self, id: &str, text: String) -> Result<&str, FetchError> {
        let group = self
            .groups
            .get_mut(id)
            .ok_or_else(|| FetchError::UnknownGroup(id.to_string()))?;

        let cached = group.cache.get_or_insert_with(|| {
            log::info!("Caching {} bytes for group '{}'", text.len(), id);
            CachedCatalog {
                text,
                fetched_at: Utc::now(),
            }
        });
        Ok(cached.text.as_str())
    }

    /// Return cached text or fetch it through `source`, caching on success.
    pub fn fetch(&mut self, id: &str, source: &dyn CatalogSource) -> Result<&str, FetchError> {
        let group = self
            .groups
            .get(id)
            .ok_or_else(|| FetchError::UnknownGroup(id.to_string()))?;

        if group.cache.is_some() {
            log::debug!("Serving group '{}' from cache", id);
        } else {
            log::info!("Fetching group '{}' from {}", id, group.source.url());
            let text = source.fetch(&group.source)?;
            self.store(id, text)?;
        }

        self.cached(id)
            .ok_or_else(|| FetchError::UnknownGroup(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::source::tests::CountingSource;
    use std::io::Write;

    fn manager() -> CatalogCacheManager {
        CatalogCacheManager::new(default_groups())
    }

    #[test]
    fn test_repeat_fetch_hits_network_once() {
        let source = CountingSource::ok("ISS\n1 a\n2 b\n");
        let mut catalog = manager();

        let first = catalog.fetch("active", &source).unwrap().to_string();
        let second = catalog.fetch("active", &source).unwrap().to_string();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert!(catalog.group("active").unwrap().cache().is_some());
    }

    #[test]
    fn test_failed_fetch_leaves_cache_empty_for_retry() {
        let source = CountingSource::failing();
        let mut catalog = manager();

        assert!(catalog.fetch("starlink", &source).is_err());
        assert!(catalog.cached("starlink").is_none());
        assert!(catalog.fetch("starlink", &source).is_err());
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_unknown_group() {
        let source = CountingSource::ok("");
        let mut catalog = manager();
        assert_eq!(
            catalog.fetch("nope", &source).unwrap_err(),
            FetchError::UnknownGroup("nope".into())
        );
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_store_keeps_first_write() {
        let mut catalog = manager();
        catalog.store("debris", "first".into()).unwrap();
        let text = catalog.store("debris", "second".into()).unwrap();
        assert_eq!(text, "first");

        let cache = catalog.group("debris").unwrap().cache().unwrap();
        assert_eq!(cache.text, "first");
        assert!(cache.fetched_at <= Utc::now());
    }

    #[test]
    fn test_default_groups_sources() {
        let catalog = manager();
        let ids: Vec<&str> = catalog.groups().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["active", "geostationary", "starlink", "debris"]);
        assert!(matches!(
            catalog.group("debris").unwrap().source,
            GroupSource::Relay { .. }
        ));
    }

    #[test]
    fn test_load_groups_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "weather", "title": "Weather", "source": {{"via": "direct", "url": "https://example.org/weather.txt"}}}}]"#
        )
        .unwrap();

        let groups = load_groups(file.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, "weather");
        assert_eq!(groups[0].source.url(), "https://example.org/weather.txt");
        assert!(groups[0].cache().is_none());
    }

    #[test]
    fn test_load_groups_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_groups(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
