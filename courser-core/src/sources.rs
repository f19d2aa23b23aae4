use crate::error::{CoreError, Result};
use crate::store::Repository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// A registered crawl seed. Owned by the registry; the crawl engine only
/// reads it. Never mutated after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "addedAt")]
    pub added_at: String,
}

/// Flat list of crawl seeds persisted as a bare JSON array, unique by URL.
pub struct SourceRegistry<R> {
    repo: R,
}

impl<R: Repository<Vec<Source>>> SourceRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<Vec<Source>> {
        Ok(self.repo.read()?)
    }

    /// Register a seed URL. Re-adding a registered URL is a no-op returning
    /// the unchanged list. The id derives from the host plus a sequence
    /// index; the label defaults to the path, then the host.
    pub fn add(&self, url: &str, label: Option<&str>) -> Result<Vec<Source>> {
        let parsed = Url::parse(url)
            .map_err(|e| CoreError::Validation(format!("invalid source url {}: {}", url, e)))?;

        let mut sources = self.repo.read()?;
        if sources.iter().any(|s| s.url == url) {
            debug!("Source {} already registered, skipping", url);
            return Ok(sources);
        }

        let host = parsed.host_str().unwrap_or("unknown");
        let default_label = {
            let path = parsed.path().trim_matches('/');
            if path.is_empty() {
                host.to_string()
            } else {
                path.to_string()
            }
        };
        let source = Source {
            id: format!("{}-{}", host.replace('.', "-"), sources.len()),
            url: url.to_string(),
            label: label
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .unwrap_or(default_label),
            added_at: Utc::now().to_rfc3339(),
        };

        info!("Added source {} ({})", source.label, source.url);
        sources.push(source);
        self.repo.write(&sources)?;
        Ok(sources)
    }

    /// Deregister every source whose id or URL equals `key`.
    pub fn remove(&self, key: &str) -> Result<Vec<Source>> {
        let mut sources = self.repo.read()?;
        let before = sources.len();
        sources.retain(|s| s.id != key && s.url != key);
        if sources.len() == before {
            return Err(CoreError::NotFound(format!("no source matches {}", key)));
        }

        info!(
            "Removed {} source(s), {} remaining",
            before - sources.len(),
            sources.len()
        );
        self.repo.write(&sources)?;
        Ok(sources)
    }
}
