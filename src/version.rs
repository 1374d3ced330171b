use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const DEFAULT_VERSION: &str = "1.20.4";
pub const DEFAULT_CATALOG: &[&str] = &["1.20.4", "1.19.2", "1.18.1", "1.17.1"];
pub const MANIFEST_URL: &str = "https://launchermeta.mojang.com/mc/game/version_manifest.json";
const DEFAULT_AVATAR: &str = "default_avatar.png";

/// Ordered, read-only list of selectable game versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: Vec<String>,
}

impl VersionCatalog {
    pub fn new(versions: Vec<String>) -> Result<Self> {
        if versions.is_empty() {
            return Err(Error::Settings("Version catalog cannot be empty".to_string()));
        }

        let mut unique: Vec<String> = Vec::with_capacity(versions.len());
        for version in versions {
            if version.is_empty() {
                return Err(Error::Settings("Version ids cannot be empty".to_string()));
            }
            if !unique.contains(&version) {
                unique.push(version);
            }
        }

        Ok(Self { versions: unique })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.versions.iter().any(|v| v == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.versions.iter().position(|v| v == id)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.versions.get(index).map(String::as_str)
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl Default for VersionCatalog {
    fn default() -> Self {
        Self {
            versions: DEFAULT_CATALOG.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Pick made inside the version overlay, not yet confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSelector {
    picked: Option<String>,
}

impl VersionSelector {
    pub fn select(&mut self, catalog: &VersionCatalog, id: &str) -> Result<()> {
        if !catalog.contains(id) {
            return Err(Error::UnknownVersion(id.to_string()));
        }
        self.picked = Some(id.to_string());
        Ok(())
    }

    pub fn picked(&self) -> Option<&str> {
        self.picked.as_deref()
    }

    pub fn reset(&mut self) {
        self.picked = None;
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VersionService: Send + Sync {
    async fn list_versions(&self) -> Result<Vec<String>>;
    async fn resolve_avatar(&self, account_id: Uuid) -> Result<Vec<u8>>;
}

/// Looks for `<account_id>.png`, then the shared default image.
async fn read_avatar(avatars_dir: &Path, account_id: Uuid) -> Result<Vec<u8>> {
    let candidates = [
        avatars_dir.join(format!("{}.png", account_id)),
        avatars_dir.join(DEFAULT_AVATAR),
    ];

    for path in candidates.iter() {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                log::debug!("Avatar loaded from {:?}", path);
                return Ok(bytes);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::NotFound)
}

pub struct StaticVersionService {
    catalog: VersionCatalog,
    avatars_dir: PathBuf,
}

impl StaticVersionService {
    pub fn new(catalog: VersionCatalog, avatars_dir: PathBuf) -> Self {
        Self {
            catalog,
            avatars_dir,
        }
    }
}

#[async_trait]
impl VersionService for StaticVersionService {
    async fn list_versions(&self) -> Result<Vec<String>> {
        Ok(self.catalog.versions().to_vec())
    }

    async fn resolve_avatar(&self, account_id: Uuid) -> Result<Vec<u8>> {
        read_avatar(&self.avatars_dir, account_id).await
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: Latest,
    pub versions: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Latest {
    pub release: String,
    pub snapshot: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub release_type: String,
}

impl VersionManifest {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Release ids in manifest order (newest first), capped at `limit`.
    pub fn releases(&self, limit: usize) -> Vec<String> {
        self.versions
            .iter()
            .filter(|v| v.release_type == "release")
            .take(limit)
            .map(|v| v.id.clone())
            .collect()
    }
}

/// Live catalog from the Mojang version manifest.
pub struct ManifestVersionService {
    client: reqwest::Client,
    manifest_url: String,
    limit: usize,
    avatars_dir: PathBuf,
}

impl ManifestVersionService {
    pub fn new(manifest_url: String, limit: usize, timeout: Duration, avatars_dir: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ezmc-launcher/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            manifest_url,
            limit,
            avatars_dir,
        })
    }
}

#[async_trait]
impl VersionService for ManifestVersionService {
    async fn list_versions(&self) -> Result<Vec<String>> {
        let body = self
            .client
            .get(&self.manifest_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let manifest = VersionManifest::parse(&body)?;

        let releases = manifest.releases(self.limit);
        log::info!(
            "Fetched {} releases from manifest (latest {})",
            releases.len(),
            manifest.latest.release
        );
        Ok(releases)
    }

    async fn resolve_avatar(&self, account_id: Uuid) -> Result<Vec<u8>> {
        read_avatar(&self.avatars_dir, account_id).await
    }
}
