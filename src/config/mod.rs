//! User configuration
//!
//! Stored as JSON at ~/.finseek/config.json. Every field has a default, so a
//! missing or partial file is fine. `FINSEEK_API_URL` overrides the content
//! API base URL.
//!
//! The direct-link and page-title tables ship with the binary; a host app
//! can point at its own copies instead.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SearchError;
use crate::indexer::{Catalog, DirectLinks, HttpArticleSource, PageTitles};
use crate::presenter::CONFIDENT_CUTOFF;
use crate::ranker::RankerConfig;

const BUNDLED_DIRECT_LINKS: &str = include_str!("../../data/direct_links.json");
const BUNDLED_PAGE_TITLES: &str = include_str!("../../data/page_titles.json");

pub const API_URL_ENV: &str = "FINSEEK_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the blog backend
    pub api_base_url: String,
    /// Endpoint returning the searchable articles
    pub search_data_path: String,
    pub request_timeout_secs: u64,
    /// Replaces the bundled keyword -> path table
    pub direct_links_file: Option<PathBuf>,
    /// Replaces the bundled path -> title table
    pub page_titles_file: Option<PathBuf>,
    /// Top results scoring below this are opened directly on submit
    pub confident_cutoff: f64,
    pub ranker: RankerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            search_data_path: "/api/search-data".to_string(),
            request_timeout_secs: 10,
            direct_links_file: None,
            page_titles_file: None,
            confident_cutoff: CONFIDENT_CUTOFF,
            ranker: RankerConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config path (~/.finseek/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".finseek").join("config.json"))
    }

    /// Load config from disk, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), SearchError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.ranker.threshold) {
            return Err(SearchError::Config(format!(
                "ranker.threshold must be within [0, 1], got {}",
                self.ranker.threshold
            )));
        }
        if !unit.contains(&self.confident_cutoff) {
            return Err(SearchError::Config(format!(
                "confident_cutoff must be within [0, 1], got {}",
                self.confident_cutoff
            )));
        }
        if self.ranker.limit == 0 {
            return Err(SearchError::Config("ranker.limit must be positive".to_string()));
        }
        let weights = self.ranker.weights;
        if [weights.title, weights.search_keywords, weights.category, weights.content_snippet]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(SearchError::Config(
                "ranker.weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Read a value by dotted key, e.g. `ranker.threshold`
    pub fn get(&self, key: &str) -> std::result::Result<Value, SearchError> {
        let tree = serde_json::to_value(self)?;
        key.split('.')
            .try_fold(&tree, |node, part| node.get(part))
            .cloned()
            .ok_or_else(|| SearchError::UnknownConfigKey(key.to_string()))
    }

    /// Set a value by dotted key
    ///
    /// `raw` is parsed as JSON when possible and taken as a string otherwise.
    pub fn set(&mut self, key: &str, raw: &str) -> std::result::Result<(), SearchError> {
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

        let mut tree = serde_json::to_value(&*self)?;
        let slot = key
            .split('.')
            .try_fold(&mut tree, |node, part| node.get_mut(part))
            .ok_or_else(|| SearchError::UnknownConfigKey(key.to_string()))?;
        *slot = value;

        let updated: Config = serde_json::from_value(tree)
            .map_err(|e| SearchError::Config(format!("{key}: {e}")))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Direct links and page titles, bundled or from the configured files
    pub fn catalog(&self) -> Result<Catalog> {
        let direct_links: DirectLinks =
            read_table(self.direct_links_file.as_deref(), BUNDLED_DIRECT_LINKS)
                .context("Failed to load direct links")?;
        let page_titles: PageTitles =
            read_table(self.page_titles_file.as_deref(), BUNDLED_PAGE_TITLES)
                .context("Failed to load page titles")?;

        Ok(Catalog {
            direct_links,
            page_titles,
        })
    }

    pub fn article_source(&self) -> Result<HttpArticleSource> {
        let source = HttpArticleSource::new(
            &self.api_base_url,
            &self.search_data_path,
            Duration::from_secs(self.request_timeout_secs),
        )?;
        Ok(source)
    }
}

fn read_table<T: serde::de::DeserializeOwned>(
    file: Option<&Path>,
    bundled: &str,
) -> std::result::Result<T, SearchError> {
    match file {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(serde_json::from_str(bundled)?),
    }
}
