//! Search document model and the raw tables it is built from
//!
//! - DirectLinks: keyword -> path, keeps the order of the source JSON
//! - PageTitles: path -> display title
//! - Article: one entry of the content API's search-data payload
//! - SearchDocument: the unit that gets indexed and matched

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Variant tag of an indexed document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Page,
    Article,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Page => "page",
            DocumentKind::Article => "article",
        }
    }
}

/// A page or an article as seen by the matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub path: String,
    #[serde(rename = "searchKeywords", skip_serializing_if = "Option::is_none")]
    pub search_keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_snippet: Option<String>,
}

impl SearchDocument {
    pub fn page(title: impl Into<String>, path: impl Into<String>, keywords: &[String]) -> Self {
        Self {
            kind: DocumentKind::Page,
            title: title.into(),
            path: path.into(),
            search_keywords: Some(keywords.join(" ")),
            category: None,
            content_snippet: None,
        }
    }
}

impl From<Article> for SearchDocument {
    fn from(article: Article) -> Self {
        Self {
            kind: DocumentKind::Article,
            title: article.title.unwrap_or_default(),
            path: article.slug.unwrap_or_default(),
            search_keywords: None,
            category: article.category,
            content_snippet: article.content_snippet,
        }
    }
}

/// One article from `GET /api/search-data`
///
/// The blog backends disagree on field names, so the common aliases are
/// accepted. Every field tolerates `null` or absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "path")]
    pub slug: Option<String>,
    #[serde(default, alias = "category_name")]
    pub category: Option<String>,
    #[serde(default, alias = "excerpt", alias = "snippet")]
    pub content_snippet: Option<String>,
}

impl Article {
    pub fn new(title: &str, slug: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            slug: Some(slug.to_string()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_snippet(mut self, snippet: &str) -> Self {
        self.content_snippet = Some(snippet.to_string());
        self
    }
}

/// Exact keyword shortcuts: lowercase keyword -> canonical path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct DirectLinks {
    entries: Vec<(String, String)>,
    #[serde(skip)]
    lookup: HashMap<String, usize>,
}

impl DirectLinks {
    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.lookup
            .get(keyword)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Entries in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, keyword: impl Into<String>, path: impl Into<String>) {
        let keyword = keyword.into();
        let path = path.into();
        match self.lookup.get(&keyword) {
            Some(&i) => self.entries[i].1 = path,
            None => {
                self.lookup.insert(keyword.clone(), self.entries.len());
                self.entries.push((keyword, path));
            }
        }
    }
}

impl<K: Into<String>, P: Into<String>> FromIterator<(K, P)> for DirectLinks {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut links = DirectLinks::default();
        for (keyword, path) in iter {
            links.insert(keyword, path);
        }
        links
    }
}

impl TryFrom<Map<String, Value>> for DirectLinks {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut links = DirectLinks::default();
        for (keyword, value) in map {
            match value {
                Value::String(path) => links.insert(keyword, path),
                other => {
                    return Err(format!(
                        "direct link `{keyword}` maps to {other}, expected a path"
                    ))
                }
            }
        }
        Ok(links)
    }
}

impl From<DirectLinks> for Map<String, Value> {
    fn from(links: DirectLinks) -> Self {
        links
            .entries
            .into_iter()
            .map(|(k, p)| (k, Value::String(p)))
            .collect()
    }
}

/// Human-readable titles for static pages
pub type PageTitles = HashMap<String, String>;
