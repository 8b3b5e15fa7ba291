//! Search index builder
//!
//! The index is a flat list of documents assembled from two sources:
//! - the bundled direct-link table, grouped by target path into pages
//! - the articles served by the content API
//!
//! Pages come first, then articles, each in source order. The index is
//! built once and treated as immutable afterwards.

mod document;
mod source;

use std::collections::HashMap;
use std::time::Instant;

pub use document::{Article, DirectLinks, DocumentKind, PageTitles, SearchDocument};
pub use source::{ArticleSource, FileArticleSource, HttpArticleSource};

/// Static tables bundled with a host app
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub direct_links: DirectLinks,
    pub page_titles: PageTitles,
}

/// Statistics from an index build
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IndexStats {
    pub pages: usize,
    pub articles: usize,
    pub duration_secs: f64,
}

impl IndexStats {
    pub fn total(&self) -> usize {
        self.pages + self.articles
    }
}

/// Build the flat document list from the static tables and fetched articles
pub fn build_index(
    direct_links: &DirectLinks,
    page_titles: &PageTitles,
    articles: &[Article],
) -> Vec<SearchDocument> {
    // Group keywords by path, keeping paths in order of first appearance
    let mut order: Vec<&str> = Vec::new();
    let mut keywords_by_path: HashMap<&str, Vec<String>> = HashMap::new();

    for (keyword, path) in direct_links.iter() {
        keywords_by_path
            .entry(path)
            .or_insert_with(|| {
                order.push(path);
                Vec::new()
            })
            .push(keyword.to_string());
    }

    let mut index = Vec::with_capacity(order.len() + articles.len());

    for path in order {
        let title = page_titles.get(path).map(String::as_str).unwrap_or(path);
        index.push(SearchDocument::page(title, path, &keywords_by_path[path]));
    }

    index.extend(articles.iter().cloned().map(SearchDocument::from));
    index
}

/// Fetch articles and build the index, degrading to pages only on failure
pub async fn load_index(
    catalog: &Catalog,
    source: &dyn ArticleSource,
) -> (Vec<SearchDocument>, IndexStats) {
    let start = Instant::now();

    let articles = match source.fetch_articles().await {
        Ok(articles) => articles,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch search data from {}: {} (searching pages only)",
                source.describe(),
                e
            );
            Vec::new()
        }
    };

    let index = build_index(&catalog.direct_links, &catalog.page_titles, &articles);

    let stats = IndexStats {
        pages: index.len() - articles.len(),
        articles: articles.len(),
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        "Search index ready: {} pages, {} articles in {:.3}s",
        stats.pages,
        stats.articles,
        stats.duration_secs
    );

    (index, stats)
}
